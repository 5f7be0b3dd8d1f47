//! Product text normalization and the suspect-keyword classifier.

use regex::Regex;
use std::sync::OnceLock;

/// Keywords flagging a product as belonging to the excluded (women's) range.
pub const DEFAULT_SUSPECT_KEYWORDS: &[&str] = &[
    "nữ",
    "croptop",
    "váy",
    "đầm",
    "áo dây",
    "baby doll",
    "đồ bộ nữ",
    "xinh",
    "dễ thương",
    "form rộng",
    "áo đôi",
    "cặp đôi",
];

fn url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+|www\.\S+").expect("valid URL pattern"))
}

fn punctuation_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("valid punctuation pattern"))
}

fn digit_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("valid digit pattern"))
}

/// Normalize raw product text for vectorization.
///
/// Lower-cases, strips URLs, turns punctuation into whitespace and drops digits.
/// Absent text is treated as the empty string.
pub fn normalize(text: Option<&str>) -> String {
    let lowercase = text.unwrap_or("").to_lowercase();
    let without_urls = url_pattern().replace_all(&lowercase, "");
    let spaced = punctuation_pattern().replace_all(&without_urls, " ");
    digit_pattern().replace_all(&spaced, "").into_owned()
}

/// Case-insensitive substring test against a keyword list.
pub fn is_suspect<S: AsRef<str>>(text: &str, keywords: &[S]) -> bool {
    let text = text.to_lowercase();
    keywords
        .iter()
        .any(|k| text.contains(&k.as_ref().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pipeline() {
        let text = "Áo Sơ Mi (2024) - xem tại https://shop.vn/p?id=1 hoặc www.shop.vn!!";
        let out = normalize(Some(text));

        assert!(out.starts_with("áo sơ mi"));
        assert!(!out.contains("shop"));
        assert!(!out.contains('('));
        assert!(!out.contains('!'));
        assert!(!out.chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_normalize_missing_is_empty() {
        assert_eq!(normalize(None), "");
        assert_eq!(normalize(Some("")), "");
    }

    #[test]
    fn test_punctuation_becomes_whitespace() {
        assert_eq!(normalize(Some("red,cotton")), "red cotton");
    }

    #[test]
    fn test_is_suspect_case_insensitive() {
        assert!(is_suspect("ĐẦM DỰ TIỆC", DEFAULT_SUSPECT_KEYWORDS));
        assert!(is_suspect("Áo CropTop tay ngắn", DEFAULT_SUSPECT_KEYWORDS));
        assert!(!is_suspect("Quần kaki nam", DEFAULT_SUSPECT_KEYWORDS));
    }

    #[test]
    fn test_is_suspect_multiword_keyword() {
        assert!(is_suspect("Set áo đôi mùa hè", DEFAULT_SUSPECT_KEYWORDS));
        let empty: &[&str] = &[];
        assert!(!is_suspect("anything", empty));
    }
}
