//! Command-line interface for building, evaluating and querying the recommender.

use super::config::Config;
use super::content::BuildVariant;
use super::evaluate::evaluate_collaborative_model;
use super::predict::{for_user, list_users, search, similar};
use super::train::{build_collaborative_model, build_content_model};
use std::error::Error;

const DEFAULT_CONFIG: &str = "config.toml";
const DEFAULT_TOP_K: usize = 10;
const COMMANDS: &[&str] = &[
    "build-content",
    "build-collab",
    "evaluate",
    "search",
    "similar",
    "user",
    "users",
];

/// Print command-line usage information.
pub fn print_usage() {
    println!("Usage:");
    println!("  shoprec [COMMAND] [ARGS] [OPTIONS]\n");
    println!("Commands:");
    println!("  build-content           Build the content model (saves to models/)");
    println!("  build-collab            Train the collaborative model (saves to models/)");
    println!("  evaluate                Report RMSE/MAE of the collaborative model on a holdout");
    println!("  search KEYWORD          Products matching a keyword");
    println!("  similar PRODUCT_ID      Products similar to a product");
    println!("  user USER_ID            Rating history and recommendations for a user");
    println!("  users                   List known users");
    println!("  help                    Show this help\n");
    println!("Options:");
    println!("  --light                 Capped random sample of listable products (build-content)");
    println!("  -k N                    Number of results (default: {})", DEFAULT_TOP_K);
    println!("  --config PATH           Configuration file (default: {})\n", DEFAULT_CONFIG);
    println!("Examples:");
    println!("  shoprec build-content --light");
    println!("  shoprec search \"áo thun\" -k 5");
    println!("  shoprec user 199");
}

/// Command-line options shared by every command.
#[derive(Debug, PartialEq)]
struct Options {
    positional: Vec<String>,
    config_path: String,
    top_k: usize,
    light: bool,
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        positional: Vec::new(),
        config_path: DEFAULT_CONFIG.to_string(),
        top_k: DEFAULT_TOP_K,
        light: false,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                options.config_path = iter
                    .next()
                    .ok_or("--config requires a PATH")?
                    .to_string();
            }
            "-k" => {
                let value = iter.next().ok_or("-k requires a number")?;
                options.top_k = value
                    .parse()
                    .map_err(|_| format!("invalid value for -k: {}", value))?;
            }
            "--light" => options.light = true,
            _ => options.positional.push(arg.clone()),
        }
    }
    Ok(options)
}

/// Main entry point for the recommender CLI.
///
/// # Arguments
///
/// * `args` - Command-line arguments (including program name)
pub fn main_cli(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let options = match parse_options(args.get(1..).unwrap_or_default()) {
        Ok(options) => options,
        Err(message) => {
            println!("Error: {}\n", message);
            print_usage();
            return Err(message.into());
        }
    };

    let command = options.positional.first().map(String::as_str).unwrap_or("help");
    let argument = options.positional.get(1).map(String::as_str);

    match (command, argument) {
        ("help" | "--help" | "-h", _) => {
            print_usage();
            return Ok(());
        }
        ("search" | "similar" | "user", None) => {
            println!("Error: {} requires an argument\n", command);
            print_usage();
            return Err(format!("{} requires an argument", command).into());
        }
        (known, _) if COMMANDS.contains(&known) => {}
        _ => {
            println!("Unknown command: {}\n", command);
            print_usage();
            return Err(format!("unknown command: {}", command).into());
        }
    }

    let config = Config::load_or_default(&options.config_path);

    match (command, argument) {
        ("build-content", _) => {
            let variant = if options.light {
                BuildVariant::Light {
                    max_products: config.content.max_products,
                    seed: config.content.seed,
                }
            } else {
                BuildVariant::Full
            };
            build_content_model(&config, variant)?;
        }
        ("build-collab", _) => {
            build_collaborative_model(&config)?;
        }
        ("evaluate", _) => {
            evaluate_collaborative_model(&config)?;
        }
        ("search", Some(keyword)) => search(config, keyword, options.top_k)?,
        ("similar", Some(product_id)) => similar(config, product_id, options.top_k)?,
        ("user", Some(user_id)) => for_user(config, user_id, options.top_k)?,
        ("users", _) => list_users(config)?,
        _ => return Err(format!("unknown command: {}", command).into()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_defaults() {
        let options = parse_options(&args(&["users"])).unwrap();
        assert_eq!(options.positional, vec!["users"]);
        assert_eq!(options.config_path, "config.toml");
        assert_eq!(options.top_k, 10);
        assert!(!options.light);
    }

    #[test]
    fn test_parse_flags_anywhere() {
        let options =
            parse_options(&args(&["-k", "3", "search", "áo thun", "--config", "x.toml"])).unwrap();
        assert_eq!(options.positional, vec!["search", "áo thun"]);
        assert_eq!(options.config_path, "x.toml");
        assert_eq!(options.top_k, 3);

        assert!(parse_options(&args(&["build-content", "--light"])).unwrap().light);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_options(&args(&["search", "x", "-k"])).is_err());
        assert!(parse_options(&args(&["search", "x", "-k", "many"])).is_err());
        assert!(parse_options(&args(&["--config"])).is_err());
    }

    #[test]
    fn test_help_succeeds() {
        assert!(main_cli(args(&["shoprec"])).is_ok());
        assert!(main_cli(args(&["shoprec", "--help"])).is_ok());
    }

    #[test]
    fn test_misuse_is_an_error() {
        assert!(main_cli(args(&["shoprec", "similar"])).is_err());
        assert!(main_cli(args(&["shoprec", "frobnicate"])).is_err());
        assert!(main_cli(args(&["shoprec", "search", "x", "-k", "many"])).is_err());
    }
}
