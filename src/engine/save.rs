//! Model persistence for content and collaborative snapshots.
//!
//! Snapshots are written as JSON and read back verbatim. Loading a content
//! snapshot re-checks that the product rows and the similarity matrix still line up.

use super::collaborative::CollaborativeSnapshot;
use super::config::OutputConfig;
use super::content::ContentSnapshot;
use crate::error::{RecommendError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(RecommendError::MissingArtifact {
            path: path.to_path_buf(),
        });
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Write a content snapshot to `path`.
pub fn save_content(snapshot: &ContentSnapshot, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    write_json(snapshot, path)?;
    info!(path = %path.display(), products = snapshot.len(), "saved content snapshot");
    Ok(())
}

/// Read a content snapshot from `path`.
pub fn load_content(path: impl AsRef<Path>) -> Result<ContentSnapshot> {
    let snapshot: ContentSnapshot = read_json(path.as_ref())?;
    info!(products = snapshot.len(), "loaded content snapshot");
    Ok(snapshot)
}

/// Write a collaborative snapshot to `path`.
pub fn save_collaborative(snapshot: &CollaborativeSnapshot, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    write_json(snapshot, path)?;
    info!(
        path = %path.display(),
        users = snapshot.model.n_users(),
        items = snapshot.model.n_items(),
        "saved collaborative snapshot"
    );
    Ok(())
}

/// Read a collaborative snapshot from `path`.
pub fn load_collaborative(path: impl AsRef<Path>) -> Result<CollaborativeSnapshot> {
    let snapshot: CollaborativeSnapshot = read_json(path.as_ref())?;
    info!(users = snapshot.model.n_users(), "loaded collaborative snapshot");
    Ok(snapshot)
}

/// Save a content snapshot under the configured model directory.
pub fn save_content_model(snapshot: &ContentSnapshot, output: &OutputConfig) -> Result<()> {
    let path = output.content_path();
    save_content(snapshot, &path)?;

    println!("\n✓ Content model saved:");
    println!("  - {}", path.display());
    println!("  - {} products", snapshot.len());
    println!("  - {} TF-IDF features\n", snapshot.vectorizer().n_features());
    Ok(())
}

/// Save a collaborative snapshot under the configured model directory.
pub fn save_collaborative_model(
    snapshot: &CollaborativeSnapshot,
    output: &OutputConfig,
) -> Result<()> {
    let path = output.collaborative_path();
    save_collaborative(snapshot, &path)?;

    println!("\n✓ Collaborative model saved:");
    println!("  - {}", path.display());
    println!(
        "  - {} users × {} products\n",
        snapshot.model.n_users(),
        snapshot.model.n_items()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::data::fixtures::{product, rating};
    use crate::engine::policy::AllowAll;
    use crate::engine::svd::SvdParams;
    use tempfile::TempDir;

    fn snapshot() -> ContentSnapshot {
        ContentSnapshot::build(
            vec![
                product("A", "red cotton shirt"),
                product("B", "blue cotton shirt"),
                product("C", "leather shoe"),
                product("D", "leather belt brown"),
            ],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_content_round_trip_preserves_queries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("content.json");
        let original = snapshot();

        save_content(&original, &path).unwrap();
        let restored = load_content(&path).unwrap();

        assert_eq!(restored.products(), original.products());
        assert_eq!(
            restored.recommend_by_keyword("cotton shirt", 3, &AllowAll),
            original.recommend_by_keyword("cotton shirt", 3, &AllowAll)
        );
        assert_eq!(
            restored.recommend_by_product_id("C", 3, &AllowAll).unwrap(),
            original.recommend_by_product_id("C", 3, &AllowAll).unwrap()
        );
    }

    #[test]
    fn test_collaborative_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cf.json");
        let ratings = vec![
            rating("u1", "a", 5.0),
            rating("u1", "b", 3.0),
            rating("u1", "c", 1.0),
        ];
        let params = SvdParams {
            n_factors: 2,
            n_epochs: 5,
            ..SvdParams::default()
        };
        let original = CollaborativeSnapshot::train(&ratings, 3, &params).unwrap();

        save_collaborative(&original, &path).unwrap();
        let restored = load_collaborative(&path).unwrap();

        assert_eq!(restored.min_user_ratings, 3);
        assert_eq!(restored.model.predict("u1", "b"), original.model.predict("u1", "b"));
    }

    #[test]
    fn test_missing_artifact_reported() {
        let dir = TempDir::new().unwrap();
        let err = load_content(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, RecommendError::MissingArtifact { .. }));
    }
}
