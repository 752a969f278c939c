use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::util::filename_only;
use crate::TARGET_ENGINE;

/// One content file per article key under the index directory.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    root: PathBuf,
}

impl DocumentRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the index directory if needed.
    pub async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create index directory {}", self.root.display()))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are file names; anything that looks like a path is reduced to its last part
        self.root.join(filename_only(key))
    }

    pub async fn save(&self, key: &str, content: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(target: TARGET_ENGINE, "Saved {} ({} bytes)", path.display(), content.len());
        Ok(())
    }

    /// Deletes the content file of `key`. A file that is already gone is not
    /// an error.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(target: TARGET_ENGINE, "Deleted {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(target: TARGET_ENGINE, "{} was already missing", path.display());
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to delete {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let repo = DocumentRepository::new(dir.path());

        repo.save("b.html", b"<html>b</html>").await.unwrap();
        repo.save("a.html", b"<html>a</html>").await.unwrap();
        assert_eq!(stored(dir.path()), vec!["a.html", "b.html"]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.html")).unwrap(),
            "<html>a</html>"
        );

        repo.remove("a.html").await.unwrap();
        repo.remove("a.html").await.unwrap();
        assert_eq!(stored(dir.path()), vec!["b.html"]);
    }

    #[tokio::test]
    async fn test_keys_cannot_escape_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("index");
        let repo = DocumentRepository::new(&root);
        repo.ensure_root().await.unwrap();
        repo.save("../../escape.html", b"x").await.unwrap();
        assert_eq!(stored(&root), vec!["escape.html"]);
        assert_eq!(stored(dir.path()), vec!["index"]);
    }
}
