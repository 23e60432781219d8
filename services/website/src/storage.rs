use std::path::{Component, Path, PathBuf};

use suzstar_common::AppError;
use tokio::fs::{self, File};

/// Uploaded files on local disk, served under the media URL.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    base_url: String,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url(&self, relative: &str) -> String {
        format!("{}/{}", self.base_url, relative.trim_start_matches('/'))
    }

    /// Only plain relative paths inside the root are accepted.
    fn resolve(&self, relative: &str) -> Result<PathBuf, AppError> {
        let path = Path::new(relative);
        let plain = !relative.is_empty()
            && path.components().all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(AppError::Validation(format!("Invalid file path: {}", relative)));
        }
        Ok(self.root.join(path))
    }

    /// Writes `bytes` at `relative` and returns the public URL.
    pub async fn store(&self, bytes: &[u8], relative: &str) -> Result<String, AppError> {
        let target = self.resolve(relative)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create media directory: {}", e)))?;
        }
        fs::write(&target, bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write {}: {}", relative, e)))?;

        tracing::info!(path = %relative, size = bytes.len(), "Stored media file");
        Ok(self.url(relative))
    }

    pub async fn open(&self, relative: &str) -> Result<File, AppError> {
        let target = self.resolve(relative)?;
        File::open(&target).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AppError::NotFound(format!("File {}", relative)),
            _ => AppError::Internal(format!("Failed to open {}: {}", relative, e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn stored_files_can_be_reopened() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path(), "/media/");

        let url = store
            .store(b"breathing exercise", "resources/calm.pdf")
            .await
            .unwrap();
        assert_eq!(url, "/media/resources/calm.pdf");

        let mut contents = String::new();
        store
            .open("resources/calm.pdf")
            .await
            .unwrap()
            .read_to_string(&mut contents)
            .await
            .unwrap();
        assert_eq!(contents, "breathing exercise");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path(), "/media");
        let err = store.open("resources/none.pdf").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn paths_cannot_escape_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path(), "/media");
        for bad in ["../secret", "/etc/passwd", "", "a/../../b"] {
            assert!(matches!(store.open(bad).await, Err(AppError::Validation(_))), "{bad}");
        }
    }
}
