use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use uuid::Uuid;

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Persists a raw upload and returns where it landed
    async fn save_upload(&self, filename: &str, data: &[u8]) -> Result<PathBuf>;
}

/// Raw uploads on the local disk, one directory per request
pub struct LocalStorageService {
    root: PathBuf,
}

impl LocalStorageService {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn save_upload(&self, filename: &str, data: &[u8]) -> Result<PathBuf> {
        // A fresh directory per request keeps same-named uploads apart
        let dir = self.root.join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create directory: {}", dir.display()))?;

        let path = dir.join(filename);
        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("failed to write file: {}", path.display()))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_same_name_uploads_do_not_collide() {
        let root = TempDir::new().unwrap();
        let storage = LocalStorageService::new(root.path().to_path_buf());

        let first = storage.save_upload("photo.png", b"one").await.unwrap();
        let second = storage.save_upload("photo.png", b"two").await.unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with(root.path()));
        assert_eq!(first.file_name().unwrap(), "photo.png");
        assert_eq!(tokio::fs::read(&first).await.unwrap(), b"one");
        assert_eq!(tokio::fs::read(&second).await.unwrap(), b"two");
    }
}
