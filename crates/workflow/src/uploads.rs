//! Image uploads persisted to local disk. Files land in one directory
//! under a random name; callers get back the public URL path the server
//! serves the directory under.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::WorkflowError;

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// URL path prefix the saved files are served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Clone)]
pub struct DiskUploadStore {
    dir: PathBuf,
}

impl DiskUploadStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Result<Self, WorkflowError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| WorkflowError::Storage(e.to_string()))?;
        debug!(dir = %dir.display(), "upload store ready");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist an uploaded image and return its public URL path. The
    /// original name contributes only its extension; the stored name is
    /// a fresh uuid so uploads can never collide or traverse paths.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, WorkflowError> {
        if bytes.is_empty() {
            return Err(WorkflowError::validation("No file uploaded!"));
        }
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
            .ok_or_else(|| {
                WorkflowError::validation(
                    "Only image files are allowed (png, jpg, jpeg, gif, webp).",
                )
            })?;

        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let path = self.dir.join(&filename);
        fs::write(&path, bytes).await.map_err(|e| WorkflowError::Storage(e.to_string()))?;

        info!(file = %filename, size = bytes.len(), "upload_stored");
        Ok(format!("{PUBLIC_PREFIX}/{filename}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("uploads-test-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_save_returns_public_url_and_writes_file() -> anyhow::Result<()> {
        let dir = scratch_dir();
        let store = DiskUploadStore::new(&dir)?;

        let url = store.save("photo.PNG", b"fake image bytes").await?;
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"), "extension lowercased: {url}");

        let filename = url.trim_start_matches("/uploads/");
        let on_disk = tokio::fs::read(dir.join(filename)).await?;
        assert_eq!(on_disk, b"fake image bytes");

        tokio::fs::remove_dir_all(&dir).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_save_rejects_empty_payload() -> anyhow::Result<()> {
        let dir = scratch_dir();
        let store = DiskUploadStore::new(&dir)?;

        let err = store.save("photo.png", b"").await.unwrap_err();
        match err {
            WorkflowError::Validation(msgs) => assert_eq!(msgs, vec!["No file uploaded!".to_string()]),
            other => panic!("expected validation error, got {other:?}"),
        }

        tokio::fs::remove_dir_all(&dir).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_save_rejects_unknown_extensions() -> anyhow::Result<()> {
        let dir = scratch_dir();
        let store = DiskUploadStore::new(&dir)?;

        for name in ["malware.exe", "noext", "archive.tar.gz", ".png"] {
            let err = store.save(name, b"data").await.unwrap_err();
            assert!(matches!(err, WorkflowError::Validation(_)), "name {name:?}");
        }

        tokio::fs::remove_dir_all(&dir).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_two_saves_never_collide() -> anyhow::Result<()> {
        let dir = scratch_dir();
        let store = DiskUploadStore::new(&dir)?;

        let a = store.save("same.jpg", b"first").await?;
        let b = store.save("same.jpg", b"second").await?;
        assert_ne!(a, b);

        tokio::fs::remove_dir_all(&dir).await?;
        Ok(())
    }
}
