use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;

/// File extensions accepted for uploaded images
const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Public URL prefix under which stored images are served
const PUBLIC_PREFIX: &str = "/uploads";

/// Stores uploaded image bytes on disk and hands back an addressable
/// public reference. Images are stored as-is; no processing is performed.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the storage directory if it does not exist yet.
    pub async fn ensure_root(&self) -> Result<(), ServiceError> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            ServiceError::Internal(format!(
                "failed to create upload directory {}: {}",
                self.root.display(),
                e
            ))
        })
    }

    /// Validates the original filename and returns its lowercased extension.
    pub fn validate_extension(original_name: &str) -> Result<String, ServiceError> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            Ok(ext)
        } else {
            Err(ServiceError::InvalidUpload(
                "only .jpg, .jpeg, and .png files are accepted".to_string(),
            ))
        }
    }

    /// Stores image bytes under a generated opaque filename and returns the
    /// public path the file is served from.
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn store(&self, original_name: &str, data: Bytes) -> Result<String, ServiceError> {
        let ext = Self::validate_extension(original_name)?;

        if data.len() > self.max_bytes {
            return Err(ServiceError::InvalidUpload(format!(
                "file exceeds the maximum upload size of {} bytes",
                self.max_bytes
            )));
        }

        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let path = self.root.join(&filename);

        tokio::fs::write(&path, &data).await.map_err(|e| {
            ServiceError::Internal(format!("failed to write upload {}: {}", path.display(), e))
        })?;

        info!(filename = %filename, bytes = data.len(), "stored uploaded image");

        Ok(format!("{}/{}", PUBLIC_PREFIX, filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_image_extensions_case_insensitively() {
        assert_eq!(ImageStore::validate_extension("plan.png").unwrap(), "png");
        assert_eq!(ImageStore::validate_extension("PLAN.JPG").unwrap(), "jpg");
        assert_eq!(ImageStore::validate_extension("a.b.jpeg").unwrap(), "jpeg");
    }

    #[test]
    fn rejects_other_extensions() {
        assert!(ImageStore::validate_extension("plan.gif").is_err());
        assert!(ImageStore::validate_extension("plan.svg").is_err());
        assert!(ImageStore::validate_extension("plan").is_err());
        assert!(ImageStore::validate_extension("").is_err());
    }

    #[tokio::test]
    async fn store_writes_file_and_returns_public_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), 1024);
        store.ensure_root().await.unwrap();

        let url = store
            .store("floor1.png", Bytes::from_static(b"not-a-real-png"))
            .await
            .unwrap();

        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));

        let stored = dir.path().join(url.trim_start_matches("/uploads/"));
        let contents = tokio::fs::read(stored).await.unwrap();
        assert_eq!(contents, b"not-a-real-png");
    }

    #[tokio::test]
    async fn store_rejects_oversize_payload() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), 8);

        let err = store
            .store("big.jpg", Bytes::from_static(b"way too many bytes"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidUpload(_)));
    }
}
