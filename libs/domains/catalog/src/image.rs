//! Image upload pipeline: validate, derive a thumbnail, persist both files.

use std::io::Cursor;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::ImageArtifact;
use crate::storage::FileStore;

/// Raw image part extracted from a multipart request
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Declared content type of the part
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Constraints applied to uploaded images
#[derive(Debug, Clone)]
pub struct ImagePolicy {
    /// Accepted content types
    pub allowed_types: Vec<String>,
    /// Maximum payload size in bytes
    pub max_bytes: usize,
    /// Thumbnail bounding box width
    pub thumb_width: u32,
    /// Thumbnail bounding box height
    pub thumb_height: u32,
}

impl Default for ImagePolicy {
    fn default() -> Self {
        Self {
            allowed_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
            max_bytes: 2 * 1024 * 1024,
            thumb_width: 200,
            thumb_height: 200,
        }
    }
}

impl ImagePolicy {
    /// File extension for an accepted content type
    fn extension_for(&self, content_type: &str) -> Option<&'static str> {
        if !self.allowed_types.iter().any(|t| t == content_type) {
            return None;
        }
        match content_type {
            "image/jpeg" => Some("jpg"),
            "image/png" => Some("png"),
            _ => None,
        }
    }
}

/// Turns a validated upload into a stored original + thumbnail pair.
///
/// Decoding and resizing run on a blocking thread; the original bytes are
/// stored as received, only the thumbnail is re-encoded. If the thumbnail
/// write fails the already-written original is removed again, so a failed
/// upload never leaves files behind.
pub struct ImageProcessor {
    policy: ImagePolicy,
    store: Arc<dyn FileStore>,
}

impl ImageProcessor {
    pub fn new(policy: ImagePolicy, store: Arc<dyn FileStore>) -> Self {
        Self { policy, store }
    }

    pub fn policy(&self) -> &ImagePolicy {
        &self.policy
    }

    #[instrument(skip(self, upload), fields(content_type = %upload.content_type, size = upload.bytes.len()))]
    pub async fn process(&self, upload: ImageUpload) -> CatalogResult<ImageArtifact> {
        let ext = self
            .policy
            .extension_for(&upload.content_type)
            .ok_or_else(|| {
                CatalogError::Validation(format!(
                    "Unsupported image type '{}', accepted: {}",
                    upload.content_type,
                    self.policy.allowed_types.join(", ")
                ))
            })?;

        if upload.bytes.len() > self.policy.max_bytes {
            return Err(CatalogError::Validation(format!(
                "Image of {} bytes exceeds the {} byte limit",
                upload.bytes.len(),
                self.policy.max_bytes
            )));
        }

        let format = image::ImageFormat::from_extension(ext).ok_or_else(|| {
            CatalogError::Validation(format!("Unsupported image extension '{}'", ext))
        })?;

        let id = Uuid::new_v4();
        let filename = format!("{id}.{ext}");
        let thumb = format!("thumb-{id}.{ext}");

        let (width, height) = (self.policy.thumb_width, self.policy.thumb_height);
        let bytes = upload.bytes;

        // Decode and resize off the async runtime
        let (original, thumbnail) = tokio::task::spawn_blocking(
            move || -> CatalogResult<(Vec<u8>, Vec<u8>)> {
                let decoded = image::load_from_memory_with_format(&bytes, format)
                    .map_err(|e| CatalogError::Validation(format!("Invalid image data: {e}")))?;

                let resized = decoded.thumbnail(width, height);
                let mut encoded = Vec::new();
                resized
                    .write_to(&mut Cursor::new(&mut encoded), format)
                    .map_err(|e| {
                        CatalogError::Storage(format!("Failed to encode thumbnail: {e}"))
                    })?;

                Ok((bytes, encoded))
            },
        )
        .await
        .map_err(|e| CatalogError::Storage(format!("Image task failed: {e}")))??;

        self.store.put(&filename, &original).await?;

        if let Err(e) = self.store.put(&thumb, &thumbnail).await {
            tracing::warn!(%filename, "Thumbnail write failed, removing original");
            if let Err(cleanup) = self.store.delete(&filename).await {
                tracing::warn!(%filename, error = %cleanup, "Failed to remove orphaned original");
            }
            return Err(e);
        }

        tracing::info!(%filename, %thumb, "Image artifact stored");
        Ok(ImageArtifact { filename, thumb })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LocalFileStore, MockFileStore};
    use mockall::predicate::always;

    /// Encode a small in-memory PNG for pipeline tests
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 30, 200]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    fn upload(bytes: Vec<u8>) -> ImageUpload {
        ImageUpload {
            content_type: "image/png".to_string(),
            bytes,
        }
    }

    #[tokio::test]
    async fn test_process_writes_original_and_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalFileStore::new(dir.path()));
        let processor = ImageProcessor::new(ImagePolicy::default(), store);

        let artifact = processor.process(upload(png_bytes(400, 300))).await.unwrap();

        assert!(artifact.filename.ends_with(".png"));
        assert_eq!(artifact.thumb, format!("thumb-{}", artifact.filename));
        assert!(dir.path().join(&artifact.filename).exists());
        assert!(dir.path().join(&artifact.thumb).exists());

        // Thumbnail fits the 200x200 bounding box, aspect preserved
        let thumb = image::open(dir.path().join(&artifact.thumb)).unwrap();
        assert_eq!(thumb.width(), 200);
        assert_eq!(thumb.height(), 150);
    }

    #[tokio::test]
    async fn test_rejected_content_type_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalFileStore::new(dir.path()));
        let processor = ImageProcessor::new(ImagePolicy::default(), store);

        let result = processor
            .process(ImageUpload {
                content_type: "image/gif".to_string(),
                bytes: png_bytes(10, 10),
            })
            .await;

        assert!(matches!(result, Err(CatalogError::Validation(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_payload_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalFileStore::new(dir.path()));
        let policy = ImagePolicy {
            max_bytes: 64,
            ..ImagePolicy::default()
        };
        let processor = ImageProcessor::new(policy, store);

        let result = processor.process(upload(png_bytes(100, 100))).await;

        assert!(matches!(result, Err(CatalogError::Validation(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_bytes_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalFileStore::new(dir.path()));
        let processor = ImageProcessor::new(ImagePolicy::default(), store);

        let result = processor.process(upload(vec![0u8; 128])).await;

        assert!(matches!(result, Err(CatalogError::Validation(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_thumbnail_write_failure_removes_original() {
        let mut store = MockFileStore::new();
        // First put (original) succeeds, second put (thumbnail) fails
        store
            .expect_put()
            .with(always(), always())
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_put()
            .with(always(), always())
            .times(1)
            .returning(|_, _| Err(CatalogError::Storage("disk full".to_string())));
        store
            .expect_delete()
            .times(1)
            .returning(|_| Ok(()));

        let processor = ImageProcessor::new(ImagePolicy::default(), Arc::new(store));
        let result = processor.process(upload(png_bytes(50, 50))).await;

        assert!(matches!(result, Err(CatalogError::Storage(_))));
    }
}
