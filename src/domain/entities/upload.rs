use std::{
    io,
    path::{Path, PathBuf},
};

use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};

use crate::entities::generation::AspectRatio;

// ───── Input ────────────────────────────────────────────────────────

/// Multipart body accepted by `/generate`.
///
/// Both fields are optional at the extractor level so that a missing file
/// is reported by the upload handler rather than by actix.
#[derive(Debug, MultipartForm)]
pub struct GenerateUpload {
    #[multipart(rename = "file")]
    pub file: Option<TempFile>,

    #[multipart(rename = "promptText")]
    pub prompt_text: Option<Text<String>>,
}

impl GenerateUpload {
    pub fn prompt_text(&self) -> String {
        self.prompt_text
            .as_ref()
            .map(|text| text.0.clone())
            .unwrap_or_default()
    }
}

// ───── Stored Image ─────────────────────────────────────────────────

/// An uploaded image written into the upload directory.
///
/// The file lives exactly as long as this value: [`StoredImage::remove`]
/// deletes it explicitly and `Drop` deletes it when the owning request is
/// abandoned on any other path (errors, client disconnect).
#[derive(Debug)]
pub struct StoredImage {
    path: PathBuf,
    file_name: String,
    aspect_ratio: Option<AspectRatio>,
    removed: bool,
}

impl StoredImage {
    pub fn new(path: PathBuf, file_name: String) -> Self {
        Self {
            path,
            file_name,
            aspect_ratio: None,
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Generated name under which the image is served.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio.unwrap_or(AspectRatio::Portrait)
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(aspect_ratio);
        self
    }

    /// Deletes the file. A file that is already gone counts as removed.
    pub async fn remove(mut self) -> io::Result<()> {
        self.removed = true;

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!(file = %self.file_name, "Removed uploaded image");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(file = %self.file_name, "Uploaded image was already removed");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

impl Drop for StoredImage {
    fn drop(&mut self) {
        if self.removed {
            return;
        }

        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(file = %self.file_name, "Removed abandoned uploaded image"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                file = %self.file_name,
                error = %e,
                "Failed to remove abandoned uploaded image"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_in(dir: &Path) -> StoredImage {
        let path = dir.join("abc_cat.png");
        std::fs::write(&path, b"png").unwrap();
        StoredImage::new(path, "abc_cat.png".to_string())
    }

    #[tokio::test]
    async fn remove_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let image = stored_in(dir.path());
        let path = image.path().to_path_buf();

        image.remove().await.unwrap();

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn remove_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let image = stored_in(dir.path());
        std::fs::remove_file(image.path()).unwrap();

        assert!(image.remove().await.is_ok());
    }

    #[test]
    fn drop_deletes_abandoned_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let image = stored_in(dir.path()).with_aspect_ratio(AspectRatio::Landscape);
            assert_eq!(image.aspect_ratio(), AspectRatio::Landscape);
            image.path().to_path_buf()
        };

        assert!(!path.exists());
    }
}
