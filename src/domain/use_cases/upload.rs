use std::path::{Path, PathBuf};

use actix_multipart::form::tempfile::TempFile;
use image::ImageReader;

use crate::{
    entities::{generation::AspectRatio, upload::StoredImage},
    errors::UploadError,
    utils::secure_filename::{allowed_file, unique_filename},
};

/// Accepts uploaded images into the upload directory.
#[derive(Debug, Clone)]
pub struct UploadHandler {
    upload_dir: PathBuf,
}

impl UploadHandler {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        UploadHandler {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Checks the client filename, returning it when acceptable.
    ///
    /// A part without any filename is a plain field, not a file.
    pub fn validate_file_name(file_name: Option<&str>) -> Result<&str, UploadError> {
        let name = match file_name {
            None => return Err(UploadError::NoFilePart),
            Some("") => return Err(UploadError::NoSelectedFile),
            Some(name) => name,
        };

        if !allowed_file(name) {
            return Err(UploadError::InvalidFileType);
        }

        Ok(name)
    }

    /// Validates the multipart file, moves it into the upload directory
    /// under a unique name and classifies its aspect ratio.
    ///
    /// On any error after the file has been written it is removed again.
    pub async fn store(&self, file: Option<TempFile>) -> Result<StoredImage, UploadError> {
        let file = file.ok_or(UploadError::NoFilePart)?;
        let original = Self::validate_file_name(file.file_name.as_deref())?;

        let file_name = unique_filename(original);
        let destination = self.upload_dir.join(&file_name);

        persist_temp_file(file, &destination).await?;
        let stored = StoredImage::new(destination, file_name);

        let (width, height) = read_dimensions(stored.path()).await?;
        let aspect_ratio = AspectRatio::from_dimensions(width, height);

        tracing::info!(
            file = %stored.file_name(),
            width,
            height,
            aspect_ratio = %aspect_ratio,
            "Stored uploaded image"
        );

        Ok(stored.with_aspect_ratio(aspect_ratio))
    }
}

/// Renames the multipart temp file into place, copying when the rename
/// crosses filesystems.
async fn persist_temp_file(file: TempFile, destination: &Path) -> Result<(), UploadError> {
    let target = destination.to_path_buf();

    let persisted = tokio::task::spawn_blocking(move || match file.file.persist(&target) {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::debug!(error = %e.error, "Rename failed, copying upload instead");
            copy_into_place(e.file.path(), &target)
        }
    })
    .await
    .map_err(|e| UploadError::Storage(std::io::Error::other(e)))?;

    persisted.map_err(|e| {
        tracing::error!(path = %destination.display(), error = %e, "Failed to persist upload");
        UploadError::Storage(e)
    })
}

/// Copies `source` to `target`, removing whatever was written at `target`
/// when the copy fails.
fn copy_into_place(source: &Path, target: &Path) -> std::io::Result<()> {
    std::fs::copy(source, target).map(|_| ()).inspect_err(|_| {
        if let Err(e) = std::fs::remove_file(target) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %target.display(), error = %e, "Failed to remove partial upload");
            }
        }
    })
}

/// Reads pixel dimensions from the image header, sniffing the format from
/// the content.
async fn read_dimensions(path: &Path) -> Result<(u32, u32), UploadError> {
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || {
        ImageReader::open(&path)?
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| UploadError::InvalidImage(e.to_string()))
    })
    .await
    .map_err(|e| UploadError::Storage(std::io::Error::other(e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgb};
    use std::io::{Cursor, Write};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(width, height);
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    fn temp_upload(dir: &Path, name: Option<&str>, bytes: &[u8]) -> TempFile {
        let mut file = tempfile::NamedTempFile::new_in(dir).unwrap();
        file.write_all(bytes).unwrap();

        TempFile {
            file,
            content_type: None,
            file_name: name.map(str::to_string),
            size: bytes.len(),
        }
    }

    fn files_in(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    #[test]
    fn rejects_missing_and_disallowed_names() {
        assert!(matches!(
            UploadHandler::validate_file_name(None),
            Err(UploadError::NoFilePart)
        ));
        assert!(matches!(
            UploadHandler::validate_file_name(Some("")),
            Err(UploadError::NoSelectedFile)
        ));
        assert!(matches!(
            UploadHandler::validate_file_name(Some("script.sh")),
            Err(UploadError::InvalidFileType)
        ));
        assert_eq!(UploadHandler::validate_file_name(Some("a.JPG")).unwrap(), "a.JPG");
    }

    #[tokio::test]
    async fn missing_file_field_is_no_file_part() {
        let dir = tempfile::tempdir().unwrap();
        let handler = UploadHandler::new(dir.path());

        assert!(matches!(handler.store(None).await, Err(UploadError::NoFilePart)));
    }

    #[tokio::test]
    async fn file_field_without_filename_is_no_file_part() {
        let dir = tempfile::tempdir().unwrap();
        let handler = UploadHandler::new(dir.path());
        let upload = temp_upload(dir.path(), None, b"hello");

        assert!(matches!(handler.store(Some(upload)).await, Err(UploadError::NoFilePart)));
    }

    #[test]
    fn failed_copy_leaves_nothing_at_destination() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("abc_cat.png");
        std::fs::write(&target, b"partial").unwrap();

        let result = copy_into_place(&dir.path().join("missing.png"), &target);

        assert!(result.is_err());
        assert!(!target.exists());
    }

    #[test]
    fn copy_into_place_copies_contents() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.png");
        let target = dir.path().join("target.png");
        std::fs::write(&source, b"png").unwrap();

        copy_into_place(&source, &target).unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"png");
    }

    #[tokio::test]
    async fn stores_landscape_png_under_unique_name() {
        let dir = tempfile::tempdir().unwrap();
        let handler = UploadHandler::new(dir.path());
        let upload = temp_upload(dir.path(), Some("my cat.png"), &png_bytes(1920, 1080));

        let stored = handler.store(Some(upload)).await.unwrap();

        assert_eq!(stored.aspect_ratio(), AspectRatio::Landscape);
        assert!(stored.file_name().ends_with("_my_cat.png"));
        assert!(stored.path().exists());
        assert_eq!(files_in(dir.path()), vec![stored.path().to_path_buf()]);

        stored.remove().await.unwrap();
        assert!(files_in(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn square_image_is_portrait() {
        let dir = tempfile::tempdir().unwrap();
        let handler = UploadHandler::new(dir.path());
        let upload = temp_upload(dir.path(), Some("square.png"), &png_bytes(64, 64));

        let stored = handler.store(Some(upload)).await.unwrap();

        assert_eq!(stored.aspect_ratio(), AspectRatio::Portrait);
    }

    #[tokio::test]
    async fn undecodable_image_is_rejected_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let handler = UploadHandler::new(dir.path());
        let upload = temp_upload(dir.path(), Some("fake.png"), b"definitely not a png");

        let result = handler.store(Some(upload)).await;

        assert!(matches!(result, Err(UploadError::InvalidImage(_))));
        assert!(files_in(dir.path()).is_empty());
    }
}
