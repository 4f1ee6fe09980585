use std::path::Path;

use tracing::{debug, warn};

use crate::core::error::{AppError, AppResult};
use crate::core::models::LogoAsset;

/// Decodes user-supplied logo files into [`LogoAsset`]s.
#[derive(Debug, Clone, Copy)]
pub struct LogoLoader {
    max_bytes: u64,
}

impl LogoLoader {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Decode an uploaded payload. `declared_mime` is whatever the client
    /// claimed; when present it must be an image type.
    pub async fn load_bytes(&self, bytes: Vec<u8>, declared_mime: Option<&str>) -> AppResult<LogoAsset> {
        self.check_size(bytes.len() as u64)?;
        if bytes.is_empty() {
            return Err(AppError::UnreadableFile("empty file".to_string()));
        }
        if let Some(mime) = declared_mime {
            check_mime(mime)?;
        }

        let byte_len = bytes.len() as u64;
        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| AppError::UndecodableImage(format!("decoder task failed: {}", e)))?
            .map_err(|e| {
                warn!("Failed to decode logo: {}", e);
                AppError::UndecodableImage(e.to_string())
            })?;

        let image = decoded.to_rgba8();
        if image.width() == 0 || image.height() == 0 {
            return Err(AppError::UndecodableImage("image has no pixels".to_string()));
        }

        debug!(
            width = image.width(),
            height = image.height(),
            byte_len,
            "Logo decoded"
        );
        Ok(LogoAsset::new(image, byte_len))
    }

    /// Read and decode a logo from disk. The size limit is checked before reading.
    pub async fn load_path(&self, path: &Path) -> AppResult<LogoAsset> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| AppError::UnreadableFile(format!("{}: {}", path.display(), e)))?;
        if !metadata.is_file() {
            return Err(AppError::UnreadableFile(format!("{} is not a file", path.display())));
        }
        self.check_size(metadata.len())?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::UnreadableFile(format!("{}: {}", path.display(), e)))?;

        let guessed = mime_guess::from_path(path).first();
        self.load_bytes(bytes, guessed.as_ref().map(|m| m.essence_str())).await
    }

    fn check_size(&self, size: u64) -> AppResult<()> {
        if size > self.max_bytes {
            return Err(AppError::LogoTooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

fn check_mime(mime: &str) -> AppResult<()> {
    let mime = mime.trim();
    // Browsers send an empty type or octet-stream for unknown files; let the decoder decide.
    if mime.is_empty() || mime.eq_ignore_ascii_case("application/octet-stream") {
        return Ok(());
    }
    if mime.to_ascii_lowercase().starts_with("image/") {
        Ok(())
    } else {
        Err(AppError::UndecodableImage(format!("not an image type: {}", mime)))
    }
}
