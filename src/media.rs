//! Storage for images attached to posts.
//!
//! Uploads are decoded before they are accepted; anything that is not a
//! readable PNG or JPEG is rejected. Accepted files are named after the
//! SHA-256 of their content under `posts/`, so re-uploading the same image
//! reuses one file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::ImageFormat;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Field error shown for an upload that is not a usable image.
pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// Directory, relative to the media root, holding post images.
const POSTS_SUBDIR: &str = "posts";

/// Image formats accepted for post uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    const fn format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Sniff and fully decode `bytes`.
///
/// # Errors
///
/// Returns the user-facing message if the data is not a decodable PNG or JPEG.
pub fn detect_image(bytes: &[u8]) -> Result<ImageKind, &'static str> {
    let kind = match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => ImageKind::Png,
        Ok(ImageFormat::Jpeg) => ImageKind::Jpeg,
        _ => return Err(INVALID_IMAGE),
    };

    image::load_from_memory_with_format(bytes, kind.format()).map_err(|e| {
        debug!("Rejected upload that failed to decode: {e}");
        INVALID_IMAGE
    })?;

    Ok(kind)
}

/// Media files on local disk, served under `/media/`.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a validated image and return its path relative to the media root.
    pub async fn save_image(&self, bytes: &[u8], kind: ImageKind) -> Result<String> {
        let digest = hex::encode(Sha256::digest(bytes));
        let relative = format!("{POSTS_SUBDIR}/{}.{}", &digest[..16], kind.extension());

        let dir = self.root.join(POSTS_SUBDIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create media directory {}", dir.display()))?;

        let path = self.root.join(&relative);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tokio::fs::write(&path, bytes)
                .await
                .with_context(|| format!("Failed to write image {}", path.display()))?;
            debug!(path = %path.display(), size = bytes.len(), "Stored post image");
        }

        Ok(relative)
    }
}
