//! Image payload encoding.
//!
//! Reads an image from disk once and turns it into the base64 text the remote
//! service expects inline in its JSON body.

use crate::error::{AnalysisError, PipelineResult};
use crate::types::ProductLabel;
use base64::Engine;
use std::path::{Path, PathBuf};

/// An image on disk plus the MIME type it should be sent as.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub path: PathBuf,
    pub mime_type: String,
}

impl ImageFile {
    /// Create an `ImageFile`, inferring the MIME type from the extension.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime_type = mime_type_for(&path).to_string();
        Self { path, mime_type }
    }

    /// Override the inferred MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }
}

fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpeg" | "jpg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        other => {
            tracing::warn!("Unknown image extension '{other}', defaulting to image/jpeg");
            "image/jpeg"
        }
    }
}

/// Base64-encoded image ready to embed in a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Standard base64 of the image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub mime_type: String,
}

impl EncodedImage {
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type: mime_type.to_string(),
        }
    }
}

/// One analysis call's input, with the image bytes already read.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub product_label: ProductLabel,
    pub image_bytes: Vec<u8>,
    pub mime_type: String,
}

impl AnalysisRequest {
    /// Read `image` from disk, refusing files above `max_bytes`.
    pub async fn load(
        label: &ProductLabel,
        image: &ImageFile,
        max_bytes: u64,
    ) -> PipelineResult<Self> {
        let encoding_error = |message: String| AnalysisError::Encoding {
            path: image.path.clone(),
            message,
        };

        let metadata = tokio::fs::metadata(&image.path)
            .await
            .map_err(|e| encoding_error(e.to_string()))?;
        if !metadata.is_file() {
            return Err(encoding_error("not a regular file".to_string()));
        }
        if metadata.len() > max_bytes {
            return Err(encoding_error(format!(
                "{} bytes exceeds the {max_bytes} byte limit",
                metadata.len()
            )));
        }

        let image_bytes = tokio::fs::read(&image.path)
            .await
            .map_err(|e| encoding_error(e.to_string()))?;

        Ok(Self {
            product_label: label.clone(),
            image_bytes,
            mime_type: image.mime_type.clone(),
        })
    }

    pub fn encode(&self) -> EncodedImage {
        EncodedImage::from_bytes(&self.image_bytes, &self.mime_type)
    }
}
