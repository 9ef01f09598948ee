//! Clients for the model-serving backend
//!
//! The detector, AI-image classifier and multimodal embedder are pre-trained
//! models served over HTTP. Each client is constructed once at startup and
//! shared for the process lifetime; handlers must not build per-request
//! clients.

mod classifier;
mod detector;
mod embedding;

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat};
use serde::Serialize;

pub use classifier::{ClassifierClient, ClassifierResponse};
pub use detector::DetectorClient;
pub use embedding::EmbeddingClient;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model backend returned status {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Failed to parse model response: {0}")]
    Parse(String),

    #[error("Failed to encode image: {0}")]
    ImageEncode(#[from] image::ImageError),
}

/// Request body shared by the image routes of the model backend.
#[derive(Debug, Serialize)]
pub struct ImagePayload {
    pub image_data: String,
}

impl ImagePayload {
    /// Encode an image as base64 PNG for transport.
    pub fn from_image(image: &DynamicImage) -> Result<Self, InferenceError> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(Self {
            image_data: BASE64.encode(buffer.into_inner()),
        })
    }
}

/// Map a non-success response into a backend error with its body attached.
pub(crate) async fn backend_error(response: reqwest::Response) -> InferenceError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    InferenceError::Backend { status, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn image_payload_is_base64_png() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        let payload = ImagePayload::from_image(&image).unwrap();
        let bytes = BASE64.decode(payload.image_data).unwrap();
        // PNG magic bytes
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
    }
}
