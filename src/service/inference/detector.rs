//! Object-detection backend client
//!
//! Wraps a pre-trained YOLO-style detector served over HTTP. Labels are
//! returned in the model's raw detection order, duplicates included.

use image::DynamicImage;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::model::DetectedObject;

use super::{backend_error, ImagePayload, InferenceError};

#[derive(Debug, Deserialize)]
struct DetectResponse {
    detections: Vec<Detection>,
}

#[derive(Debug, Deserialize)]
struct Detection {
    label: String,
    confidence: f32,
    /// Pixel coordinates as [x1, y1, x2, y2].
    bbox: [f32; 4],
}

/// Client for the object-detection route of the model backend
pub struct DetectorClient {
    client: Client,
    base_url: Url,
}

impl DetectorClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Detect objects on the lot image.
    ///
    /// Failures propagate unmodified and are terminal for the analysis.
    pub async fn detect(&self, image: &DynamicImage) -> Result<Vec<DetectedObject>, InferenceError> {
        let url = format!("{}/detect", self.base_url.as_str().trim_end_matches('/'));
        let payload = ImagePayload::from_image(image)?;

        tracing::debug!(url = %url, "Requesting object detection");

        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        let parsed: DetectResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Parse(format!("detector response: {}", e)))?;

        tracing::debug!(count = parsed.detections.len(), "Object detection completed");

        Ok(parsed
            .detections
            .into_iter()
            .map(|d| DetectedObject {
                label: d.label,
                confidence: d.confidence,
                bbox: d.bbox,
            })
            .collect())
    }
}
