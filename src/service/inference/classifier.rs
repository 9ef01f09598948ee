//! AI-image binary classifier backend client

use image::DynamicImage;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{backend_error, ImagePayload, InferenceError};

/// Labels the classifier may use for the synthetic class.
const SYNTHETIC_LABELS: &[&str] = &["artificial", "fake"];

/// Class probabilities from the classifier backend.
#[derive(Debug, Deserialize)]
pub struct ClassifierResponse {
    pub predictions: Vec<f32>,
    pub class_labels: Vec<String>,
}

impl ClassifierResponse {
    /// Probability assigned to the synthetic ("artificial"/"fake") label,
    /// 0.0 when no such label is present.
    pub fn synthetic_score(&self) -> f32 {
        self.class_labels
            .iter()
            .position(|label| {
                SYNTHETIC_LABELS
                    .iter()
                    .any(|s| label.eq_ignore_ascii_case(s))
            })
            .and_then(|idx| self.predictions.get(idx))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Client for the image-classification route of the model backend
pub struct ClassifierClient {
    client: Client,
    base_url: Url,
}

impl ClassifierClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Classify the lot image as natural vs synthetic.
    pub async fn classify(&self, image: &DynamicImage) -> Result<ClassifierResponse, InferenceError> {
        let url = format!("{}/classify", self.base_url.as_str().trim_end_matches('/'));
        let payload = ImagePayload::from_image(image)?;

        tracing::debug!(url = %url, "Requesting AI-image classification");

        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        let parsed: ClassifierResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Parse(format!("classifier response: {}", e)))?;

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(labels: &[&str], predictions: &[f32]) -> ClassifierResponse {
        ClassifierResponse {
            predictions: predictions.to_vec(),
            class_labels: labels.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn score_comes_from_artificial_label() {
        let r = response(&["natural", "artificial"], &[0.3, 0.7]);
        assert_eq!(r.synthetic_score(), 0.7);
    }

    #[test]
    fn fake_label_is_accepted_case_insensitively() {
        let r = response(&["Real", "FAKE"], &[0.1, 0.9]);
        assert_eq!(r.synthetic_score(), 0.9);
    }

    #[test]
    fn missing_synthetic_label_scores_zero() {
        let r = response(&["cat", "dog"], &[0.5, 0.5]);
        assert_eq!(r.synthetic_score(), 0.0);
    }

    #[test]
    fn label_without_prediction_scores_zero() {
        let r = response(&["natural", "artificial"], &[0.3]);
        assert_eq!(r.synthetic_score(), 0.0);
    }
}
