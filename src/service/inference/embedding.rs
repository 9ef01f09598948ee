//! Multimodal embedding backend client
//!
//! Projects images and texts into the same CLIP-style embedding space, so
//! their cosine similarity is meaningful.

use image::DynamicImage;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{backend_error, ImagePayload, InferenceError};

#[derive(Debug, Serialize)]
struct TextPayload<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Client for the embedding routes of the model backend
pub struct EmbeddingClient {
    client: Client,
    base_url: Url,
}

impl EmbeddingClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Embed a lot image.
    pub async fn embed_image(&self, image: &DynamicImage) -> Result<Vec<f32>, InferenceError> {
        let payload = ImagePayload::from_image(image)?;
        self.request("embed/image", &payload).await
    }

    /// Embed a text in the shared multimodal space.
    pub async fn embed_text(&self, text: &str) -> Result<Vec<f32>, InferenceError> {
        self.request("embed/text", &TextPayload { text }).await
    }

    async fn request<B: Serialize>(&self, route: &str, body: &B) -> Result<Vec<f32>, InferenceError> {
        let url = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            route
        );

        tracing::debug!(url = %url, "Requesting embedding");

        let response = self.client.post(&url).json(body).send().await?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Parse(format!("embedding response: {}", e)))?;

        if parsed.embedding.is_empty() {
            return Err(InferenceError::Parse(
                "embedding response contained an empty vector".to_string(),
            ));
        }

        Ok(parsed.embedding)
    }
}
