//! Retrieval-augmented report generation
//!
//! Sends the templated prompt to an Ollama-compatible endpoint. Any failure
//! (transport, timeout, non-200 status, malformed body) is recovered into a
//! human-readable fallback string. Callers always receive display-safe text;
//! the return value never signals an error.

pub mod prompts;

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::model::{AnalysisResult, ReportConfig};

pub use prompts::build_report_prompt;

const GENERATION_TEMPERATURE: f64 = 0.3;

#[derive(Debug, thiserror::Error)]
enum ReportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Status(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for the report-generation endpoint
pub struct ReportService {
    client: Client,
    base_url: Url,
    model: String,
    timeout: Duration,
}

impl ReportService {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Generate the prose report for an analyzed lot.
    ///
    /// Never fails: on any transport or status error the returned string is
    /// a readable fallback describing the failure.
    pub async fn generate_report(&self, result: &AnalysisResult, description: &str) -> String {
        let prompt = build_report_prompt(result, description);

        match self.request(&prompt).await {
            Ok(text) => text,
            Err(ReportError::Status(body)) => {
                tracing::warn!(lot_id = %result.lot_id, error = %body, "Report generation failed");
                format!("Ошибка генерации отчёта: {}", body)
            }
            // Transport failures and unusable bodies share the fallback:
            // either way no generated text was obtained from the endpoint.
            Err(err) => {
                tracing::warn!(lot_id = %result.lot_id, error = %err, "Report endpoint unusable");
                format!(
                    "Не удалось подключиться к LLM: {}. Используйте локальный режим анализа.",
                    err
                )
            }
        }
    }

    async fn request(&self, prompt: &str) -> Result<String, ReportError> {
        let url = format!(
            "{}/api/generate",
            self.base_url.as_str().trim_end_matches('/')
        );

        tracing::debug!(url = %url, model = %self.model, "Requesting report generation");

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
                "options": { "temperature": GENERATION_TEMPERATURE },
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::Status(body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ReportError::Parse(e.to_string()))?;

        Ok(parsed.response)
    }
}
