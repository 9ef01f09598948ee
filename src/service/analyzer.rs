//! Lot analysis pipeline
//!
//! Runs object detection, AI-image detection and image/text similarity on
//! the same (image, text) pair, derives category violations and the risk
//! verdict, records the case and retrieves similar ones. Either a full
//! [`AnalysisResult`] is produced or the analysis fails outright; only the
//! report step downstream degrades gracefully.

use image::DynamicImage;

use crate::db::DbError;
use crate::model::{AiDetection, AnalysisResult, RiskLevel};
use crate::rules::{categorize, cosine_similarity, evaluate, RiskPolicy, RiskSignals};
use crate::service::ai_detection::AiImageDetector;
use crate::service::inference::{DetectorClient, EmbeddingClient, InferenceError};
use crate::service::knowledge::{KnowledgeStore, DEFAULT_TOP_K};

const VERDICT_HIGH: &str = "Подозрительный лот: высокое несоответствие или ИИ-изображение";
const VERDICT_OTHER: &str = "Несоответствие текста и изображения";

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Signals aggregated by the pure half of the pipeline.
#[derive(Debug)]
struct AggregatedSignals {
    category: &'static str,
    forbidden_objects: Vec<String>,
    has_forbidden: bool,
    risk_level: RiskLevel,
    verdict: &'static str,
}

/// Pure aggregation: category, forbidden-object violations and the risk
/// verdict from the three upstream signals. Fully reproducible given
/// identical inputs.
fn aggregate(
    text: &str,
    detected_objects: &[String],
    similarity_score: f32,
    ai_detection: &AiDetection,
    policy: &RiskPolicy,
) -> AggregatedSignals {
    let matched = categorize(text);
    let has_forbidden = matched
        .forbidden_objects
        .iter()
        .any(|forbidden| detected_objects.iter().any(|obj| obj == forbidden));

    let risk_level = evaluate(
        policy,
        &RiskSignals {
            is_ai_generated: ai_detection.is_ai_generated,
            similarity_score,
            has_forbidden,
        },
    );

    let verdict = if risk_level == RiskLevel::High {
        VERDICT_HIGH
    } else {
        VERDICT_OTHER
    };

    AggregatedSignals {
        category: matched.category,
        forbidden_objects: matched
            .forbidden_objects
            .iter()
            .map(|s| s.to_string())
            .collect(),
        has_forbidden,
        risk_level,
        verdict,
    }
}

/// The fraud-scoring pipeline. Holds long-lived handles to the model
/// backends and the knowledge store; built once at startup.
pub struct LotAnalyzer {
    detector: DetectorClient,
    ai_detector: AiImageDetector,
    embedder: EmbeddingClient,
    knowledge: KnowledgeStore,
    risk_policy: RiskPolicy,
}

impl LotAnalyzer {
    pub fn new(
        detector: DetectorClient,
        ai_detector: AiImageDetector,
        embedder: EmbeddingClient,
        knowledge: KnowledgeStore,
    ) -> Self {
        Self {
            detector,
            ai_detector,
            embedder,
            knowledge,
            risk_policy: RiskPolicy::default(),
        }
    }

    /// Analyze one lot.
    ///
    /// Input validation happens before any model call. Model-backend
    /// failures propagate unmodified; no partial result is returned.
    pub async fn analyze(
        &self,
        image: &DynamicImage,
        text: &str,
        lot_id: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::MissingInput(
                "lot description is empty".to_string(),
            ));
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(AnalysisError::MissingInput("lot image is empty".to_string()));
        }

        tracing::info!(lot_id = %lot_id, "Starting lot analysis");

        // 1. Object detection
        let boxes = self.detector.detect(image).await?;
        let detected_objects: Vec<String> = boxes.iter().map(|b| b.label.clone()).collect();

        // 2. AI-generation check
        let ai_detection = self.ai_detector.detect(image).await?;

        // 3. Image/text semantic similarity
        let image_embedding = self.embedder.embed_image(image).await?;
        let text_embedding = self.embedder.embed_text(text).await?;
        let similarity = cosine_similarity(&image_embedding, &text_embedding);
        let similarity_score = round3(similarity);

        // 4-5. Category rules and risk verdict
        let signals = aggregate(
            text,
            &detected_objects,
            similarity_score,
            &ai_detection,
            &self.risk_policy,
        );

        tracing::info!(
            lot_id = %lot_id,
            category = signals.category,
            similarity = similarity_score,
            ai_score = ai_detection.ai_score,
            has_forbidden = signals.has_forbidden,
            risk_level = %signals.risk_level,
            "Lot signals aggregated"
        );

        // 6. Record the case for future retrieval
        let document = KnowledgeStore::build_document(
            text,
            &detected_objects,
            signals.risk_level,
            signals.verdict,
        );
        let document_embedding = self.embedder.embed_text(&document).await?;
        self.knowledge
            .record(
                lot_id,
                text,
                &detected_objects,
                signals.risk_level,
                signals.verdict,
                &document_embedding,
            )
            .await?;

        // 7. Retrieve similar historical cases
        let query_text = format!(
            "Товар: {}. Категория: {}. Объекты: {}",
            text,
            signals.category,
            detected_objects.join(", ")
        );
        let query_embedding = self.embedder.embed_text(&query_text).await?;
        let rag_context = self
            .knowledge
            .query_similar(&query_embedding, DEFAULT_TOP_K)
            .await?;

        Ok(AnalysisResult {
            lot_id: lot_id.to_string(),
            detected_objects,
            boxes,
            similarity_score,
            ai_detection,
            risk_level: signals.risk_level,
            rag_context,
            category: signals.category.to_string(),
            has_forbidden: signals.has_forbidden,
            forbidden_objects: signals.forbidden_objects,
        })
    }
}

fn round3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ai(is_generated: bool, score: f32) -> AiDetection {
        AiDetection {
            is_ai_generated: is_generated,
            ai_score: score,
            explanation: String::new(),
        }
    }

    fn labels(objects: &[&str]) -> Vec<String> {
        objects.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn office_chair_with_person_is_high_risk() {
        // Detected person on a furniture lot: forbidden match forces high
        // risk regardless of the other signals.
        let signals = aggregate(
            "офисный стул",
            &labels(&["person"]),
            0.1,
            &ai(false, 0.1),
            &RiskPolicy::default(),
        );

        assert_eq!(signals.category, "мебель");
        assert!(signals.has_forbidden);
        assert_eq!(signals.risk_level, RiskLevel::High);
        assert_eq!(
            signals.verdict,
            "Подозрительный лот: высокое несоответствие или ИИ-изображение"
        );
    }

    #[test]
    fn forbidden_match_holds_even_with_good_similarity() {
        let signals = aggregate(
            "офисный стул",
            &labels(&["person", "chair"]),
            0.9,
            &ai(false, 0.1),
            &RiskPolicy::default(),
        );
        assert_eq!(signals.risk_level, RiskLevel::High);
    }

    #[test]
    fn clean_furniture_lot_is_low_risk() {
        let signals = aggregate(
            "офисный стул",
            &labels(&["chair"]),
            0.8,
            &ai(false, 0.1),
            &RiskPolicy::default(),
        );
        assert_eq!(signals.category, "мебель");
        assert!(!signals.has_forbidden);
        assert_eq!(signals.risk_level, RiskLevel::Low);
        assert_eq!(signals.verdict, "Несоответствие текста и изображения");
    }

    #[test]
    fn unknown_category_has_no_forbidden_objects() {
        let signals = aggregate(
            "ваза декоративная",
            &labels(&["person", "car", "laptop"]),
            0.7,
            &ai(false, 0.1),
            &RiskPolicy::default(),
        );
        assert_eq!(signals.category, "другое");
        assert!(signals.forbidden_objects.is_empty());
        assert!(!signals.has_forbidden);
        assert_eq!(signals.risk_level, RiskLevel::Low);
    }

    #[test]
    fn moderate_similarity_is_medium_risk() {
        let signals = aggregate(
            "смартфон новый",
            &labels(&["cell phone"]),
            0.3,
            &ai(false, 0.1),
            &RiskPolicy::default(),
        );
        assert_eq!(signals.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn similarity_is_rounded_to_three_decimals() {
        assert_eq!(round3(0.123456), 0.123);
        assert_eq!(round3(0.9999), 1.0);
        assert_eq!(round3(-0.0004), -0.0);
    }
}
