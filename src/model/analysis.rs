//! Domain model for lot analysis results

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Ternary fraud-risk verdict for a lot.
///
/// Serialized with the Russian labels the rest of the system (stored cases,
/// prompts, front-end) expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RiskLevel {
    #[serde(rename = "низкий")]
    Low,
    #[serde(rename = "средний")]
    Medium,
    #[serde(rename = "высокий")]
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "низкий",
            RiskLevel::Medium => "средний",
            RiskLevel::High => "высокий",
        }
    }

    /// Buyer-facing advice attached to the final verdict.
    pub fn purchase_advice(&self) -> &'static str {
        match self {
            RiskLevel::High => "Не рекомендуется к покупке",
            RiskLevel::Medium => "Проверьте отзывы и рейтинг продавца",
            RiskLevel::Low => "Лот выглядит безопасным для покупки",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "низкий" => Ok(RiskLevel::Low),
            "средний" => Ok(RiskLevel::Medium),
            "высокий" => Ok(RiskLevel::High),
            other => Err(format!("unknown risk level: {}", other)),
        }
    }
}

/// Outcome of the AI-generation check on the lot image.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AiDetection {
    pub is_ai_generated: bool,
    /// Score in [0, 1]; the decision threshold is policy-specific.
    pub ai_score: f32,
    pub explanation: String,
}

/// One labeled bounding box from the object detector, kept for the
/// front-end overlay.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DetectedObject {
    pub label: String,
    pub confidence: f32,
    /// Pixel coordinates as [x1, y1, x2, y2].
    pub bbox: [f32; 4],
}

/// A similar historical case retrieved from the knowledge store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SimilarCase {
    /// Composite document text of the stored lot.
    pub description: String,
    pub risk_level: RiskLevel,
    /// Derived purely from `risk_level`.
    pub recommendation: String,
}

/// Full result of one lot analysis. Built once per invocation and
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResult {
    pub lot_id: String,
    /// Detected object labels, duplicates allowed, in raw model order.
    pub detected_objects: Vec<String>,
    /// Per-box detail for visualization.
    pub boxes: Vec<DetectedObject>,
    /// Image/text cosine similarity, rounded to 3 decimals.
    pub similarity_score: f32,
    pub ai_detection: AiDetection,
    pub risk_level: RiskLevel,
    /// Retrieved similar cases grounding the generated report.
    pub rag_context: Vec<SimilarCase>,
    pub category: String,
    pub has_forbidden: bool,
    /// Object labels considered anomalous for the derived category.
    pub forbidden_objects: Vec<String>,
}
