pub mod analysis;
pub mod config;

pub use analysis::{AiDetection, AnalysisResult, DetectedObject, RiskLevel, SimilarCase};
pub use config::{AiPolicyKind, Config, InferenceConfig, ReportConfig};
