pub mod ai_detection;
pub mod analyzer;
pub mod inference;
pub mod knowledge;
pub mod report;

pub use ai_detection::{AiImageDetector, HeuristicDetector};
pub use analyzer::{AnalysisError, LotAnalyzer};
pub use inference::{ClassifierClient, DetectorClient, EmbeddingClient};
pub use knowledge::KnowledgeStore;
pub use report::ReportService;
