//! Application state and service initialization
//!
//! Centralizes service construction and dependency injection. Model-backend
//! clients and the database pool are built once here and shared for the
//! process lifetime.

use crate::db::repository::LotCaseRepository;
use crate::model::{AiPolicyKind, Config};
use crate::service::{
    AiImageDetector, ClassifierClient, DetectorClient, EmbeddingClient, HeuristicDetector,
    KnowledgeStore, LotAnalyzer, ReportService,
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database initialization failed: {0}")]
    DatabaseInit(String),
}

/// Application state containing all services and shared resources
pub struct AppState {
    /// The fraud-scoring pipeline
    pub analyzer: LotAnalyzer,
    /// Knowledge store, exposed separately for the listing and health APIs
    pub knowledge: KnowledgeStore,
    /// Report generation service
    pub report_service: ReportService,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// This performs:
    /// 1. Database connection and schema initialization
    /// 2. Model-backend client construction (one handle per backend)
    /// 3. AI-detection policy selection
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        let db_pool = crate::db::create_pool(&config.database_path)
            .await
            .map_err(|e| AppError::DatabaseInit(e.to_string()))?;

        crate::db::init_schema(&db_pool)
            .await
            .map_err(|e| AppError::DatabaseInit(e.to_string()))?;

        let repository = LotCaseRepository::new(db_pool);
        let knowledge = KnowledgeStore::new(repository);

        let detector = DetectorClient::new(config.inference.base_url.clone());
        let embedder = EmbeddingClient::new(config.inference.base_url.clone());

        let ai_detector = match config.ai_policy {
            AiPolicyKind::Heuristic => {
                tracing::info!("AI-image detection policy: heuristic");
                AiImageDetector::Heuristic(HeuristicDetector)
            }
            AiPolicyKind::Classifier => {
                tracing::info!(
                    base_url = %config.inference.base_url,
                    "AI-image detection policy: classifier"
                );
                AiImageDetector::Classifier(ClassifierClient::new(
                    config.inference.base_url.clone(),
                ))
            }
        };

        let analyzer = LotAnalyzer::new(detector, ai_detector, embedder, knowledge.clone());
        let report_service = ReportService::new(&config.report);

        Ok(Self {
            analyzer,
            knowledge,
            report_service,
        })
    }
}
