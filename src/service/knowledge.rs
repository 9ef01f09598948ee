//! Knowledge store: persisted lot cases and similar-case retrieval
//!
//! Every analyzed lot is recorded as a composite document with its embedding.
//! Retrieval is cosine top-k over the stored vectors. Embeddings are computed
//! by the caller so this service stays free of model-backend dependencies.

use std::str::FromStr;

use crate::db::models::{decode_embedding, encode_embedding, LotCaseRow, NewLotCase};
use crate::db::repository::LotCaseRepository;
use crate::db::DbError;
use crate::model::{RiskLevel, SimilarCase};
use crate::rules::cosine_similarity;

/// Number of similar cases retrieved per analysis.
pub const DEFAULT_TOP_K: usize = 2;

const RECOMMENDATION_SUSPICIOUS: &str = "Проверьте историю продавца";
const RECOMMENDATION_SAFE: &str = "Лот безопасен";

/// Service over the lot case repository
#[derive(Clone)]
pub struct KnowledgeStore {
    repository: LotCaseRepository,
}

impl KnowledgeStore {
    pub fn new(repository: LotCaseRepository) -> Self {
        Self { repository }
    }

    /// Build the composite document a case is embedded and stored under.
    pub fn build_document(
        text: &str,
        detected_objects: &[String],
        risk_level: RiskLevel,
        verdict: &str,
    ) -> String {
        format!(
            "Описание: {}. Объекты: {}. Уровень риска: {}. Вердикт: {}",
            text,
            detected_objects.join(", "),
            risk_level,
            verdict
        )
    }

    /// Record an analyzed lot.
    ///
    /// A collision on `lot_id` is swallowed and the original row kept.
    /// This matches the historical behavior; it can mask duplicate writes,
    /// so it is regression-guarded by tests rather than "fixed".
    pub async fn record(
        &self,
        lot_id: &str,
        text: &str,
        detected_objects: &[String],
        risk_level: RiskLevel,
        verdict: &str,
        embedding: &[f32],
    ) -> Result<(), DbError> {
        let document = Self::build_document(text, detected_objects, risk_level, verdict);

        self.repository
            .insert_ignore(NewLotCase {
                id: lot_id.to_string(),
                document,
                embedding: encode_embedding(embedding),
                risk_level: risk_level.as_str().to_string(),
                raw_text: text.to_string(),
                objects: detected_objects.join(", "),
            })
            .await?;

        Ok(())
    }

    /// Retrieve the `top_k` nearest stored cases by cosine similarity.
    ///
    /// Ordering between equal-similarity cases is not guaranteed.
    pub async fn query_similar(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SimilarCase>, DbError> {
        let rows = self.repository.load_all().await?;

        let mut scored: Vec<(f32, SimilarCase)> = Vec::with_capacity(rows.len());
        for row in rows {
            let embedding = decode_embedding(&row.embedding)
                .map_err(DbError::Serialization)?;
            let score = cosine_similarity(query_embedding, &embedding);
            scored.push((score, project_case(row)?));
        }

        scored.sort_unstable_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored.into_iter().map(|(_, case)| case).collect())
    }

    /// Recent stored cases, for the API listing.
    pub async fn list_cases(&self, limit: Option<u32>) -> Result<Vec<LotCaseRow>, DbError> {
        self.repository.list(limit).await
    }

    /// Number of recorded cases; doubles as the readiness probe.
    pub async fn case_count(&self) -> Result<i64, DbError> {
        self.repository.count().await
    }
}

/// Recommendation derived purely from the stored risk level.
pub fn recommendation_for(risk_level: RiskLevel) -> &'static str {
    if risk_level == RiskLevel::Low {
        RECOMMENDATION_SAFE
    } else {
        RECOMMENDATION_SUSPICIOUS
    }
}

fn project_case(row: LotCaseRow) -> Result<SimilarCase, DbError> {
    let risk_level = RiskLevel::from_str(&row.risk_level).map_err(DbError::Serialization)?;
    Ok(SimilarCase {
        description: row.document,
        risk_level,
        recommendation: recommendation_for(risk_level).to_string(),
    })
}
