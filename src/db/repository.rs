//! Repository for lot case database operations

use chrono::Utc;
use sqlx::SqlitePool;

use super::models::{LotCaseRow, NewLotCase};
use super::DbError;

const DEFAULT_LIST_LIMIT: u32 = 20;
const MAX_LIST_LIMIT: u32 = 100;

/// Repository for lot case operations
#[derive(Clone)]
pub struct LotCaseRepository {
    pool: SqlitePool,
}

impl LotCaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new case, ignoring the write when the id already exists.
    ///
    /// Returns `true` when a row was inserted, `false` when an existing case
    /// with the same id was kept unchanged.
    pub async fn insert_ignore(&self, case: NewLotCase) -> Result<bool, DbError> {
        let created_at = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO lot_cases (
                id, document, embedding, risk_level, raw_text, objects, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&case.id)
        .bind(&case.document)
        .bind(&case.embedding)
        .bind(&case.risk_level)
        .bind(&case.raw_text)
        .bind(&case.objects)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        let inserted = result.rows_affected() > 0;
        if inserted {
            tracing::debug!(id = %case.id, "Recorded lot case");
        } else {
            tracing::debug!(id = %case.id, "Lot case already recorded, keeping original");
        }

        Ok(inserted)
    }

    /// Get a case by lot id
    pub async fn get_by_id(&self, id: &str) -> Result<LotCaseRow, DbError> {
        let row: LotCaseRow = sqlx::query_as("SELECT * FROM lot_cases WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(id.to_string()))?;

        Ok(row)
    }

    /// Load every stored case with its embedding, for similarity search.
    pub async fn load_all(&self) -> Result<Vec<LotCaseRow>, DbError> {
        let rows: Vec<LotCaseRow> = sqlx::query_as("SELECT * FROM lot_cases")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// List recent cases for the API, newest first.
    pub async fn list(&self, limit: Option<u32>) -> Result<Vec<LotCaseRow>, DbError> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);

        let rows: Vec<LotCaseRow> =
            sqlx::query_as("SELECT * FROM lot_cases ORDER BY created_at DESC LIMIT ?1")
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    /// Number of stored cases
    pub async fn count(&self) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lot_cases")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::encode_embedding;
    use crate::db::test_pool;

    fn case(id: &str, document: &str) -> NewLotCase {
        NewLotCase {
            id: id.to_string(),
            document: document.to_string(),
            embedding: encode_embedding(&[1.0, 0.0]),
            risk_level: "низкий".to_string(),
            raw_text: "текст".to_string(),
            objects: "chair".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_get_round_trip() {
        let repo = LotCaseRepository::new(test_pool().await);

        assert!(repo.insert_ignore(case("lot-1", "первый лот")).await.unwrap());

        let row = repo.get_by_id("lot-1").await.unwrap();
        assert_eq!(row.document, "первый лот");
        assert_eq!(row.risk_level, "низкий");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_id_is_ignored_not_overwritten() {
        let repo = LotCaseRepository::new(test_pool().await);

        assert!(repo.insert_ignore(case("lot-1", "оригинал")).await.unwrap());
        assert!(!repo.insert_ignore(case("lot-1", "другое содержимое")).await.unwrap());

        let row = repo.get_by_id("lot-1").await.unwrap();
        assert_eq!(row.document, "оригинал");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_id_is_not_found() {
        let repo = LotCaseRepository::new(test_pool().await);
        assert!(matches!(
            repo.get_by_id("nope").await,
            Err(DbError::NotFound(_))
        ));
    }
}
