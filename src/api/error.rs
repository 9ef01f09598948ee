//! API error type and its JSON wire format

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use uuid::Uuid;

use crate::db::DbError;
use crate::service::AnalysisError;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    message: &'a str,
    /// Correlates the response with server-side logs.
    request_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Model backend error: {0}")]
    ModelBackend(String),
}

impl ApiError {
    /// Status code and machine-readable error code, kept in one place so the
    /// two cannot drift apart.
    fn kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            ApiError::ModelBackend(_) => (StatusCode::BAD_GATEWAY, "model_backend_error"),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.kind().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status, code) = self.kind();
        let request_id = Uuid::new_v4();
        let message = self.to_string();

        tracing::error!(
            error_type = code,
            status = status.as_u16(),
            request_id = %request_id,
            message = %message,
            "Request failed"
        );

        HttpResponse::build(status).json(ErrorBody {
            error: code,
            message: &message,
            request_id,
        })
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::MissingInput(msg) => ApiError::BadRequest(msg),
            AnalysisError::Inference(e) => ApiError::ModelBackend(e.to_string()),
            AnalysisError::Db(e) => ApiError::Database(e.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(id) => ApiError::NotFound(id),
            other => ApiError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_error_classes() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Database("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::ModelBackend("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn missing_input_maps_to_bad_request() {
        let err: ApiError = AnalysisError::MissingInput("lot description is empty".into()).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn db_not_found_maps_to_404() {
        let err: ApiError = DbError::NotFound("lot-1".into()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
