//! Liveness and readiness probes

use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;
use utoipa::ToSchema;

use crate::service::KnowledgeStore;

#[derive(Serialize, ToSchema)]
pub struct LivenessResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: String,
    pub version: String,
    pub knowledge_store: KnowledgeStoreHealth,
}

/// Probe result for the case store backing retrieval.
#[derive(Serialize, ToSchema)]
pub struct KnowledgeStoreHealth {
    pub reachable: bool,
    /// Number of recorded cases when reachable.
    pub stored_cases: Option<i64>,
}

/// Liveness probe, 200 whenever the process serves requests.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive", body = LivenessResponse)
    ),
    tag = "health"
)]
#[get("/health/live")]
pub async fn liveness() -> impl Responder {
    HttpResponse::Ok().json(LivenessResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness probe; the service can take traffic only when the knowledge
/// store answers queries.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "Knowledge store unavailable", body = ReadinessResponse)
    ),
    tag = "health"
)]
#[get("/health/ready")]
pub async fn readiness(knowledge: web::Data<KnowledgeStore>) -> impl Responder {
    match knowledge.case_count().await {
        Ok(count) => HttpResponse::Ok().json(ReadinessResponse {
            status: "ready".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            knowledge_store: KnowledgeStoreHealth {
                reachable: true,
                stored_cases: Some(count),
            },
        }),
        Err(e) => {
            tracing::error!(error = %e, "Knowledge store probe failed");
            HttpResponse::ServiceUnavailable().json(ReadinessResponse {
                status: "not_ready".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                knowledge_store: KnowledgeStoreHealth {
                    reachable: false,
                    stored_cases: None,
                },
            })
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(liveness).service(readiness);
}
