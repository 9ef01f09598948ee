//! REST API endpoints for lot analysis and stored cases

use actix_web::{get, post, web, HttpResponse};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::model::AnalysisResult;
use crate::service::{KnowledgeStore, LotAnalyzer, ReportService};

/// Request body for lot analysis
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeLotRequest {
    /// Lot identifier; generated when absent.
    pub lot_id: Option<String>,
    /// Free-text product description.
    pub description: String,
    /// Base64-encoded product image (PNG or JPEG).
    pub image_data: String,
}

/// Response body for lot analysis
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeLotResponse {
    pub analysis: AnalysisResult,
    /// Generated prose report; always display-safe, including on
    /// report-backend failure.
    pub report: String,
    /// Buyer-facing advice derived from the risk level.
    pub purchase_advice: String,
}

/// Query parameters for listing stored cases
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCasesParams {
    /// Max number of cases to return (default: 20, max: 100)
    pub limit: Option<u32>,
}

/// Summary of a stored knowledge case
#[derive(Debug, Serialize, ToSchema)]
pub struct CaseSummary {
    pub id: String,
    pub risk_level: String,
    pub document: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CaseListResponse {
    pub cases: Vec<CaseSummary>,
}

/// Analyze a marketplace lot
///
/// Runs the full fraud-scoring pipeline on the submitted (image, description)
/// pair and returns the analysis bundle plus the generated report.
#[utoipa::path(
    post,
    path = "/v1/lots/analyze",
    request_body = AnalyzeLotRequest,
    responses(
        (status = 200, description = "Lot analyzed", body = AnalyzeLotResponse),
        (status = 400, description = "Missing or invalid input"),
        (status = 502, description = "Model backend failure")
    ),
    tag = "lots"
)]
#[post("/v1/lots/analyze")]
pub async fn analyze_lot(
    analyzer: web::Data<LotAnalyzer>,
    report_service: web::Data<ReportService>,
    request: web::Json<AnalyzeLotRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();

    // Input validation before any model call
    if request.description.trim().is_empty() {
        return Err(ApiError::BadRequest("description is empty".to_string()));
    }
    if request.image_data.trim().is_empty() {
        return Err(ApiError::BadRequest("image_data is empty".to_string()));
    }

    let image_bytes = BASE64
        .decode(request.image_data.trim())
        .map_err(|e| ApiError::BadRequest(format!("image_data is not valid base64: {}", e)))?;

    let image = image::load_from_memory(&image_bytes)
        .map_err(|e| ApiError::BadRequest(format!("image_data is not a decodable image: {}", e)))?;

    let lot_id = request
        .lot_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let analysis = analyzer
        .analyze(&image, &request.description, &lot_id)
        .await?;

    // Degrade-gracefully path: the report is always a displayable string.
    let report = report_service
        .generate_report(&analysis, &request.description)
        .await;

    let purchase_advice = analysis.risk_level.purchase_advice().to_string();

    tracing::info!(
        lot_id = %lot_id,
        risk_level = %analysis.risk_level,
        "Lot analysis completed"
    );

    Ok(HttpResponse::Ok().json(AnalyzeLotResponse {
        analysis,
        report,
        purchase_advice,
    }))
}

/// List stored knowledge cases
#[utoipa::path(
    get,
    path = "/v1/cases",
    params(ListCasesParams),
    responses(
        (status = 200, description = "Cases retrieved", body = CaseListResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "cases"
)]
#[get("/v1/cases")]
pub async fn list_cases(
    knowledge: web::Data<KnowledgeStore>,
    query: web::Query<ListCasesParams>,
) -> Result<HttpResponse, ApiError> {
    let rows = knowledge.list_cases(query.limit).await?;

    let cases = rows
        .into_iter()
        .map(|row| CaseSummary {
            id: row.id,
            risk_level: row.risk_level,
            document: row.document,
            created_at: row.created_at,
        })
        .collect();

    Ok(HttpResponse::Ok().json(CaseListResponse { cases }))
}

/// OpenAPI documentation for the service
#[derive(OpenApi)]
#[openapi(
    paths(
        analyze_lot,
        list_cases,
        crate::api::health::liveness,
        crate::api::health::readiness
    ),
    components(schemas(
        AnalyzeLotRequest,
        AnalyzeLotResponse,
        CaseSummary,
        CaseListResponse,
        crate::model::AnalysisResult,
        crate::model::AiDetection,
        crate::model::DetectedObject,
        crate::model::RiskLevel,
        crate::model::SimilarCase,
        crate::api::health::LivenessResponse,
        crate::api::health::ReadinessResponse,
        crate::api::health::KnowledgeStoreHealth
    )),
    tags(
        (name = "lots", description = "Lot fraud analysis"),
        (name = "cases", description = "Stored knowledge cases"),
        (name = "health", description = "Service health probes")
    )
)]
pub struct ApiDoc;

/// Configure lot routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(analyze_lot).service(list_cases);
}
