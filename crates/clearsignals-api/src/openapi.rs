use axum::Json;
use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::routes::{analyze, health, memory};

#[derive(OpenApi)]
#[openapi(
    info(title = "ClearSignals API", description = "Cross-cultural sales email thread analysis"),
    paths(
        analyze::analyze,
        health::health_check,
        memory::similar,
        memory::store_profile,
        memory::get_profile,
        memory::stats
    ),
    components(schemas(
        analyze::AnalyzeRequest,
        analyze::AnalyzeResponse,
        health::HealthResponse,
        health::ServiceStatus,
        memory::SimilarRequest,
        memory::SimilarResponse,
        memory::ProfileRequest,
        memory::ProfileResponse,
        ErrorBody
    )),
    tags(
        (name = "analysis", description = "Email thread scoring"),
        (name = "memory", description = "Deal memory and communication profiles"),
        (name = "system", description = "Process status")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
