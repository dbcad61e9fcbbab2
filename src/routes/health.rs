use rocket::get;
use rocket::serde::json::Json;
use rocket_okapi::openapi;

use crate::models::HealthResponse;

/// Liveness probe. Not rate limited.
#[openapi(tag = "Health")]
#[get("/health")]
pub fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}
