//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    /// `ok`, `unavailable`, or `in-memory` when no database is configured.
    pub storage: &'static str,
}

/// Health check endpoint - returns server status.
///
/// GET /health/
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let storage = storage_status(&state).await;
    let response = HealthResponse {
        status: if storage == "unavailable" { "degraded" } else { "ok" },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        storage,
    };

    HttpResponse::Ok().json(response)
}

#[cfg(feature = "postgres")]
async fn storage_status(state: &AppState) -> &'static str {
    match &state.db {
        Some(db) => match db.ping().await {
            Ok(()) => "ok",
            Err(e) => {
                tracing::warn!(error = %e, "Database ping failed");
                "unavailable"
            }
        },
        None => "in-memory",
    }
}

#[cfg(not(feature = "postgres"))]
async fn storage_status(_state: &AppState) -> &'static str {
    "in-memory"
}

#[cfg(test)]
mod tests {
    use actix_web::test;
    use serde_json::Value;

    use crate::handlers::testing::{TestApp, service};

    #[actix_web::test]
    async fn test_health_on_memory_store() {
        let app = service!(TestApp::new().await);
        let req = test::TestRequest::get().uri("/health/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.headers().contains_key("x-request-id"));

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "in-memory");
    }
}
