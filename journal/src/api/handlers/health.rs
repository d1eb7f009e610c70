use axum::extract::State;
use axum::Json;

use crate::api::dto::{ClassifierStatus, HealthResponse, StoreStatus};
use crate::api::state::AppState;

/// `GET /health`
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let classifier = ClassifierStatus {
        status: if state.classifier.is_available() {
            "available".to_string()
        } else {
            "unavailable".to_string()
        },
        backend: state.classifier.backend_name().to_string(),
        model: state.classifier.model().map(str::to_string),
    };

    let store = match state.store.ping().await {
        Ok(()) => StoreStatus {
            status: "ok".to_string(),
            backend: state.store.backend_name().to_string(),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Entry store health check failed");
            StoreStatus {
                status: "error".to_string(),
                backend: state.store.backend_name().to_string(),
            }
        }
    };

    let healthy = state.classifier.is_available() && store.status == "ok";

    Json(HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        classifier,
        store,
    })
}
