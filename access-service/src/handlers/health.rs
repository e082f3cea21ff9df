use axum::{extract::State, Json};
use serde_json::Value;

use crate::AppState;
use service_core::error::AppError;

/// Service health check
pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.backend.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Backend health check failed");
        AppError::ServiceUnavailable(e.to_string())
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
        "checks": {
            "backend": "up"
        }
    })))
}
