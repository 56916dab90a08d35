use axum::{extract::State, routing::get, Json, Router};

use crate::error::ApiError;
use crate::models::AppState;

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub data: HealthData,
}

#[derive(serde::Serialize)]
pub struct HealthData {
    pub status: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/health", get(health))
}

pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    // Liveness includes the database: a server that cannot reach Postgres
    // cannot serve the booking flow.
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::db)?;

    Ok(Json(HealthResponse {
        data: HealthData {
            status: "ok".to_string(),
        },
    }))
}
