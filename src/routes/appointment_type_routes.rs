// src/routes/appointment_type_routes.rs

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::{error::ApiError, models::AppState};

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AppointmentTypeListItem {
    pub appointment_type_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_min: i32,
    pub price_cents: Option<i32>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_appointment_types))
}

/// GET /api/v1/appointment-types
pub async fn list_appointment_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<AppointmentTypeListItem>>, ApiError> {
    let rows: Vec<AppointmentTypeListItem> = sqlx::query_as::<_, AppointmentTypeListItem>(
        r#"
        SELECT appointment_type_id, name, description, duration_min, price_cents
        FROM appointment_type
        WHERE is_active = true
        ORDER BY duration_min ASC, name ASC
        "#,
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(rows))
}
