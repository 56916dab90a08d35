// src/routes/doctor_routes.rs

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::{error::ApiError, models::AppState};

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DoctorListItem {
    pub doctor_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialties: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_doctors))
}

/// GET /api/v1/doctors
/// Active doctors only; the booking form shows these on the
/// appointment-details step.
pub async fn list_doctors(
    State(state): State<AppState>,
) -> Result<Json<Vec<DoctorListItem>>, ApiError> {
    let rows: Vec<DoctorListItem> = sqlx::query_as::<_, DoctorListItem>(
        r#"
        SELECT doctor_id, first_name, last_name, specialties
        FROM doctor
        WHERE is_active = true
        ORDER BY last_name ASC, first_name ASC
        "#,
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(rows))
}
