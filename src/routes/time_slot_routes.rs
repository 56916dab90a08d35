// src/routes/time_slot_routes.rs

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, models::AppState};

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct TimeSlotRow {
    pub time_slot_id: Uuid,
    pub slot_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_booked: bool,
}

#[derive(Debug, Deserialize)]
pub struct TimeSlotQuery {
    pub doctor_id: Option<Uuid>,
    // YYYY-MM-DD; omitted = all upcoming inventory for the doctor, the form
    // filters by the selected day client-side.
    pub date: Option<NaiveDate>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/time-slots", get(list_time_slots))
        .route("/debug/time-slots", get(debug_time_slots))
}

fn require_doctor_id(q: Option<Uuid>) -> Result<Uuid, ApiError> {
    q.ok_or_else(|| ApiError::validation("doctor_id is required"))
}

/// GET /api/v1/time-slots?doctor_id=...&date=...
pub async fn list_time_slots(
    State(state): State<AppState>,
    Query(q): Query<TimeSlotQuery>,
) -> Result<Json<Vec<TimeSlotRow>>, ApiError> {
    let doctor_id = require_doctor_id(q.doctor_id)?;

    let rows: Vec<TimeSlotRow> = if let Some(date) = q.date {
        sqlx::query_as::<_, TimeSlotRow>(
            r#"
            SELECT time_slot_id, slot_date, start_time, end_time, is_booked
            FROM time_slot
            WHERE doctor_id = $1
              AND slot_date = $2
            ORDER BY start_time ASC
            "#,
        )
        .bind(doctor_id)
        .bind(date)
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::db)?
    } else {
        sqlx::query_as::<_, TimeSlotRow>(
            r#"
            SELECT time_slot_id, slot_date, start_time, end_time, is_booked
            FROM time_slot
            WHERE doctor_id = $1
            ORDER BY slot_date ASC, start_time ASC
            "#,
        )
        .bind(doctor_id)
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::db)?
    };

    Ok(Json(rows))
}

/* ============================================================
   GET /api/v1/debug/time-slots
   Inventory summary for troubleshooting empty pickers.
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct DebugQuery {
    pub doctor_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct TimeSlotDebugResponse {
    pub doctor_id: Uuid,
    pub total_count: i64,
    pub unique_dates: Vec<NaiveDate>,
    pub sample_time_slots: Vec<TimeSlotRow>,
}

pub async fn debug_time_slots(
    State(state): State<AppState>,
    Query(q): Query<DebugQuery>,
) -> Result<Json<TimeSlotDebugResponse>, ApiError> {
    let doctor_id = require_doctor_id(q.doctor_id)?;

    let total_count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM time_slot
        WHERE doctor_id = $1
        "#,
    )
    .bind(doctor_id)
    .fetch_one(&state.db)
    .await
    .map_err(ApiError::db)?;

    let unique_dates: Vec<NaiveDate> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT slot_date
        FROM time_slot
        WHERE doctor_id = $1
        ORDER BY slot_date ASC
        "#,
    )
    .bind(doctor_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    let sample_time_slots: Vec<TimeSlotRow> = sqlx::query_as::<_, TimeSlotRow>(
        r#"
        SELECT time_slot_id, slot_date, start_time, end_time, is_booked
        FROM time_slot
        WHERE doctor_id = $1
        ORDER BY slot_date ASC, start_time ASC
        LIMIT 20
        "#,
    )
    .bind(doctor_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(TimeSlotDebugResponse {
        doctor_id,
        total_count,
        unique_dates,
        sample_time_slots,
    }))
}
