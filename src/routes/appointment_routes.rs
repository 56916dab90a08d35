// src/routes/appointment_routes.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{
        appointment_status_label, is_valid_email, is_valid_gender, AppState,
        APPOINTMENT_STATUS_CANCELLED, APPOINTMENT_STATUS_SCHEDULED,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", post(create_appointment).get(list_appointments))
        .route("/appointments/{appointment_id}", get(get_appointment))
        .route("/appointments/{appointment_id}/cancel", post(cancel_appointment))
}

/* ============================================================
   Response DTOs
   ============================================================ */

#[derive(Debug, Serialize)]
pub struct ApiOk<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct PatientBrief {
    pub patient_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct DoctorBrief {
    pub doctor_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialties: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AppointmentTypeBrief {
    pub appointment_type_id: Uuid,
    pub name: String,
    pub duration_min: i32,
    pub price_cents: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct AppointmentDetailDto {
    pub appointment_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub status: i16,
    pub status_label: String,
    pub notes: Option<String>,
    pub time_slot_id: Uuid,
    pub patient: PatientBrief,
    pub doctor: DoctorBrief,
    pub appointment_type: AppointmentTypeBrief,
}

/* ============================================================
   POST /appointments (book)
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient: PatientPayload,
    pub appointment: AppointmentPayload,
}

#[derive(Debug, Deserialize)]
pub struct PatientPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: i16,
    pub medical_info: Option<String>,
    pub is_existing: bool,
    pub marketing_consent: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentPayload {
    pub doctor_id: Uuid,
    pub appointment_type_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
}

fn validate_patient(p: &PatientPayload) -> Result<(), ApiError> {
    if p.first_name.trim().is_empty() || p.last_name.trim().is_empty() {
        return Err(ApiError::validation("first_name and last_name are required"));
    }
    if !is_valid_email(&p.email) {
        return Err(ApiError::validation("email is not a valid email address"));
    }
    if p.phone.trim().is_empty() {
        return Err(ApiError::validation("phone is required"));
    }
    if !is_valid_gender(p.gender) {
        return Err(ApiError::validation("gender must be 0, 1 or 2"));
    }
    Ok(())
}

/// The slot grid is keyed by (date, HH:MM); seconds on the requested
/// timestamp are noise from the client-side date handling.
fn slot_key(scheduled_at: DateTime<Utc>) -> (NaiveDate, NaiveTime) {
    let date = scheduled_at.date_naive();
    let time = NaiveTime::from_hms_opt(scheduled_at.hour(), scheduled_at.minute(), 0)
        .unwrap_or_else(|| NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    (date, time)
}

pub async fn create_appointment(
    State(state): State<AppState>,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<ApiOk<AppointmentDetailDto>>), ApiError> {
    validate_patient(&req.patient)?;

    let (slot_date, slot_start) = slot_key(req.appointment.scheduled_at);

    let mut tx = state.db.begin().await.map_err(ApiError::db)?;

    // Upsert patient by email; an existing record keeps its details, the
    // booking form only collects them once.
    let patient_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO patient
            (first_name, last_name, email, phone, birthday, gender,
             medical_info, is_existing, marketing_consent)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
        ON CONFLICT (email)
        DO UPDATE SET updated_at = now()
        RETURNING patient_id
        "#,
    )
    .bind(req.patient.first_name.trim())
    .bind(req.patient.last_name.trim())
    .bind(req.patient.email.trim())
    .bind(req.patient.phone.trim())
    .bind(req.patient.date_of_birth)
    .bind(req.patient.gender)
    .bind(req.patient.medical_info.as_deref())
    .bind(req.patient.is_existing)
    .bind(req.patient.marketing_consent.unwrap_or(false))
    .fetch_one(&mut *tx)
    .await
    .map_err(ApiError::db)?;

    let doctor_ok: Option<Uuid> = sqlx::query_scalar(
        r#"
        SELECT doctor_id
        FROM doctor
        WHERE doctor_id = $1
          AND is_active = true
        "#,
    )
    .bind(req.appointment.doctor_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(ApiError::db)?;
    if doctor_ok.is_none() {
        return Err(ApiError::NotFound(
            "NOT_FOUND",
            "doctor not found or inactive".into(),
        ));
    }

    let type_ok: Option<Uuid> = sqlx::query_scalar(
        r#"
        SELECT appointment_type_id
        FROM appointment_type
        WHERE appointment_type_id = $1
          AND is_active = true
        "#,
    )
    .bind(req.appointment.appointment_type_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(ApiError::db)?;
    if type_ok.is_none() {
        return Err(ApiError::NotFound(
            "NOT_FOUND",
            "appointment type not found or inactive".into(),
        ));
    }

    let time_slot_id: Uuid = sqlx::query_scalar(
        r#"
        SELECT time_slot_id
        FROM time_slot
        WHERE doctor_id = $1
          AND slot_date = $2
          AND start_time = $3
        "#,
    )
    .bind(req.appointment.doctor_id)
    .bind(slot_date)
    .bind(slot_start)
    .fetch_optional(&mut *tx)
    .await
    .map_err(ApiError::db)?
    .ok_or_else(|| {
        ApiError::NotFound(
            "SLOT_NOT_FOUND",
            "no time slot exists for this doctor at the requested time".into(),
        )
    })?;

    // Conditional claim: zero rows means another booking got here first.
    let claimed = sqlx::query(
        r#"
        UPDATE time_slot
        SET is_booked = true
        WHERE time_slot_id = $1
          AND is_booked = false
        "#,
    )
    .bind(time_slot_id)
    .execute(&mut *tx)
    .await
    .map_err(ApiError::db)?;

    if claimed.rows_affected() == 0 {
        return Err(ApiError::Conflict(
            "SLOT_ALREADY_BOOKED",
            "this time slot has already been booked".into(),
        ));
    }

    let appointment_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO appointment
            (patient_id, doctor_id, appointment_type_id, time_slot_id,
             scheduled_at, status, notes)
        VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING appointment_id
        "#,
    )
    .bind(patient_id)
    .bind(req.appointment.doctor_id)
    .bind(req.appointment.appointment_type_id)
    .bind(time_slot_id)
    .bind(req.appointment.scheduled_at)
    .bind(APPOINTMENT_STATUS_SCHEDULED)
    .bind(req.appointment.notes.as_deref())
    .fetch_one(&mut *tx)
    .await
    .map_err(ApiError::db)?;

    tx.commit().await.map_err(ApiError::db)?;

    tracing::info!(%appointment_id, %patient_id, "appointment booked");

    let detail = load_appointment_detail(&state, appointment_id).await?;
    Ok((StatusCode::CREATED, Json(ApiOk { data: detail })))
}

/* ============================================================
   GET /appointments?patient_email=...
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub patient_email: Option<String>,
}

pub async fn list_appointments(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<ApiOk<Vec<AppointmentDetailDto>>>, ApiError> {
    let email = q
        .patient_email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("patient_email is required"))?
        .to_string();

    let rows = sqlx::query(&format!(
        "{DETAIL_SELECT} WHERE p.email = $1 ORDER BY a.scheduled_at DESC"
    ))
    .bind(email)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    let details = rows
        .iter()
        .map(detail_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ApiOk { data: details }))
}

/* ============================================================
   GET /appointments/{id}
   ============================================================ */

pub async fn get_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<ApiOk<AppointmentDetailDto>>, ApiError> {
    let detail = load_appointment_detail(&state, appointment_id).await?;
    Ok(Json(ApiOk { data: detail }))
}

/* ============================================================
   POST /appointments/{id}/cancel
   ============================================================ */

pub async fn cancel_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<ApiOk<AppointmentDetailDto>>, ApiError> {
    let mut tx = state.db.begin().await.map_err(ApiError::db)?;

    let row = sqlx::query(
        r#"
        SELECT status, time_slot_id
        FROM appointment
        WHERE appointment_id = $1
        FOR UPDATE
        "#,
    )
    .bind(appointment_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(ApiError::db)?
    .ok_or_else(|| ApiError::NotFound("NOT_FOUND", "appointment not found".into()))?;

    let status: i16 = row.try_get("status").map_err(internal_row)?;
    let time_slot_id: Uuid = row.try_get("time_slot_id").map_err(internal_row)?;

    // Idempotent: cancelling twice returns the already-cancelled detail.
    if status != APPOINTMENT_STATUS_CANCELLED {
        sqlx::query(
            r#"
            UPDATE appointment
            SET status = $2, updated_at = now()
            WHERE appointment_id = $1
            "#,
        )
        .bind(appointment_id)
        .bind(APPOINTMENT_STATUS_CANCELLED)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::db)?;

        sqlx::query(
            r#"
            UPDATE time_slot
            SET is_booked = false
            WHERE time_slot_id = $1
            "#,
        )
        .bind(time_slot_id)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::db)?;
    }

    tx.commit().await.map_err(ApiError::db)?;

    let detail = load_appointment_detail(&state, appointment_id).await?;
    Ok(Json(ApiOk { data: detail }))
}

/* ============================================================
   Helpers: joined detail loader
   ============================================================ */

const DETAIL_SELECT: &str = r#"
    SELECT
      a.appointment_id,
      a.scheduled_at,
      a.status,
      a.notes,
      a.time_slot_id,

      p.patient_id,
      p.first_name AS p_first,
      p.last_name  AS p_last,
      p.email      AS p_email,

      d.doctor_id,
      d.first_name AS d_first,
      d.last_name  AS d_last,
      d.specialties,

      t.appointment_type_id,
      t.name AS type_name,
      t.duration_min,
      t.price_cents

    FROM appointment a
    JOIN patient p ON p.patient_id = a.patient_id
    JOIN doctor d ON d.doctor_id = a.doctor_id
    JOIN appointment_type t ON t.appointment_type_id = a.appointment_type_id
"#;

async fn load_appointment_detail(
    state: &AppState,
    appointment_id: Uuid,
) -> Result<AppointmentDetailDto, ApiError> {
    let row = sqlx::query(&format!("{DETAIL_SELECT} WHERE a.appointment_id = $1"))
        .bind(appointment_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::db)?
        .ok_or_else(|| ApiError::NotFound("NOT_FOUND", "appointment not found".into()))?;

    detail_from_row(&row)
}

fn detail_from_row(r: &sqlx::postgres::PgRow) -> Result<AppointmentDetailDto, ApiError> {
    let status: i16 = r.try_get("status").map_err(internal_row)?;

    Ok(AppointmentDetailDto {
        appointment_id: r.try_get("appointment_id").map_err(internal_row)?,
        scheduled_at: r.try_get("scheduled_at").map_err(internal_row)?,
        status,
        status_label: appointment_status_label(status),
        notes: r.try_get("notes").map_err(internal_row)?,
        time_slot_id: r.try_get("time_slot_id").map_err(internal_row)?,
        patient: PatientBrief {
            patient_id: r.try_get("patient_id").map_err(internal_row)?,
            first_name: r.try_get("p_first").map_err(internal_row)?,
            last_name: r.try_get("p_last").map_err(internal_row)?,
            email: r.try_get("p_email").map_err(internal_row)?,
        },
        doctor: DoctorBrief {
            doctor_id: r.try_get("doctor_id").map_err(internal_row)?,
            first_name: r.try_get("d_first").map_err(internal_row)?,
            last_name: r.try_get("d_last").map_err(internal_row)?,
            specialties: r.try_get("specialties").map_err(internal_row)?,
        },
        appointment_type: AppointmentTypeBrief {
            appointment_type_id: r.try_get("appointment_type_id").map_err(internal_row)?,
            name: r.try_get("type_name").map_err(internal_row)?,
            duration_min: r.try_get("duration_min").map_err(internal_row)?,
            price_cents: r.try_get("price_cents").map_err(internal_row)?,
        },
    })
}

fn internal_row(e: sqlx::Error) -> ApiError {
    ApiError::Internal(format!("row decode error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_key_truncates_seconds() {
        let ts: DateTime<Utc> = "2026-09-07T09:40:37.512Z".parse().unwrap();
        let (date, time) = slot_key(ts);
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 9, 7).unwrap());
        assert_eq!(time, NaiveTime::from_hms_opt(9, 40, 0).unwrap());
    }

    fn payload() -> PatientPayload {
        PatientPayload {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane.doe@example.com".into(),
            phone: "0207 639 3323".into(),
            date_of_birth: None,
            gender: 0,
            medical_info: None,
            is_existing: false,
            marketing_consent: None,
        }
    }

    #[test]
    fn patient_validation_accepts_complete_payload() {
        assert!(validate_patient(&payload()).is_ok());
    }

    #[test]
    fn patient_validation_rejects_blank_phone() {
        let mut p = payload();
        p.phone = "  ".into();
        assert!(validate_patient(&p).is_err());
    }

    #[test]
    fn patient_validation_rejects_bad_email() {
        let mut p = payload();
        p.email = "jane.doe.example.com".into();
        assert!(validate_patient(&p).is_err());
    }
}
