use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::request::Parts,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_database::{AppState, DatabaseError};
use shared_models::error::AppError;

use crate::models::{
    AddTimeSlotRequest, DiagnoseRequest, DoctorContext, DoctorError, PrescribeRequest,
    UpdateAccountRequest, UpdateProfileRequest,
};
use crate::services::{
    AccountService, AppointmentService, ConsultationService, PatientService, ProfileService,
    ReportService, TimetableService,
};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const SLMC_REG_NO_HEADER: &str = "x-slmc-reg-no";

/// Reads a required identity header set by the fronting gateway.
pub fn header_value(parts: &Parts, name: &str) -> Result<String, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::BadRequest(format!("Missing {} header", name)))
}

impl<S> FromRequestParts<S> for DoctorContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(DoctorContext {
            user_id: header_value(parts, USER_ID_HEADER)?,
            slmc_reg_no: header_value(parts, SLMC_REG_NO_HEADER)?,
        })
    }
}

/// Maps service failures onto HTTP errors.
pub fn to_app_error(err: anyhow::Error) -> AppError {
    if let Some(doctor_error) = err.downcast_ref::<DoctorError>() {
        return match doctor_error {
            DoctorError::NotFound(msg) => AppError::NotFound(msg.clone()),
            DoctorError::Validation(msg) => AppError::ValidationError(msg.clone()),
            DoctorError::SlotInUse(_) | DoctorError::DuplicateSlot { .. } => {
                AppError::Conflict(doctor_error.to_string())
            }
        };
    }

    match err.downcast_ref::<DatabaseError>() {
        Some(DatabaseError::DuplicateKey(msg)) => AppError::Conflict(msg.clone()),
        Some(db_error) => AppError::Database(db_error.to_string()),
        None => AppError::Internal(err.to_string()),
    }
}

#[derive(Debug, Deserialize)]
pub struct NameSearchQuery {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

// ==============================================================================
// PROFILE & ACCOUNT
// ==============================================================================

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    ctx: DoctorContext,
) -> Result<Json<Value>, AppError> {
    let profile = ProfileService::new(&state)
        .get_profile(&ctx)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!(profile)))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    ctx: DoctorContext,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    let updated = ProfileService::new(&state)
        .update_profile(&ctx, request)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({ "updated": updated })))
}

#[axum::debug_handler]
pub async fn update_account(
    State(state): State<AppState>,
    ctx: DoctorContext,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<Value>, AppError> {
    let updated = AccountService::new(&state)
        .update_account(&ctx.user_id, request)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({ "updated": updated })))
}

// ==============================================================================
// PATIENTS
// ==============================================================================

#[axum::debug_handler]
pub async fn search_patients(
    State(state): State<AppState>,
    Query(query): Query<NameSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let patients = PatientService::new(&state)
        .search_patients(&query.name)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let patient = PatientService::new(&state)
        .get_patient(&patient_id)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn get_medical_history(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let history = PatientService::new(&state)
        .get_medical_history(&patient_id)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "patient_id": patient_id,
        "history": history
    })))
}

// ==============================================================================
// CONSULTATION
// ==============================================================================

#[axum::debug_handler]
pub async fn diagnose(
    State(state): State<AppState>,
    ctx: DoctorContext,
    Json(request): Json<DiagnoseRequest>,
) -> Result<Json<Value>, AppError> {
    let history_id = ConsultationService::new(&state)
        .diagnose(&ctx, request)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({ "history_id": history_id })))
}

#[axum::debug_handler]
pub async fn prescribe(
    State(state): State<AppState>,
    ctx: DoctorContext,
    Json(request): Json<PrescribeRequest>,
) -> Result<Json<Value>, AppError> {
    let prescription_id = ConsultationService::new(&state)
        .prescribe(&ctx, request)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({ "prescription_id": prescription_id })))
}

// ==============================================================================
// TIME TABLE & APPOINTMENTS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_time_table(
    State(state): State<AppState>,
    ctx: DoctorContext,
) -> Result<Json<Value>, AppError> {
    let slots = TimetableService::new(&state)
        .get_time_table(&ctx)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({ "time_slots": slots })))
}

#[axum::debug_handler]
pub async fn add_time_slot(
    State(state): State<AppState>,
    ctx: DoctorContext,
    Json(request): Json<AddTimeSlotRequest>,
) -> Result<Json<Value>, AppError> {
    let time_slot_id = TimetableService::new(&state)
        .add_time_slot(&ctx, request)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({ "time_slot_id": time_slot_id })))
}

#[axum::debug_handler]
pub async fn delete_time_slot(
    State(state): State<AppState>,
    ctx: DoctorContext,
    Path(time_slot_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let deleted = TimetableService::new(&state)
        .delete_time_slot(&ctx, &time_slot_id)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({ "deleted": deleted })))
}

#[axum::debug_handler]
pub async fn get_appointments(
    State(state): State<AppState>,
    ctx: DoctorContext,
    Query(query): Query<DateQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = AppointmentService::new(&state)
        .get_appointments(&ctx, query.date)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

// ==============================================================================
// LAB REPORTS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_lab_report(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let report = ReportService::new(&state)
        .get_lab_report(&report_id)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!(report)))
}

#[axum::debug_handler]
pub async fn render_lab_report(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
) -> Result<String, AppError> {
    ReportService::new(&state)
        .render_lab_report(&report_id)
        .await
        .map_err(to_app_error)
}
