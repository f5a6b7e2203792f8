use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::request::Parts,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use doctor_cell::handlers::{header_value, NameSearchQuery, USER_ID_HEADER};
use doctor_cell::{AccountService, PatientService, UpdateAccountRequest};
use shared_database::AppState;
use shared_models::error::AppError;

use crate::models::{BillRequest, MakeAppointmentRequest, ReceptionistContext, ReceptionistError};
use crate::services::{BillingService, DirectoryService, FrontDeskService, ProfileService};

impl<S> FromRequestParts<S> for ReceptionistContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ReceptionistContext {
            user_id: header_value(parts, USER_ID_HEADER)?,
        })
    }
}

/// Receptionist failures first, then whatever the doctor cell or database raised.
pub fn to_app_error(err: anyhow::Error) -> AppError {
    match err.downcast_ref::<ReceptionistError>() {
        Some(ReceptionistError::NotFound(msg)) => AppError::NotFound(msg.clone()),
        Some(ReceptionistError::Validation(msg)) => AppError::ValidationError(msg.clone()),
        Some(mismatch @ ReceptionistError::SlotMismatch { .. }) => AppError::BadRequest(mismatch.to_string()),
        None => doctor_cell::handlers::to_app_error(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct AppointmentQuery {
    pub slmc_reg_no: String,
    pub date: Option<NaiveDate>,
}

// ==============================================================================
// PROFILE & ACCOUNT
// ==============================================================================

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    ctx: ReceptionistContext,
) -> Result<Json<Value>, AppError> {
    let profile = ProfileService::new(&state)
        .get_profile(&ctx)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!(profile)))
}

#[axum::debug_handler]
pub async fn update_account(
    State(state): State<AppState>,
    ctx: ReceptionistContext,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<Value>, AppError> {
    let updated = AccountService::new(&state)
        .update_account(&ctx.user_id, request)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({ "updated": updated })))
}

// ==============================================================================
// DOCTORS
// ==============================================================================

#[axum::debug_handler]
pub async fn search_doctors(
    State(state): State<AppState>,
    _ctx: ReceptionistContext,
    Query(query): Query<NameSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let doctors = DirectoryService::new(&state)
        .search_doctors(&query.name)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_time_table(
    State(state): State<AppState>,
    _ctx: ReceptionistContext,
    Path(slmc_reg_no): Path<String>,
) -> Result<Json<Value>, AppError> {
    let slots = DirectoryService::new(&state)
        .get_doctor_time_table(&slmc_reg_no)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "slmc_reg_no": slmc_reg_no,
        "time_slots": slots
    })))
}

// ==============================================================================
// PATIENTS
// ==============================================================================

#[axum::debug_handler]
pub async fn search_patients(
    State(state): State<AppState>,
    _ctx: ReceptionistContext,
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
    _ctx: ReceptionistContext,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let patient = PatientService::new(&state)
        .get_patient(&patient_id)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!(patient)))
}

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

#[axum::debug_handler]
pub async fn make_appointment(
    State(state): State<AppState>,
    _ctx: ReceptionistContext,
    Json(request): Json<MakeAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let confirmation = FrontDeskService::new(&state)
        .make_appointment(request)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!(confirmation)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    _ctx: ReceptionistContext,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let cancelled = FrontDeskService::new(&state)
        .cancel_appointment(appointment_id)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({ "cancelled": cancelled })))
}

#[axum::debug_handler]
pub async fn get_appointments(
    State(state): State<AppState>,
    _ctx: ReceptionistContext,
    Query(query): Query<AppointmentQuery>,
) -> Result<Json<Value>, AppError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let appointments = FrontDeskService::new(&state)
        .get_appointments(&query.slmc_reg_no, date)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "slmc_reg_no": query.slmc_reg_no,
        "date": date,
        "appointments": appointments,
        "total": appointments.len()
    })))
}

// ==============================================================================
// BILLING
// ==============================================================================

#[axum::debug_handler]
pub async fn bill(
    State(state): State<AppState>,
    _ctx: ReceptionistContext,
    Json(request): Json<BillRequest>,
) -> Result<Json<Value>, AppError> {
    let receipt = BillingService::new(&state)
        .bill(request)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!(receipt)))
}

#[axum::debug_handler]
pub async fn get_bills(
    State(state): State<AppState>,
    _ctx: ReceptionistContext,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let bills = BillingService::new(&state)
        .get_bills(&patient_id)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "patient_id": patient_id,
        "bills": bills
    })))
}
