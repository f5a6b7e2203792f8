use axum::{
    Router,
    routing::{get, post, put, delete},
};

use shared_database::AppState;

use crate::handlers;

pub fn doctor_routes(state: AppState) -> Router {
    Router::new()
        // Profile and account
        .route("/profile", get(handlers::get_profile))
        .route("/profile", put(handlers::update_profile))
        .route("/account", put(handlers::update_account))

        // Patients
        .route("/patients/search", get(handlers::search_patients))
        .route("/patients/{patient_id}", get(handlers::get_patient))
        .route("/patients/{patient_id}/history", get(handlers::get_medical_history))

        // Consultation
        .route("/diagnoses", post(handlers::diagnose))
        .route("/prescriptions", post(handlers::prescribe))

        // Time table and allocated patients
        .route("/timetable", get(handlers::get_time_table))
        .route("/timetable", post(handlers::add_time_slot))
        .route("/timetable/{time_slot_id}", delete(handlers::delete_time_slot))
        .route("/appointments", get(handlers::get_appointments))

        // Lab reports
        .route("/lab-reports/{report_id}", get(handlers::get_lab_report))
        .route("/lab-reports/{report_id}/text", get(handlers::render_lab_report))

        .with_state(state)
}
