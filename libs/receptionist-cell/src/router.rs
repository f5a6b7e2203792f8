use axum::{
    Router,
    routing::{get, post, put},
};

use shared_database::AppState;

use crate::handlers;

pub fn receptionist_routes(state: AppState) -> Router {
    Router::new()
        // Profile and account
        .route("/profile", get(handlers::get_profile))
        .route("/account", put(handlers::update_account))

        // Doctors
        .route("/doctors/search", get(handlers::search_doctors))
        .route("/doctors/{slmc_reg_no}/timetable", get(handlers::get_doctor_time_table))

        // Patients
        .route("/patients/search", get(handlers::search_patients))
        .route("/patients/{patient_id}", get(handlers::get_patient))
        .route("/patients/{patient_id}/bills", get(handlers::get_bills))

        // Appointments
        .route("/appointments", get(handlers::get_appointments))
        .route("/appointments", post(handlers::make_appointment))
        .route("/appointments/{appointment_id}/cancel", put(handlers::cancel_appointment))

        // Billing
        .route("/bills", post(handlers::bill))

        .with_state(state)
}
