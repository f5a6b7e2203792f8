use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use tracing::{debug, info};

use doctor_cell::{AppointmentEntry, AppointmentService, PatientService};
use shared_database::{AppState, DatabaseClient, DatabaseError, Statement};

use crate::models::{weekday_name, AppointmentConfirmation, MakeAppointmentRequest, ReceptionistError};

/// Booking and cancelling appointments at the front desk.
pub struct FrontDeskService {
    db: Arc<dyn DatabaseClient>,
    patients: PatientService,
    appointments: AppointmentService,
}

impl FrontDeskService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            patients: PatientService::new(state),
            appointments: AppointmentService::new(state),
        }
    }

    /// Book a patient into a doctor's slot and hand back the queue number
    pub async fn make_appointment(&self, request: MakeAppointmentRequest) -> Result<AppointmentConfirmation> {
        debug!(
            "Booking patient {} with doctor {} in slot {} on {}",
            request.patient_id, request.slmc_reg_no, request.time_slot_id, request.appointment_date
        );

        for (name, value) in [
            ("patient_id", &request.patient_id),
            ("slmc_reg_no", &request.slmc_reg_no),
            ("time_slot_id", &request.time_slot_id),
        ] {
            if value.trim().is_empty() {
                return Err(ReceptionistError::Validation(format!("{} is required", name)).into());
            }
        }

        self.patients.get_patient(&request.patient_id).await?;
        self.check_slot(&request).await?;

        let appointment_no = self
            .booked_count(&request.time_slot_id, request.appointment_date)
            .await?
            + 1;

        let statement = Statement::new(
            "INSERT INTO appointment (appointment_no, patient_id, slmc_reg_no, time_slot_id, appointment_date, cancelled) \
             VALUES (?, ?, ?, ?, ?, 0)",
        )
        .bind(appointment_no)
        .bind(request.patient_id.as_str())
        .bind(request.slmc_reg_no.as_str())
        .bind(request.time_slot_id.as_str())
        .bind(request.appointment_date.to_string());

        if !self.db.execute(&statement).await? {
            return Err(DatabaseError::NotApplied.into());
        }

        info!(
            "Appointment {} booked for patient {} in slot {}",
            appointment_no, request.patient_id, request.time_slot_id
        );
        Ok(AppointmentConfirmation { appointment_no })
    }

    async fn check_slot(&self, request: &MakeAppointmentRequest) -> Result<()> {
        let result = self
            .db
            .query(
                &Statement::new(
                    "SELECT day FROM doctor_availability WHERE time_slot_id = ? AND slmc_reg_no = ?",
                )
                .bind(request.time_slot_id.as_str())
                .bind(request.slmc_reg_no.as_str()),
            )
            .await?;

        let day = result.first_value().ok_or_else(|| ReceptionistError::SlotMismatch {
            time_slot_id: request.time_slot_id.clone(),
            slmc_reg_no: request.slmc_reg_no.clone(),
        })?;

        let booked_day = weekday_name(request.appointment_date);
        if !day.eq_ignore_ascii_case(booked_day) {
            return Err(ReceptionistError::Validation(format!(
                "Time slot {} runs on {}, not {}",
                request.time_slot_id, day, booked_day
            ))
            .into());
        }

        Ok(())
    }

    // Cancelled bookings keep their number.
    async fn booked_count(&self, time_slot_id: &str, date: NaiveDate) -> Result<u32> {
        let result = self
            .db
            .query(
                &Statement::new(
                    "SELECT COUNT(*) AS booked FROM appointment WHERE time_slot_id = ? AND appointment_date = ?",
                )
                .bind(time_slot_id)
                .bind(date.to_string()),
            )
            .await?;

        match result.first_value() {
            None | Some("") => Ok(0),
            Some(count) => count
                .parse()
                .map_err(|_| anyhow!("Unexpected appointment count '{}'", count)),
        }
    }

    pub async fn cancel_appointment(&self, appointment_id: i64) -> Result<bool> {
        debug!("Cancelling appointment: {}", appointment_id);

        let updated = self
            .db
            .execute(
                &Statement::new("UPDATE appointment SET cancelled = 1 WHERE appointment_id = ? AND cancelled = 0")
                    .bind(appointment_id),
            )
            .await?;

        if !updated {
            return Err(ReceptionistError::NotFound(format!(
                "Appointment {} not found or already cancelled",
                appointment_id
            ))
            .into());
        }

        info!("Appointment {} cancelled", appointment_id);
        Ok(true)
    }

    pub async fn get_appointments(&self, slmc_reg_no: &str, date: NaiveDate) -> Result<Vec<AppointmentEntry>> {
        self.appointments.appointments_for(slmc_reg_no, date).await
    }
}
