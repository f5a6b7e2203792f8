use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use tracing::debug;

use shared_database::{AppState, DatabaseClient, Statement};

use crate::models::{AppointmentEntry, DoctorContext};

const APPOINTMENT_QUERY: &str = "SELECT a.appointment_id, a.appointment_no, a.patient_id, p.first_name, p.last_name, \
     a.time_slot_id, s.time_slot, a.appointment_date, a.cancelled \
     FROM appointment a \
     JOIN patient p ON p.patient_id = a.patient_id \
     JOIN doctor_availability s ON s.time_slot_id = a.time_slot_id \
     WHERE a.slmc_reg_no = ? AND a.appointment_date = ? \
     ORDER BY s.time_slot, a.appointment_no";

/// Patients allocated to a doctor on a given day.
pub struct AppointmentService {
    db: Arc<dyn DatabaseClient>,
}

impl AppointmentService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    pub async fn appointments_for(&self, slmc_reg_no: &str, date: NaiveDate) -> Result<Vec<AppointmentEntry>> {
        debug!("Fetching appointments of doctor {} on {}", slmc_reg_no, date);

        let statement = Statement::new(APPOINTMENT_QUERY)
            .bind(slmc_reg_no)
            .bind(date.to_string());

        let result = self.db.query(&statement).await?;
        Ok(result.deserialize::<AppointmentEntry>()?)
    }

    /// Defaults to today
    pub async fn get_appointments(&self, ctx: &DoctorContext, date: Option<NaiveDate>) -> Result<Vec<AppointmentEntry>> {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        self.appointments_for(&ctx.slmc_reg_no, date).await
    }
}
