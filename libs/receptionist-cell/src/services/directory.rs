use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use doctor_cell::{TimeSlot, TimetableService};
use shared_database::{like_pattern, AppState, DatabaseClient, Statement};

use crate::models::{DoctorSummary, ReceptionistError};

/// Doctor lookups used when booking.
pub struct DirectoryService {
    db: Arc<dyn DatabaseClient>,
    timetable: TimetableService,
}

impl DirectoryService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            timetable: TimetableService::new(state),
        }
    }

    /// Search doctors by first or last name
    pub async fn search_doctors(&self, name: &str) -> Result<Vec<DoctorSummary>> {
        debug!("Searching doctors by name: {}", name);

        if name.trim().is_empty() {
            return Err(ReceptionistError::Validation("Search name cannot be empty".to_string()).into());
        }

        let pattern = like_pattern(name);
        let statement = Statement::new(
            "SELECT slmc_reg_no, first_name, last_name, speciality, doctor_fee FROM doctor \
             WHERE first_name LIKE ? OR last_name LIKE ? ORDER BY first_name, last_name",
        )
        .bind(pattern.as_str())
        .bind(pattern.as_str());

        let result = self.db.query(&statement).await?;
        Ok(result.deserialize::<DoctorSummary>()?)
    }

    pub async fn get_doctor_time_table(&self, slmc_reg_no: &str) -> Result<Vec<TimeSlot>> {
        self.timetable.time_table_for(slmc_reg_no).await
    }
}
