use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use shared_database::{like_pattern, AppState, DatabaseClient, Statement};

use crate::models::{DoctorError, MedicalHistoryEntry, Patient};

const PATIENT_COLUMNS: &str =
    "patient_id, first_name, last_name, nic, gender, date_of_birth, address, contact_no";

/// Patient lookups available to every clinical role.
pub struct PatientService {
    db: Arc<dyn DatabaseClient>,
}

impl PatientService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    /// Search patients by first or last name
    pub async fn search_patients(&self, name: &str) -> Result<Vec<Patient>> {
        debug!("Searching patients by name: {}", name);

        if name.trim().is_empty() {
            return Err(DoctorError::Validation("Search name cannot be empty".to_string()).into());
        }

        let pattern = like_pattern(name);
        let statement = Statement::new(format!(
            "SELECT {} FROM patient WHERE first_name LIKE ? OR last_name LIKE ? \
             ORDER BY first_name, last_name",
            PATIENT_COLUMNS
        ))
        .bind(pattern.as_str())
        .bind(pattern.as_str());

        let result = self.db.query(&statement).await?;
        Ok(result.deserialize::<Patient>()?)
    }

    pub async fn get_patient(&self, patient_id: &str) -> Result<Patient> {
        debug!("Fetching patient: {}", patient_id);

        let statement = Statement::new(format!(
            "SELECT {} FROM patient WHERE patient_id = ?",
            PATIENT_COLUMNS
        ))
        .bind(patient_id);

        self.db
            .query(&statement)
            .await?
            .deserialize_first::<Patient>()?
            .ok_or_else(|| DoctorError::NotFound(format!("Patient {} not found", patient_id)).into())
    }

    /// Medical history of a patient, newest first
    pub async fn get_medical_history(&self, patient_id: &str) -> Result<Vec<MedicalHistoryEntry>> {
        debug!("Fetching medical history for patient: {}", patient_id);

        let statement = Statement::new(
            "SELECT history_id, patient_id, slmc_reg_no, visit_date, history \
             FROM medical_history WHERE patient_id = ? \
             ORDER BY visit_date DESC, history_id DESC",
        )
        .bind(patient_id);

        let result = self.db.query(&statement).await?;
        Ok(result.deserialize::<MedicalHistoryEntry>()?)
    }
}
