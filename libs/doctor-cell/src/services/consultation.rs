use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info};

use shared_database::{AppState, SequentialIdAllocator, Statement};
use shared_models::identifier::{MEDICAL_HISTORY, PRESCRIPTION};

use crate::models::{DiagnoseRequest, DoctorContext, DoctorError, PrescribeRequest};

/// Writes diagnoses and prescriptions under freshly allocated identifiers.
pub struct ConsultationService {
    allocator: Arc<SequentialIdAllocator>,
}

impl ConsultationService {
    pub fn new(state: &AppState) -> Self {
        Self {
            allocator: state.allocator.clone(),
        }
    }

    /// Record a diagnosis in the patient's medical history
    pub async fn diagnose(&self, ctx: &DoctorContext, request: DiagnoseRequest) -> Result<String> {
        debug!("Doctor {} diagnosing patient {}", ctx.slmc_reg_no, request.patient_id);

        let patient_id = required("patient_id", &request.patient_id)?;
        let diagnosis = required("diagnosis", &request.diagnosis)?;
        let visit_date = Utc::now().date_naive().to_string();

        let history_id = self
            .allocator
            .insert_with_next_id(&MEDICAL_HISTORY, |history_id| {
                Statement::new(
                    "INSERT INTO medical_history (history_id, patient_id, slmc_reg_no, visit_date, history) \
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(history_id)
                .bind(patient_id)
                .bind(ctx.slmc_reg_no.as_str())
                .bind(visit_date.as_str())
                .bind(diagnosis)
            })
            .await?;

        info!("Medical history {} recorded for patient {}", history_id, patient_id);
        Ok(history_id)
    }

    /// Issue a prescription
    pub async fn prescribe(&self, ctx: &DoctorContext, request: PrescribeRequest) -> Result<String> {
        debug!("Doctor {} prescribing for patient {}", ctx.slmc_reg_no, request.patient_id);

        let patient_id = required("patient_id", &request.patient_id)?;
        let drugs_dose = request.drugs_dose.trim();
        let tests = request
            .tests
            .as_deref()
            .map(str::trim)
            .filter(|tests| !tests.is_empty());

        if drugs_dose.is_empty() && tests.is_none() {
            return Err(DoctorError::Validation(
                "A prescription needs drugs or tests".to_string(),
            )
            .into());
        }

        let prescribed_date = Utc::now().date_naive().to_string();

        let prescription_id = self
            .allocator
            .insert_with_next_id(&PRESCRIPTION, |prescription_id| {
                Statement::new(
                    "INSERT INTO prescription (prescription_id, appointment_id, patient_id, slmc_reg_no, \
                     prescribed_date, drugs_dose, tests) VALUES (?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(prescription_id)
                .bind(request.appointment_id)
                .bind(patient_id)
                .bind(ctx.slmc_reg_no.as_str())
                .bind(prescribed_date.as_str())
                .bind(drugs_dose)
                .bind(tests)
            })
            .await?;

        info!("Prescription {} issued for patient {}", prescription_id, patient_id);
        Ok(prescription_id)
    }
}

fn required<'a>(name: &str, value: &'a str) -> Result<&'a str, DoctorError> {
    let value = value.trim();
    if value.is_empty() {
        Err(DoctorError::Validation(format!("{} is required", name)))
    } else {
        Ok(value)
    }
}
