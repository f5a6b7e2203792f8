use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::debug;

use shared_database::{AppState, DatabaseClient, Statement};

use crate::models::{DoctorContext, DoctorError, DoctorProfile, DoctorProfileField, UpdateProfileRequest};

const PROFILE_QUERY: &str = "SELECT d.slmc_reg_no, d.user_id, d.first_name, d.last_name, d.gender, \
     d.date_of_birth, d.address, d.contact_no, d.experience, d.speciality, d.doctor_fee, \
     u.user_name, u.email \
     FROM doctor d JOIN sys_user u ON u.user_id = d.user_id \
     WHERE d.user_id = ?";

pub struct ProfileService {
    db: Arc<dyn DatabaseClient>,
}

impl ProfileService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    /// Get the acting doctor's profile
    pub async fn get_profile(&self, ctx: &DoctorContext) -> Result<DoctorProfile> {
        debug!("Fetching doctor profile for user: {}", ctx.user_id);

        let result = self
            .db
            .query(&Statement::new(PROFILE_QUERY).bind(ctx.user_id.as_str()))
            .await?;

        result
            .deserialize_first::<DoctorProfile>()?
            .ok_or_else(|| DoctorError::NotFound(format!("Doctor profile for user {} not found", ctx.user_id)).into())
    }

    /// Update a single profile column
    pub async fn update_profile(&self, ctx: &DoctorContext, request: UpdateProfileRequest) -> Result<bool> {
        debug!("Updating {:?} for doctor: {}", request.field, ctx.slmc_reg_no);

        let value = request.value.trim();
        validate_field(request.field, value)?;

        let statement = Statement::new(format!(
            "UPDATE doctor SET {} = ? WHERE slmc_reg_no = ?",
            request.field.column()
        ))
        .bind(value)
        .bind(ctx.slmc_reg_no.as_str());

        if !self.db.execute(&statement).await? {
            return Err(DoctorError::NotFound(format!("Doctor {} not found", ctx.slmc_reg_no)).into());
        }

        Ok(true)
    }
}

fn validate_field(field: DoctorProfileField, value: &str) -> Result<(), DoctorError> {
    if value.is_empty() {
        return Err(DoctorError::Validation(format!("{} cannot be empty", field.column())));
    }

    match field {
        DoctorProfileField::DoctorFee => match value.parse::<f64>() {
            Ok(fee) if fee.is_finite() && fee >= 0.0 => Ok(()),
            _ => Err(DoctorError::Validation(format!("Invalid doctor fee '{}'", value))),
        },
        DoctorProfileField::DateOfBirth => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(|_| ())
            .map_err(|_| DoctorError::Validation(format!("Invalid date of birth '{}'", value))),
        DoctorProfileField::ContactNo => {
            if value.chars().all(|c| c.is_ascii_digit() || c == '+' || c == ' ') {
                Ok(())
            } else {
                Err(DoctorError::Validation(format!("Invalid contact number '{}'", value)))
            }
        }
        _ => Ok(()),
    }
}
