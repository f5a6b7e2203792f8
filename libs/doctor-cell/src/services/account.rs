use std::sync::{Arc, LazyLock};

use anyhow::Result;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use shared_database::{AppState, DatabaseClient, Statement};

use crate::models::{DoctorError, UpdateAccountRequest};

/// `sys_user` account updates shared by every staff role.
pub struct AccountService {
    db: Arc<dyn DatabaseClient>,
}

impl AccountService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    pub async fn update_account(&self, user_id: &str, request: UpdateAccountRequest) -> Result<bool> {
        debug!("Updating account for user: {}", user_id);

        // Build update with only provided fields
        let mut assignments: Vec<(&str, Value)> = Vec::new();

        if let Some(user_name) = request.user_name {
            let user_name = user_name.trim().to_string();
            validate_user_name(&user_name)?;
            assignments.push(("user_name", Value::String(user_name)));
        }
        if let Some(email) = request.email {
            let email = email.trim().to_string();
            validate_email(&email)?;
            assignments.push(("email", Value::String(email)));
        }

        if assignments.is_empty() {
            return Err(DoctorError::Validation("Nothing to update".to_string()).into());
        }

        let set_clause = assignments
            .iter()
            .map(|(column, _)| format!("{} = ?", column))
            .collect::<Vec<_>>()
            .join(", ");

        let statement = assignments
            .into_iter()
            .fold(
                Statement::new(format!("UPDATE sys_user SET {} WHERE user_id = ?", set_clause)),
                |statement, (_, value)| statement.bind(value),
            )
            .bind(user_id);

        if !self.db.execute(&statement).await? {
            return Err(DoctorError::NotFound(format!("User {} not found", user_id)).into());
        }

        Ok(true)
    }
}

static USER_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._]{3,32}$").expect("valid user name pattern"));

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$")
        .expect("valid email pattern")
});

const MAX_EMAIL_LENGTH: usize = 254;

fn validate_user_name(user_name: &str) -> Result<(), DoctorError> {
    if USER_NAME_REGEX.is_match(user_name) {
        Ok(())
    } else {
        Err(DoctorError::Validation(format!(
            "User name '{}' must be 3-32 letters, digits, '.' or '_'",
            user_name
        )))
    }
}

fn validate_email(email: &str) -> Result<(), DoctorError> {
    if email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(DoctorError::Validation(format!("Invalid email '{}'", email)))
    }
}
