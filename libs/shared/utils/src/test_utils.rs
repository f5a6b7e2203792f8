use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_database::ResultSet;

pub struct TestConfig {
    pub db_gateway_url: String,
    pub db_api_key: String,
    pub hospital_fee: f64,
    pub vat_rate: f64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            db_gateway_url: "http://localhost:8089".to_string(),
            db_api_key: "test-api-key".to_string(),
            hospital_fee: 250.0,
            vat_rate: 0.0,
        }
    }
}

impl TestConfig {
    pub fn with_gateway(url: &str) -> Self {
        Self {
            db_gateway_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            db_gateway_url: self.db_gateway_url.clone(),
            db_api_key: self.db_api_key.clone(),
            db_timeout_secs: 5,
            id_allocation_attempts: 3,
            hospital_fee: self.hospital_fee,
            vat_rate: self.vat_rate,
            port: 0,
        }
    }
}

/// Builds a [`ResultSet`] the way the gateway client would: header first.
pub fn result_set(columns: &[&str], rows: &[&[&str]]) -> ResultSet {
    ResultSet::from_parts(
        columns.iter().map(|c| c.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect(),
    )
}

pub fn max_id_result(value: &str) -> ResultSet {
    result_set(&["max_id"], &[&[value]])
}

pub const DOCTOR_PROFILE_COLUMNS: &[&str] = &[
    "slmc_reg_no", "user_id", "first_name", "last_name", "gender", "date_of_birth",
    "address", "contact_no", "experience", "speciality", "doctor_fee", "user_name", "email",
];

pub const PATIENT_COLUMNS: &[&str] = &[
    "patient_id", "first_name", "last_name", "nic", "gender", "date_of_birth",
    "address", "contact_no",
];

pub fn doctor_profile_result(user_id: &str, slmc_reg_no: &str) -> ResultSet {
    result_set(
        DOCTOR_PROFILE_COLUMNS,
        &[&[
            slmc_reg_no, user_id, "Nimal", "Perera", "Male", "1975-04-12", "No 5, Temple Road, Kandy",
            "0771234567", "15 years", "Cardiology", "2500.00", "nimalp", "nimal@example.com",
        ]],
    )
}

pub fn patient_result(patients: &[(&str, &str, &str)]) -> ResultSet {
    let rows: Vec<Vec<&str>> = patients
        .iter()
        .map(|(id, first, last)| {
            vec![*id, *first, *last, "851234567V", "Female", "1985-01-30", "Galle", "0712345678"]
        })
        .collect();
    let rows: Vec<&[&str]> = rows.iter().map(Vec::as_slice).collect();
    result_set(PATIENT_COLUMNS, &rows)
}

pub const RECEPTIONIST_PROFILE_COLUMNS: &[&str] = &[
    "user_id", "first_name", "last_name", "nic", "gender", "contact_no", "address", "user_name", "email",
];

pub fn receptionist_profile_result(user_id: &str) -> ResultSet {
    result_set(
        RECEPTIONIST_PROFILE_COLUMNS,
        &[&[
            user_id, "Dilani", "Jayasuriya", "", "Female", "0759876543", "12 Lake Drive, Colombo",
            "dilanij", "dilani@example.com",
        ]],
    )
}

/// JSON bodies served by a mocked SQL gateway.
pub struct MockGatewayResponses;

impl MockGatewayResponses {
    pub fn query_response(result: &ResultSet) -> Value {
        json!({
            "columns": result.header().cloned().unwrap_or_default(),
            "rows": result.records()
        })
    }

    pub fn max_id_response(value: Option<&str>) -> Value {
        match value {
            Some(value) => json!({ "columns": ["max_id"], "rows": [[value]] }),
            None => json!({ "columns": ["max_id"], "rows": [] }),
        }
    }

    pub fn affected_rows(count: u64) -> Value {
        json!({ "affected_rows": count })
    }
}
