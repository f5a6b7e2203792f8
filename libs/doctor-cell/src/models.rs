use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::serde_helpers::{empty_as_none, flag, from_str, from_str_opt};

/// Who is acting. Passed explicitly to every doctor operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoctorContext {
    pub user_id: String,
    pub slmc_reg_no: String,
}

impl DoctorContext {
    pub fn new(user_id: impl Into<String>, slmc_reg_no: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            slmc_reg_no: slmc_reg_no.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorProfile {
    pub slmc_reg_no: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    #[serde(default, deserialize_with = "from_str_opt")]
    pub date_of_birth: Option<NaiveDate>,
    pub address: String,
    pub contact_no: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub experience: Option<String>,
    pub speciality: String,
    #[serde(deserialize_with = "from_str")]
    pub doctor_fee: f64,
    pub user_name: String,
    pub email: String,
}

impl DoctorProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Columns of the `doctor` table a doctor may edit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DoctorProfileField {
    FirstName,
    LastName,
    Gender,
    DateOfBirth,
    Address,
    ContactNo,
    Experience,
    Speciality,
    DoctorFee,
}

impl DoctorProfileField {
    pub fn column(&self) -> &'static str {
        match self {
            DoctorProfileField::FirstName => "first_name",
            DoctorProfileField::LastName => "last_name",
            DoctorProfileField::Gender => "gender",
            DoctorProfileField::DateOfBirth => "date_of_birth",
            DoctorProfileField::Address => "address",
            DoctorProfileField::ContactNo => "contact_no",
            DoctorProfileField::Experience => "experience",
            DoctorProfileField::Speciality => "speciality",
            DoctorProfileField::DoctorFee => "doctor_fee",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub field: DoctorProfileField,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAccountRequest {
    pub user_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub nic: Option<String>,
    pub gender: String,
    #[serde(default, deserialize_with = "from_str_opt")]
    pub date_of_birth: Option<NaiveDate>,
    pub address: String,
    pub contact_no: String,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicalHistoryEntry {
    pub history_id: String,
    pub patient_id: String,
    pub slmc_reg_no: String,
    #[serde(deserialize_with = "from_str")]
    pub visit_date: NaiveDate,
    pub history: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnoseRequest {
    pub patient_id: String,
    pub diagnosis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescribeRequest {
    pub patient_id: String,
    pub appointment_id: Option<i64>,
    pub drugs_dose: String,
    pub tests: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSlot {
    pub time_slot_id: String,
    pub slmc_reg_no: String,
    pub day: String,
    pub time_slot: String,
    #[serde(default, deserialize_with = "from_str_opt")]
    pub current_week_appointments: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTimeSlotRequest {
    pub day: String,
    pub time_slot: String,
}

/// A validated `HH:MM-HH:MM` range on a named weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWindow {
    pub day: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl SlotWindow {
    pub fn parse(day: &str, time_slot: &str) -> Result<Self, DoctorError> {
        let day = day
            .trim()
            .parse::<Weekday>()
            .map_err(|_| DoctorError::Validation(format!("Unknown day '{}'", day)))?;

        let (start, end) = time_slot
            .split_once('-')
            .ok_or_else(|| DoctorError::Validation(format!("Time slot '{}' must look like HH:MM-HH:MM", time_slot)))?;

        let parse_time = |raw: &str| {
            NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| {
                DoctorError::Validation(format!("Invalid time '{}' in slot '{}'", raw.trim(), time_slot))
            })
        };
        let start = parse_time(start)?;
        let end = parse_time(end)?;

        if start >= end {
            return Err(DoctorError::Validation(format!(
                "Time slot '{}' must end after it starts",
                time_slot
            )));
        }

        Ok(Self { day, start, end })
    }

    pub fn day_name(&self) -> &'static str {
        match self.day {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }

    pub fn time_slot(&self) -> String {
        format!("{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentEntry {
    #[serde(deserialize_with = "from_str")]
    pub appointment_id: i64,
    #[serde(deserialize_with = "from_str")]
    pub appointment_no: u32,
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    pub time_slot_id: String,
    pub time_slot: String,
    #[serde(deserialize_with = "from_str")]
    pub appointment_date: NaiveDate,
    #[serde(deserialize_with = "flag")]
    pub cancelled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabReportValue {
    pub parameter: String,
    pub value: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub reference_range: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabReportHeader {
    pub report_id: String,
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    pub test_name: String,
    #[serde(deserialize_with = "from_str")]
    pub report_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabReport {
    #[serde(flatten)]
    pub header: LabReportHeader,
    pub values: Vec<LabReportValue>,
}

// Error types specific to doctor operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DoctorError {
    #[error("{0}")]
    NotFound(String),

    #[error("Time slot {0} still has active appointments")]
    SlotInUse(String),

    #[error("Time slot {day} {time_slot} already exists")]
    DuplicateSlot { day: String, time_slot: String },

    #[error("Validation error: {0}")]
    Validation(String),
}
