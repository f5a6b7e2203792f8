use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::serde_helpers::{empty_as_none, from_str};

/// The front desk user making the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReceptionistContext {
    pub user_id: String,
}

impl ReceptionistContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceptionistProfile {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub nic: Option<String>,
    pub gender: String,
    pub contact_no: String,
    pub address: String,
    pub user_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorSummary {
    pub slmc_reg_no: String,
    pub first_name: String,
    pub last_name: String,
    pub speciality: String,
    #[serde(deserialize_with = "from_str")]
    pub doctor_fee: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakeAppointmentRequest {
    pub patient_id: String,
    pub slmc_reg_no: String,
    pub time_slot_id: String,
    pub appointment_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppointmentConfirmation {
    pub appointment_no: u32,
}

/// Fees collected at the desk. The hospital fee comes from configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillRequest {
    pub patient_id: String,
    pub doctor_fee: f64,
    #[serde(default)]
    pub pharmacy_fee: f64,
    #[serde(default)]
    pub laboratory_fee: f64,
    #[serde(default)]
    pub appointment_fee: f64,
    #[serde(default)]
    pub discount: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BillTotals {
    pub hospital_fee: f64,
    pub subtotal: f64,
    pub vat: f64,
    pub total: f64,
}

impl BillRequest {
    pub fn totals(&self, hospital_fee: f64, vat_rate: f64) -> Result<BillTotals, ReceptionistError> {
        for (name, configured) in [("hospital fee", hospital_fee), ("VAT rate", vat_rate)] {
            if !configured.is_finite() || configured < 0.0 {
                return Err(ReceptionistError::Validation(format!(
                    "Configured {} {} is not a non-negative amount",
                    name, configured
                )));
            }
        }

        let charges = [
            ("doctor_fee", self.doctor_fee),
            ("pharmacy_fee", self.pharmacy_fee),
            ("laboratory_fee", self.laboratory_fee),
            ("appointment_fee", self.appointment_fee),
            ("discount", self.discount),
        ];
        for (name, amount) in charges {
            if !amount.is_finite() || amount < 0.0 {
                return Err(ReceptionistError::Validation(format!(
                    "{} must be a non-negative amount",
                    name
                )));
            }
        }

        let subtotal = round_currency(
            self.doctor_fee + hospital_fee + self.pharmacy_fee + self.laboratory_fee + self.appointment_fee,
        );
        let vat = round_currency(subtotal * vat_rate);
        let total = round_currency(subtotal + vat - self.discount);

        if total < 0.0 {
            return Err(ReceptionistError::Validation(format!(
                "Discount {:.2} exceeds the bill amount {:.2}",
                self.discount,
                subtotal + vat
            )));
        }

        Ok(BillTotals {
            hospital_fee,
            subtotal,
            vat,
            total,
        })
    }
}

fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillReceipt {
    pub bill_id: String,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TempBill {
    pub tmp_bill_id: String,
    pub patient_id: String,
    #[serde(deserialize_with = "from_str")]
    pub doctor_fee: f64,
    #[serde(deserialize_with = "from_str")]
    pub hospital_fee: f64,
    #[serde(deserialize_with = "from_str")]
    pub pharmacy_fee: f64,
    #[serde(deserialize_with = "from_str")]
    pub laboratory_fee: f64,
    #[serde(deserialize_with = "from_str")]
    pub appointment_fee: f64,
    #[serde(deserialize_with = "from_str")]
    pub vat: f64,
    #[serde(deserialize_with = "from_str")]
    pub discount: f64,
    #[serde(deserialize_with = "from_str")]
    pub total: f64,
    #[serde(deserialize_with = "from_str")]
    pub bill_date: NaiveDate,
}

/// Day name stored in `doctor_availability.day` for a calendar date.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReceptionistError {
    #[error("{0}")]
    NotFound(String),

    #[error("Time slot {time_slot_id} does not belong to doctor {slmc_reg_no}")]
    SlotMismatch {
        time_slot_id: String,
        slmc_reg_no: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}
