//! Sequential textual identifiers.
//!
//! Every family renders its identifiers as `prefix + zero-padded numeral +
//! suffix` (`hms0001tb`, `his0002`, `t0011`, `pres00043`). The next identifier
//! is derived from the greatest one currently stored; anything that cannot be
//! derived degrades to the family's default.

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdFamily {
    pub name: &'static str,
    pub prefix: &'static str,
    pub suffix: &'static str,
    pub numeric_width: usize,
    pub min_valid_length: usize,
    pub default_next_id: &'static str,
    /// Table holding the identifiers, used for the max-ID lookup.
    pub table: &'static str,
    pub column: &'static str,
}

pub const TEMP_BILL: IdFamily = IdFamily {
    name: "temp-bill",
    prefix: "hms",
    suffix: "tb",
    numeric_width: 4,
    min_valid_length: 4,
    default_next_id: "hms0001tb",
    table: "tmp_bill",
    column: "tmp_bill_id",
};

pub const MEDICAL_HISTORY: IdFamily = IdFamily {
    name: "medical-history",
    prefix: "his",
    suffix: "",
    numeric_width: 4,
    min_valid_length: 4,
    default_next_id: "his0001",
    table: "medical_history",
    column: "history_id",
};

pub const TIME_SLOT: IdFamily = IdFamily {
    name: "time-slot",
    prefix: "t",
    suffix: "",
    numeric_width: 4,
    min_valid_length: 2,
    default_next_id: "t0001",
    table: "doctor_availability",
    column: "time_slot_id",
};

pub const PRESCRIPTION: IdFamily = IdFamily {
    name: "prescription",
    prefix: "pres",
    suffix: "",
    numeric_width: 5,
    min_valid_length: 5,
    default_next_id: "pres00001",
    table: "prescription",
    column: "prescription_id",
};

pub const ALL_FAMILIES: [IdFamily; 4] = [TEMP_BILL, MEDICAL_HISTORY, TIME_SLOT, PRESCRIPTION];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("identifier '{id}' is shorter than {min} characters")]
    TooShort { id: String, min: usize },

    #[error("identifier '{id}' is not of the form {prefix}<digits>{suffix}")]
    Affix {
        id: String,
        prefix: &'static str,
        suffix: &'static str,
    },

    #[error("identifier '{id}' has a non-numeric sequence '{digits}'")]
    NotNumeric { id: String, digits: String },

    #[error("identifier '{id}' cannot be incremented")]
    Exhausted { id: String },
}

impl IdFamily {
    /// Anchored `REGEXP` matching well-formed identifiers of this family.
    pub fn shape_pattern(&self) -> String {
        format!("^{}[0-9]+{}$", self.prefix, self.suffix)
    }

    /// Extracts the numeric sequence of an identifier of this family.
    pub fn parse_sequence(&self, id: &str) -> Result<u64, IdError> {
        if id.chars().count() < self.min_valid_length {
            return Err(IdError::TooShort {
                id: id.to_string(),
                min: self.min_valid_length,
            });
        }

        let digits = id
            .strip_prefix(self.prefix)
            .and_then(|rest| rest.strip_suffix(self.suffix))
            .ok_or_else(|| IdError::Affix {
                id: id.to_string(),
                prefix: self.prefix,
                suffix: self.suffix,
            })?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdError::NotNumeric {
                id: id.to_string(),
                digits: digits.to_string(),
            });
        }

        digits.parse::<u64>().map_err(|_| IdError::NotNumeric {
            id: id.to_string(),
            digits: digits.to_string(),
        })
    }

    /// Renders a sequence number. Numerals wider than `numeric_width` are kept whole.
    pub fn format(&self, sequence: u64) -> String {
        format!(
            "{}{:0width$}{}",
            self.prefix,
            sequence,
            self.suffix,
            width = self.numeric_width
        )
    }

    /// Next identifier after `current_max`, or the reason it could not be derived.
    ///
    /// An absent or too-short maximum is not an error: it yields the default.
    pub fn try_next_id(&self, current_max: Option<&str>) -> Result<String, IdError> {
        let Some(current) = current_max.filter(|id| id.chars().count() >= self.min_valid_length)
        else {
            return Ok(self.default_next_id.to_string());
        };

        let next = self
            .parse_sequence(current)?
            .checked_add(1)
            .ok_or_else(|| IdError::Exhausted {
                id: current.to_string(),
            })?;

        Ok(self.format(next))
    }

    /// Next identifier after `current_max`, falling back to the default on any failure.
    pub fn next_id(&self, current_max: Option<&str>) -> String {
        self.try_next_id(current_max).unwrap_or_else(|err| {
            warn!(
                family = self.name,
                "{}, using default {}", err, self.default_next_id
            );
            self.default_next_id.to_string()
        })
    }
}
