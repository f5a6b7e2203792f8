use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::DatabaseError;

pub type Row = Vec<String>;

/// Rows returned by a query. The first row holds the column labels; values
/// start at row 1. A missing or header-only result both read as "no data".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn from_parts(columns: Vec<String>, records: Vec<Row>) -> Self {
        let mut rows = Vec::with_capacity(records.len() + 1);
        rows.push(columns);
        rows.extend(records);
        Self { rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Value rows, header excluded.
    pub fn records(&self) -> &[Row] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn first_value(&self) -> Option<&str> {
        self.records()
            .first()
            .and_then(|record| record.first())
            .map(String::as_str)
    }

    pub fn to_maps(&self) -> Vec<BTreeMap<String, String>> {
        let Some(header) = self.header() else {
            return Vec::new();
        };

        self.records()
            .iter()
            .map(|record| {
                header
                    .iter()
                    .cloned()
                    .zip(record.iter().cloned())
                    .collect()
            })
            .collect()
    }

    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Vec<T>, DatabaseError> {
        self.to_maps()
            .into_iter()
            .map(|record| {
                let object: Map<String, Value> = record
                    .into_iter()
                    .map(|(column, value)| (column, Value::String(value)))
                    .collect();
                serde_json::from_value(Value::Object(object)).map_err(DatabaseError::from)
            })
            .collect()
    }

    pub fn deserialize_first<T: DeserializeOwned>(&self) -> Result<Option<T>, DatabaseError> {
        Ok(self.deserialize::<T>()?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn strings(values: &[&str]) -> Row {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Patient {
        patient_id: String,
        first_name: String,
    }

    #[test]
    fn header_only_is_empty() {
        let result = ResultSet::new(vec![strings(&["max_id"])]);
        assert!(result.is_empty());
        assert_eq!(result.first_value(), None);
        assert!(ResultSet::empty().is_empty());
        assert!(ResultSet::empty().to_maps().is_empty());
    }

    #[test]
    fn first_value_skips_header() {
        let result = ResultSet::from_parts(strings(&["max_id"]), vec![strings(&["his0010"])]);
        assert_eq!(result.first_value(), Some("his0010"));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn maps_and_typed_records() {
        let result = ResultSet::from_parts(
            strings(&["patient_id", "first_name"]),
            vec![strings(&["hms0001pa", "Nimal"]), strings(&["hms0002pa", "Kamala"])],
        );

        let maps = result.to_maps();
        assert_eq!(maps[1]["first_name"], "Kamala");

        let patients: Vec<Patient> = result.deserialize().unwrap();
        assert_eq!(
            patients[0],
            Patient {
                patient_id: "hms0001pa".to_string(),
                first_name: "Nimal".to_string(),
            }
        );
        assert_eq!(result.deserialize_first::<Patient>().unwrap().unwrap().first_name, "Nimal");
    }

    #[test]
    fn missing_column_is_a_decode_error() {
        let result = ResultSet::from_parts(strings(&["patient_id"]), vec![strings(&["hms0001pa"])]);
        let err = result.deserialize::<Patient>().unwrap_err();
        assert!(matches!(err, DatabaseError::Decode(_)));
    }
}
