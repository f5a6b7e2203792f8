use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use shared_database::{AppState, DatabaseClient, Statement};

use crate::models::{DoctorError, LabReport, LabReportHeader, LabReportValue};

pub struct ReportService {
    db: Arc<dyn DatabaseClient>,
}

impl ReportService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    pub async fn get_lab_report(&self, report_id: &str) -> Result<LabReport> {
        debug!("Fetching lab report: {}", report_id);

        let header = self
            .db
            .query(
                &Statement::new(
                    "SELECT r.report_id, r.patient_id, p.first_name, p.last_name, r.test_name, r.report_date \
                     FROM lab_report r JOIN patient p ON p.patient_id = r.patient_id \
                     WHERE r.report_id = ?",
                )
                .bind(report_id),
            )
            .await?
            .deserialize_first::<LabReportHeader>()?
            .ok_or_else(|| DoctorError::NotFound(format!("Lab report {} not found", report_id)))?;

        let values = self
            .db
            .query(
                &Statement::new(
                    "SELECT parameter, value, unit, reference_range FROM lab_report_value \
                     WHERE report_id = ? ORDER BY line_no",
                )
                .bind(report_id),
            )
            .await?
            .deserialize::<LabReportValue>()?;

        Ok(LabReport { header, values })
    }

    pub async fn render_lab_report(&self, report_id: &str) -> Result<String> {
        let report = self.get_lab_report(report_id).await?;
        Ok(render(&report))
    }
}

/// Plain-text layout of a lab report with aligned result columns.
pub fn render(report: &LabReport) -> String {
    let header = &report.header;
    let mut out = format!(
        "LABORATORY REPORT\n\
         Report  : {}\n\
         Patient : {} {} ({})\n\
         Test    : {}\n\
         Date    : {}\n",
        header.report_id,
        header.first_name,
        header.last_name,
        header.patient_id,
        header.test_name,
        header.report_date
    );
    out.push('\n');

    if report.values.is_empty() {
        out.push_str("No results recorded\n");
        return out;
    }

    let titles = ["Parameter", "Value", "Unit", "Reference"];
    let mut widths = titles.map(str::len);
    for value in &report.values {
        let cells = [&value.parameter, &value.value, &value.unit, &value.reference_range];
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut line = |cells: [&str; 4]| {
        let row = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(row.trim_end());
        out.push('\n');
    };

    line(titles);
    for value in &report.values {
        line([
            value.parameter.as_str(),
            value.value.as_str(),
            value.unit.as_str(),
            value.reference_range.as_str(),
        ]);
    }

    out
}
