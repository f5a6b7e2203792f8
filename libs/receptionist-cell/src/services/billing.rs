use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info};

use shared_database::{AppState, DatabaseClient, SequentialIdAllocator, Statement};
use shared_models::identifier::TEMP_BILL;

use crate::models::{BillReceipt, BillRequest, ReceptionistError, TempBill};

pub struct BillingService {
    db: Arc<dyn DatabaseClient>,
    allocator: Arc<SequentialIdAllocator>,
    hospital_fee: f64,
    vat_rate: f64,
}

impl BillingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            allocator: state.allocator.clone(),
            hospital_fee: state.config.hospital_fee,
            vat_rate: state.config.vat_rate,
        }
    }

    /// Total the charges and store them as a temporary bill
    pub async fn bill(&self, request: BillRequest) -> Result<BillReceipt> {
        debug!("Billing patient {}", request.patient_id);

        let patient_id = request.patient_id.trim();
        if patient_id.is_empty() {
            return Err(ReceptionistError::Validation("patient_id is required".to_string()).into());
        }

        let totals = request.totals(self.hospital_fee, self.vat_rate)?;
        let bill_date = Utc::now().date_naive().to_string();

        let bill_id = self
            .allocator
            .insert_with_next_id(&TEMP_BILL, |bill_id| {
                Statement::new(
                    "INSERT INTO tmp_bill (tmp_bill_id, patient_id, doctor_fee, hospital_fee, pharmacy_fee, \
                     laboratory_fee, appointment_fee, vat, discount, total, bill_date) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(bill_id)
                .bind(patient_id)
                .bind(request.doctor_fee)
                .bind(totals.hospital_fee)
                .bind(request.pharmacy_fee)
                .bind(request.laboratory_fee)
                .bind(request.appointment_fee)
                .bind(totals.vat)
                .bind(request.discount)
                .bind(totals.total)
                .bind(bill_date.as_str())
            })
            .await?;

        info!("Temporary bill {} issued for patient {}: {:.2}", bill_id, patient_id, totals.total);
        Ok(BillReceipt {
            bill_id,
            total: totals.total,
        })
    }

    pub async fn get_bills(&self, patient_id: &str) -> Result<Vec<TempBill>> {
        debug!("Fetching temporary bills of patient: {}", patient_id);

        let statement = Statement::new(
            "SELECT tmp_bill_id, patient_id, doctor_fee, hospital_fee, pharmacy_fee, laboratory_fee, \
             appointment_fee, vat, discount, total, bill_date \
             FROM tmp_bill WHERE patient_id = ? \
             ORDER BY LENGTH(tmp_bill_id), tmp_bill_id",
        )
        .bind(patient_id);

        let result = self.db.query(&statement).await?;
        Ok(result.deserialize::<TempBill>()?)
    }
}
