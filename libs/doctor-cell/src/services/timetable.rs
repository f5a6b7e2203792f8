use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info};

use shared_database::{AppState, DatabaseClient, SequentialIdAllocator, Statement};
use shared_models::identifier::TIME_SLOT;

use crate::models::{AddTimeSlotRequest, DoctorContext, DoctorError, SlotWindow, TimeSlot};

const TIME_TABLE_QUERY: &str = "SELECT time_slot_id, slmc_reg_no, day, time_slot, current_week_appointments \
     FROM doctor_availability WHERE slmc_reg_no = ? \
     ORDER BY FIELD(day, 'Monday', 'Tuesday', 'Wednesday', 'Thursday', 'Friday', 'Saturday', 'Sunday'), time_slot";

pub struct TimetableService {
    db: Arc<dyn DatabaseClient>,
    allocator: Arc<SequentialIdAllocator>,
}

impl TimetableService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            allocator: state.allocator.clone(),
        }
    }

    /// Weekly time table of any doctor
    pub async fn time_table_for(&self, slmc_reg_no: &str) -> Result<Vec<TimeSlot>> {
        debug!("Fetching time table for doctor: {}", slmc_reg_no);

        let result = self
            .db
            .query(&Statement::new(TIME_TABLE_QUERY).bind(slmc_reg_no))
            .await?;

        Ok(result.deserialize::<TimeSlot>()?)
    }

    pub async fn get_time_table(&self, ctx: &DoctorContext) -> Result<Vec<TimeSlot>> {
        self.time_table_for(&ctx.slmc_reg_no).await
    }

    /// Add a weekly slot and return its identifier
    pub async fn add_time_slot(&self, ctx: &DoctorContext, request: AddTimeSlotRequest) -> Result<String> {
        debug!("Adding time slot {} {} for doctor {}", request.day, request.time_slot, ctx.slmc_reg_no);

        let window = SlotWindow::parse(&request.day, &request.time_slot)?;
        let day = window.day_name();
        let time_slot = window.time_slot();

        let existing = self
            .db
            .query(
                &Statement::new(
                    "SELECT time_slot_id FROM doctor_availability \
                     WHERE slmc_reg_no = ? AND day = ? AND time_slot = ?",
                )
                .bind(ctx.slmc_reg_no.as_str())
                .bind(day)
                .bind(time_slot.as_str()),
            )
            .await?;

        if !existing.is_empty() {
            return Err(DoctorError::DuplicateSlot {
                day: day.to_string(),
                time_slot,
            }
            .into());
        }

        let time_slot_id = self
            .allocator
            .insert_with_next_id(&TIME_SLOT, |time_slot_id| {
                Statement::new(
                    "INSERT INTO doctor_availability (time_slot_id, slmc_reg_no, day, time_slot, current_week_appointments) \
                     VALUES (?, ?, ?, ?, 0)",
                )
                .bind(time_slot_id)
                .bind(ctx.slmc_reg_no.as_str())
                .bind(day)
                .bind(time_slot.as_str())
            })
            .await?;

        info!("Time slot {} added for doctor {}", time_slot_id, ctx.slmc_reg_no);
        Ok(time_slot_id)
    }

    /// Remove a slot that has no upcoming appointments
    pub async fn delete_time_slot(&self, ctx: &DoctorContext, time_slot_id: &str) -> Result<bool> {
        debug!("Deleting time slot {} for doctor {}", time_slot_id, ctx.slmc_reg_no);

        let today = Utc::now().date_naive().to_string();
        let active = self
            .db
            .query(
                &Statement::new(
                    "SELECT COUNT(*) AS active FROM appointment \
                     WHERE time_slot_id = ? AND cancelled = 0 AND appointment_date >= ?",
                )
                .bind(time_slot_id)
                .bind(today.as_str()),
            )
            .await?;

        let active_count = active
            .first_value()
            .and_then(|count| count.parse::<u64>().ok())
            .unwrap_or(0);

        if active_count > 0 {
            return Err(DoctorError::SlotInUse(time_slot_id.to_string()).into());
        }

        let deleted = self
            .db
            .execute(
                &Statement::new("DELETE FROM doctor_availability WHERE time_slot_id = ? AND slmc_reg_no = ?")
                    .bind(time_slot_id)
                    .bind(ctx.slmc_reg_no.as_str()),
            )
            .await?;

        if !deleted {
            return Err(DoctorError::NotFound(format!("Time slot {} not found", time_slot_id)).into());
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;
    use shared_database::{MockDatabaseClient, ResultSet};
    use shared_utils::test_utils::{max_id_result, result_set, TestConfig};

    fn service(db: MockDatabaseClient) -> TimetableService {
        TimetableService::new(&AppState::with_client(TestConfig::default().to_app_config(), Arc::new(db)))
    }

    fn ctx() -> DoctorContext {
        DoctorContext::new("u001", "22387")
    }

    fn no_existing_slot() -> ResultSet {
        result_set(&["time_slot_id"], &[])
    }

    #[tokio::test]
    async fn time_table_rows_are_typed() {
        let mut db = MockDatabaseClient::new();
        db.expect_query()
            .withf(|s| s.sql().contains("FROM doctor_availability") && s.params()[0] == "22387")
            .returning(|_| {
                Ok(result_set(
                    &["time_slot_id", "slmc_reg_no", "day", "time_slot", "current_week_appointments"],
                    &[
                        &["t0001", "22387", "Monday", "08:00-10:00", "4"],
                        &["t0003", "22387", "Friday", "16:00-18:00", ""],
                    ],
                ))
            });

        let slots = service(db).get_time_table(&ctx()).await.unwrap();

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].current_week_appointments, Some(4));
        assert_eq!(slots[1].current_week_appointments, None);
    }

    #[tokio::test]
    async fn add_time_slot_allocates_next_id() {
        let mut db = MockDatabaseClient::new();
        let mut seq = Sequence::new();
        db.expect_query()
            .withf(|s| s.sql().contains("AND day = ?") && s.params()[1] == "Wednesday" && s.params()[2] == "09:00-11:00")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(no_existing_slot()));
        db.expect_query()
            .withf(|s| s.sql().contains("AS max_id FROM doctor_availability"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(max_id_result("t0011")));
        db.expect_execute()
            .withf(|s| s.params()[0] == "t0012" && s.params()[1] == "22387")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));

        let request = AddTimeSlotRequest {
            day: "wed".to_string(),
            time_slot: "9:00-11:00".to_string(),
        };

        assert_eq!(service(db).add_time_slot(&ctx(), request).await.unwrap(), "t0012");
    }

    #[tokio::test]
    async fn add_time_slot_with_bare_prefix_max_uses_default() {
        let mut db = MockDatabaseClient::new();
        let mut seq = Sequence::new();
        db.expect_query()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(no_existing_slot()));
        db.expect_query()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(max_id_result("t")));
        db.expect_execute()
            .withf(|s| s.params()[0] == "t0001")
            .returning(|_| Ok(true));

        let request = AddTimeSlotRequest {
            day: "Sunday".to_string(),
            time_slot: "10:00-12:00".to_string(),
        };

        assert_eq!(service(db).add_time_slot(&ctx(), request).await.unwrap(), "t0001");
    }

    #[tokio::test]
    async fn duplicate_slot_is_rejected() {
        let mut db = MockDatabaseClient::new();
        db.expect_query()
            .times(1)
            .returning(|_| Ok(result_set(&["time_slot_id"], &[&["t0004"]])));

        let request = AddTimeSlotRequest {
            day: "Monday".to_string(),
            time_slot: "08:00-10:00".to_string(),
        };
        let err = service(db).add_time_slot(&ctx(), request).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<DoctorError>(),
            Some(&DoctorError::DuplicateSlot {
                day: "Monday".to_string(),
                time_slot: "08:00-10:00".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn invalid_slot_never_reaches_the_database() {
        let request = AddTimeSlotRequest {
            day: "Monday".to_string(),
            time_slot: "evening".to_string(),
        };
        let err = service(MockDatabaseClient::new())
            .add_time_slot(&ctx(), request)
            .await
            .unwrap_err();

        assert!(matches!(err.downcast_ref::<DoctorError>(), Some(DoctorError::Validation(_))));
    }

    #[tokio::test]
    async fn delete_refuses_slot_with_active_appointments() {
        let mut db = MockDatabaseClient::new();
        db.expect_query()
            .withf(|s| s.sql().contains("COUNT(*)") && s.params()[0] == "t0002")
            .returning(|_| Ok(result_set(&["active"], &[&["2"]])));

        let err = service(db).delete_time_slot(&ctx(), "t0002").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<DoctorError>(),
            Some(&DoctorError::SlotInUse("t0002".to_string()))
        );
    }

    #[tokio::test]
    async fn delete_free_slot() {
        let mut db = MockDatabaseClient::new();
        db.expect_query()
            .returning(|_| Ok(result_set(&["active"], &[&["0"]])));
        db.expect_execute()
            .withf(|s| s.sql().starts_with("DELETE FROM doctor_availability") && s.params()[1] == "22387")
            .times(1)
            .returning(|_| Ok(true));

        assert!(service(db).delete_time_slot(&ctx(), "t0002").await.unwrap());
    }

    #[tokio::test]
    async fn delete_unknown_slot_is_not_found() {
        let mut db = MockDatabaseClient::new();
        db.expect_query()
            .returning(|_| Ok(result_set(&["active"], &[&["0"]])));
        db.expect_execute().returning(|_| Ok(false));

        let err = service(db).delete_time_slot(&ctx(), "t0099").await.unwrap_err();
        assert!(matches!(err.downcast_ref::<DoctorError>(), Some(DoctorError::NotFound(_))));
    }
}
