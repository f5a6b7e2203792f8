use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use mockall::Sequence;

use doctor_cell::handlers::*;
use doctor_cell::models::*;
use shared_database::{AppState, DatabaseError, MockDatabaseClient};
use shared_models::error::AppError;
use shared_utils::test_utils::{max_id_result, result_set, TestConfig};

fn create_test_state(db: MockDatabaseClient) -> State<AppState> {
    State(AppState::with_client(TestConfig::default().to_app_config(), Arc::new(db)))
}

fn doctor() -> DoctorContext {
    DoctorContext::new("u001", "22387")
}

#[test]
fn test_error_mapping() {
    assert!(matches!(
        to_app_error(DoctorError::NotFound("x".into()).into()),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        to_app_error(DoctorError::Validation("x".into()).into()),
        AppError::ValidationError(_)
    ));
    assert!(matches!(
        to_app_error(DoctorError::SlotInUse("t0001".into()).into()),
        AppError::Conflict(_)
    ));
    assert!(matches!(
        to_app_error(DatabaseError::DuplicateKey("his0002".into()).into()),
        AppError::Conflict(_)
    ));
    assert!(matches!(
        to_app_error(DatabaseError::Connection("refused".into()).into()),
        AppError::Database(_)
    ));
    assert!(matches!(to_app_error(anyhow::anyhow!("boom")), AppError::Internal(_)));
}

#[tokio::test]
async fn test_add_time_slot_handler_returns_new_id() {
    let mut db = MockDatabaseClient::new();
    let mut seq = Sequence::new();
    db.expect_query()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(result_set(&["time_slot_id"], &[])));
    db.expect_query()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(max_id_result("t0009")));
    db.expect_execute()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(true));

    let request = AddTimeSlotRequest {
        day: "Saturday".to_string(),
        time_slot: "09:00-12:00".to_string(),
    };

    let Json(body) = add_time_slot(create_test_state(db), doctor(), Json(request))
        .await
        .unwrap();

    assert_eq!(body["time_slot_id"], "t0010");
}

#[tokio::test]
async fn test_diagnose_handler_conflict_after_retries() {
    let mut db = MockDatabaseClient::new();
    db.expect_query()
        .times(3)
        .returning(|_| Ok(max_id_result("his0001")));
    db.expect_execute()
        .times(3)
        .returning(|_| Err(DatabaseError::DuplicateKey("his0002".into())));

    let request = DiagnoseRequest {
        patient_id: "hms0001pa".to_string(),
        diagnosis: "Hypertension".to_string(),
    };

    let result = diagnose(create_test_state(db), doctor(), Json(request)).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_get_appointments_handler_passes_date() {
    let mut db = MockDatabaseClient::new();
    db.expect_query()
        .withf(|s| s.params()[1] == "2024-05-06")
        .returning(|_| {
            Ok(result_set(
                &[
                    "appointment_id", "appointment_no", "patient_id", "first_name", "last_name",
                    "time_slot_id", "time_slot", "appointment_date", "cancelled",
                ],
                &[&["31", "1", "hms0001pa", "Kamala", "Silva", "t0001", "08:00-10:00", "2024-05-06", "0"]],
            ))
        });

    let query = DateQuery {
        date: NaiveDate::from_ymd_opt(2024, 5, 6),
    };

    let Json(body) = get_appointments(create_test_state(db), doctor(), Query(query))
        .await
        .unwrap();

    assert_eq!(body["total"], 1);
    assert_eq!(body["appointments"][0]["patient_id"], "hms0001pa");
}

#[tokio::test]
async fn test_get_medical_history_handler() {
    let mut db = MockDatabaseClient::new();
    db.expect_query().returning(|_| {
        Ok(result_set(
            &["history_id", "patient_id", "slmc_reg_no", "visit_date", "history"],
            &[&["his0001", "hms0001pa", "22387", "2024-01-15", "Migraine"]],
        ))
    });

    let Json(body) = get_medical_history(create_test_state(db), Path("hms0001pa".to_string()))
        .await
        .unwrap();

    assert_eq!(body["patient_id"], "hms0001pa");
    assert_eq!(body["history"][0]["history_id"], "his0001");
    assert_eq!(body["history"][0]["visit_date"], "2024-01-15");
}

#[tokio::test]
async fn test_update_profile_handler_validation() {
    let request = UpdateProfileRequest {
        field: DoctorProfileField::DoctorFee,
        value: "lots".to_string(),
    };

    let result = update_profile(
        create_test_state(MockDatabaseClient::new()),
        doctor(),
        Json(request),
    )
    .await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}
