use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::handlers::{SLMC_REG_NO_HEADER, USER_ID_HEADER};
use doctor_cell::router::doctor_routes;
use shared_database::AppState;
use shared_utils::test_utils::{doctor_profile_result, patient_result, MockGatewayResponses, TestConfig};

fn create_test_app(mock_server: &MockServer) -> Router {
    let config = TestConfig::with_gateway(&mock_server.uri()).to_app_config();
    doctor_routes(AppState::new(config).unwrap())
}

fn doctor_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_ID_HEADER, "u001")
        .header(SLMC_REG_NO_HEADER, "22387");

    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_get_profile() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({ "params": ["u001"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockGatewayResponses::query_response(&doctor_profile_result("u001", "22387")),
        ))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app.oneshot(doctor_request("GET", "/profile", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json_response = json_body(response).await;
    assert_eq!(json_response["slmc_reg_no"], "22387");
    assert_eq!(json_response["doctor_fee"], 2500.0);
}

#[tokio::test]
async fn test_missing_identity_headers_is_bad_request() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server);

    let request = Request::builder()
        .method("GET")
        .uri("/profile")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json_response = json_body(response).await;
    assert_eq!(json_response["error"], "Missing x-user-id header");
}

#[tokio::test]
async fn test_search_patients() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({ "params": ["%Silva%", "%Silva%"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockGatewayResponses::query_response(&patient_result(&[
                ("hms0001pa", "Kamala", "Silva"),
                ("hms0007pa", "Sunil", "Silva"),
            ])),
        ))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app
        .oneshot(doctor_request("GET", "/patients/search?name=Silva", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json_response = json_body(response).await;
    assert_eq!(json_response["total"], 2);
    assert_eq!(json_response["patients"][1]["first_name"], "Sunil");
}

#[tokio::test]
async fn test_unknown_patient_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockGatewayResponses::query_response(&patient_result(&[])),
        ))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app
        .oneshot(doctor_request("GET", "/patients/hms9999pa", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_diagnose_allocates_history_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("AS max_id FROM medical_history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockGatewayResponses::max_id_response(Some("his0010")),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/execute"))
        .and(body_string_contains("INSERT INTO medical_history"))
        .and(body_string_contains("\"his0011\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockGatewayResponses::affected_rows(1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app
        .oneshot(doctor_request(
            "POST",
            "/diagnoses",
            Some(json!({ "patient_id": "hms0001pa", "diagnosis": "Viral fever" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["history_id"], "his0011");
}

#[tokio::test]
async fn test_prescribe_when_max_lookup_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(500).set_body_string("table prescription is locked"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/execute"))
        .and(body_string_contains("\"pres00001\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockGatewayResponses::affected_rows(1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app
        .oneshot(doctor_request(
            "POST",
            "/prescriptions",
            Some(json!({
                "patient_id": "hms0001pa",
                "appointment_id": null,
                "drugs_dose": "Paracetamol 500mg",
                "tests": null
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["prescription_id"], "pres00001");
}

#[tokio::test]
async fn test_add_time_slot_with_empty_table() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("AND day = ?"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "columns": ["time_slot_id"],
            "rows": []
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("AS max_id FROM doctor_availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockGatewayResponses::max_id_response(None),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/execute"))
        .and(body_partial_json(json!({ "params": ["t0001", "22387", "Thursday", "14:00-16:00"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockGatewayResponses::affected_rows(1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app
        .oneshot(doctor_request(
            "POST",
            "/timetable",
            Some(json!({ "day": "thursday", "time_slot": "14:00-16:00" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["time_slot_id"], "t0001");
}

#[tokio::test]
async fn test_delete_busy_time_slot_conflicts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("COUNT(*)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "columns": ["active"],
            "rows": [[3]]
        })))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app
        .oneshot(doctor_request("DELETE", "/timetable/t0002", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_time_slot_is_rejected() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server);

    let response = app
        .oneshot(doctor_request(
            "POST",
            "/timetable",
            Some(json!({ "day": "Someday", "time_slot": "14:00-16:00" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_render_lab_report_as_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("FROM lab_report r"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "columns": ["report_id", "patient_id", "first_name", "last_name", "test_name", "report_date"],
            "rows": [["lr0001", "hms0001pa", "Kamala", "Silva", "Lipid Profile", "2024-03-01"]]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("FROM lab_report_value"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "columns": ["parameter", "value", "unit", "reference_range"],
            "rows": [["Total Cholesterol", "182", "mg/dL", "< 200"]]
        })))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app
        .oneshot(doctor_request("GET", "/lab-reports/lr0001/text", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.starts_with("LABORATORY REPORT\n"));
    assert!(text.contains("Test    : Lipid Profile"));
    assert!(text.contains("Total Cholesterol  182"));
}
