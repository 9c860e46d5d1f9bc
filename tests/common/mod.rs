//! Shared fixtures for integration tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use medibook::api::{ApiServer, AppState};
use medibook::config::Config;
use medibook::models::{Doctor, TimeSlot};
use medibook::store::DataStore;

/// Configuration suitable for tests: fast hashing, no middleware noise
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.auth.bcrypt_cost = 4;
    config.server.enable_cors = false;
    config.server.enable_request_logging = false;
    config
}

/// A router plus its state, over a fresh empty store
pub fn test_app() -> (Router, AppState) {
    let server =
        ApiServer::new(test_config(), DataStore::new()).expect("test config must be valid");
    (server.build_router(), server.state())
}

/// Insert a doctor with the given slot ids, all on 2025-06-02 at
/// hourly times starting 09:00
pub async fn seed_doctor(state: &AppState, name: &str, slots: &[&str]) -> Doctor {
    let mut doctor = Doctor::new(name, "Cardiology");
    for (i, slot) in slots.iter().enumerate() {
        doctor
            .time_slots
            .push(TimeSlot::new(*slot, "2025-06-02", format!("{:02}:00", 9 + i)));
    }
    state.store.put_doctor(doctor.clone()).await;
    doctor
}

/// Send a request and return (status, parsed JSON body)
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request must build");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router must respond");

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body must collect")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body must be JSON")
    };
    (status, value)
}

/// Register a patient and return their bearer token
pub async fn register_patient(router: &Router, email: &str) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Alex Carter",
            "email": email,
            "password": "hunter22",
            "phone": "555-0100",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["data"]["token"]
        .as_str()
        .expect("register returns a token")
        .to_string()
}

/// The standard booking payload for a seeded doctor and slot
pub fn booking_payload(doctor: &Doctor, slot: &str) -> Value {
    json!({
        "doctorId": doctor.id.to_string(),
        "appointmentDate": "2025-06-02",
        "appointmentTime": "09:00",
        "timeSlotId": slot,
    })
}
