//! REST API routes and handlers
//!
//! Route table (see the repo README for the full contract):
//! appointments under `/api/appointments`, doctor directory under
//! `/api/doctors`, auth under `/api/auth`, plus `/api/health`, `/metrics`
//! and a welcome root.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;

use super::extract::AuthUser;
use super::response::{ApiError, ApiResponse};
use super::server::AppState;
use crate::auth::{LoginRequest, RegisterRequest};
use crate::booking::BookingRequest;
use crate::doctors::{CreateDoctorRequest, UpdateDoctorRequest};
use crate::error::Error;
use crate::metrics;
use crate::store::ListParams;

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/api/health", get(health_check))
        .route("/metrics", get(metrics_exposition))
        // Appointments
        .route("/api/appointments", post(book_appointment))
        .route("/api/appointments", get(list_appointments))
        .route("/api/appointments/my-history", get(my_history))
        .route("/api/appointments/{id}", get(get_appointment))
        .route("/api/appointments/{id}", put(update_appointment_status))
        .route("/api/appointments/{id}", delete(delete_appointment))
        // Doctors
        .route("/api/doctors", get(list_doctors))
        .route("/api/doctors", post(create_doctor))
        .route("/api/doctors/{id}", get(get_doctor))
        .route("/api/doctors/{id}", put(update_doctor))
        .route("/api/doctors/{id}", delete(delete_doctor))
        .route("/api/doctors/{id}/availability", get(doctor_availability))
        // Auth
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/user-profile", get(user_profile))
        .with_state(state)
}

/// Parse a path identifier, mapping failures to a cast error
fn parse_id(entity: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| Error::invalid_id(format!("Invalid {entity} ID: {raw}")).into())
}

// ============================================================================
// Service Handlers
// ============================================================================

/// Landing route
async fn welcome() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to the Medibook API!" }))
}

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_secs: u64,
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    }))
}

async fn metrics_exposition() -> impl IntoResponse {
    metrics::render()
}

// ============================================================================
// Appointment Handlers
// ============================================================================

/// Book a new appointment for the authenticated user
async fn book_appointment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<BookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let appointment = state.coordinator.reserve_and_book(request, &user).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(appointment).with_message("Appointment booked successfully!")),
    ))
}

/// Appointment history for the authenticated user, newest first
async fn my_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let history = state.appointments.my_history(user.id).await;
    Ok(Json(ApiResponse::list(history)))
}

/// Admin listing with filter/sort/page/limit query parameters
async fn list_appointments(
    State(state): State<AppState>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let params = ListParams::from_query(&raw);
    let page = state.appointments.list(&params).await;
    Ok(Json(ApiResponse::paged(
        page.items,
        page.total,
        page.pagination,
    )))
}

async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id("Appointment", &id)?;
    let appointment = state.appointments.get_by_id(id).await?;
    Ok(Json(
        ApiResponse::success(appointment)
            .with_message("Appointment details fetched successfully."),
    ))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    #[serde(default)]
    status: String,
}

/// Update appointment status; cancellation releases the held slot
async fn update_appointment_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id("Appointment", &id)?;
    let appointment = state.transitions.update_status(id, &request.status).await?;
    let message = format!("Appointment status updated to {}.", appointment.status);
    Ok(Json(ApiResponse::success(appointment).with_message(message)))
}

async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id("Appointment", &id)?;
    state.transitions.delete_appointment(id).await?;
    Ok(Json(
        ApiResponse::success(json!({})).with_message("Appointment deleted successfully."),
    ))
}

// ============================================================================
// Doctor Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
struct DoctorSearchQuery {
    search: Option<String>,
}

/// List doctors, optionally filtered by name/specialization search
async fn list_doctors(
    State(state): State<AppState>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let doctors = state.doctors.list(query.search.as_deref()).await?;
    let mut response = ApiResponse::list(doctors);
    response.message = Some("Doctors fetched successfully.".to_string());
    Ok(Json(response))
}

async fn get_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id("Doctor", &id)?;
    let doctor = state.doctors.get(id).await?;
    Ok(Json(
        ApiResponse::success(doctor).with_message("Doctor details fetched successfully."),
    ))
}

/// Only the slots still open for booking
async fn doctor_availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id("Doctor", &id)?;
    let slots = state.doctors.availability(id).await?;
    let mut response = ApiResponse::list(slots);
    response.message = Some("Doctor availability fetched successfully.".to_string());
    Ok(Json(response))
}

async fn create_doctor(
    State(state): State<AppState>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let doctor = state.doctors.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(doctor).with_message("Doctor created successfully.")),
    ))
}

async fn update_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id("Doctor", &id)?;
    let doctor = state.doctors.update(id, request).await?;
    Ok(Json(
        ApiResponse::success(doctor).with_message("Doctor updated successfully."),
    ))
}

async fn delete_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id("Doctor", &id)?;
    state.doctors.delete(id).await?;
    Ok(Json(
        ApiResponse::success(json!({})).with_message("Doctor deleted successfully."),
    ))
}

// ============================================================================
// Auth Handlers
// ============================================================================

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = state.auth.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(auth).with_message("User registered successfully")),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = state.auth.login(request).await?;
    Ok(Json(ApiResponse::success(auth).with_message("Login successful")))
}

async fn user_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.auth.profile(user.id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

// ============================================================================
// Tests
// ============================================================================
