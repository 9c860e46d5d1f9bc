//! Booking coordinator
//!
//! Orchestrates slot reservation and appointment creation. The slot lookup,
//! availability check, slot flip and appointment insert all run inside one
//! store transaction, so two concurrent bookings of the same slot serialize:
//! the second observes `isAvailable == false` and fails with a conflict, and
//! a failed booking leaves neither a flipped slot nor an orphan appointment
//! behind.

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::metrics;
use crate::models::{combine_date_time, is_valid_email, Appointment, AppointmentStatus, User};
use crate::store::DataStore;

/// Booking request as received from the API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[serde(default)]
    pub doctor_id: String,
    #[serde(default)]
    pub appointment_date: String,
    #[serde(default)]
    pub appointment_time: String,
    #[serde(default)]
    pub time_slot_id: String,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub patient_email: Option<String>,
    #[serde(default)]
    pub patient_phone: Option<String>,
}

/// Coordinates atomic slot reservation + appointment creation
#[derive(Clone)]
pub struct BookingCoordinator {
    store: DataStore,
}

impl BookingCoordinator {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// Reserve the requested time slot and create the appointment.
    ///
    /// `patient` is the authenticated user making the booking; missing
    /// contact fields default to their profile.
    pub async fn reserve_and_book(
        &self,
        request: BookingRequest,
        patient: &User,
    ) -> Result<Appointment> {
        if request.doctor_id.is_empty()
            || request.appointment_date.is_empty()
            || request.appointment_time.is_empty()
            || request.time_slot_id.is_empty()
        {
            return Err(Error::validation("Doctor, date, and time slot are required."));
        }

        let doctor_id = Uuid::parse_str(&request.doctor_id)
            .map_err(|_| Error::invalid_id(format!("Invalid Doctor ID: {}", request.doctor_id)))?;

        // Denormalized contact snapshot, defaulting from the booking user
        let patient_name = request
            .patient_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| patient.name.clone());
        let patient_email = request
            .patient_email
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| patient.email.clone());
        let patient_phone = request
            .patient_phone
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| patient.phone.clone());

        if patient_phone.trim().is_empty() {
            return Err(Error::validation("Patient phone number is required"));
        }
        if !is_valid_email(&patient_email) {
            return Err(Error::validation("Please fill a valid email address"));
        }

        let appointment_date_time =
            combine_date_time(&request.appointment_date, &request.appointment_time)?;

        let time_slot_id = request.time_slot_id.clone();
        let patient_id = patient.id;

        let result = self
            .store
            .transaction::<Appointment, Error, _>(move |docs| {
                let doctor = docs
                    .doctors
                    .get_mut(&doctor_id)
                    .ok_or_else(|| Error::not_found("Doctor not found."))?;

                let slot = doctor
                    .find_slot_mut(&time_slot_id)
                    .ok_or_else(|| Error::not_found(format!("Time slot not found: {time_slot_id}")))?;

                if !slot.is_available {
                    return Err(Error::conflict("Selected time slot is not available."));
                }

                // Reserve the slot and append the appointment; the transaction
                // commits both or neither.
                slot.is_available = false;
                let now = Utc::now();
                doctor.updated_at = now;

                let appointment = Appointment {
                    id: Uuid::new_v4(),
                    doctor_id,
                    patient_id,
                    patient_name,
                    patient_email,
                    patient_phone,
                    appointment_date_time,
                    time_slot_id,
                    status: AppointmentStatus::Confirmed,
                    created_at: now,
                    updated_at: now,
                };
                docs.appointments.insert(appointment.id, appointment.clone());
                Ok(appointment)
            })
            .await;

        match &result {
            Ok(appointment) => {
                metrics::booking_succeeded();
                info!(
                    appointment_id = %appointment.id,
                    doctor_id = %appointment.doctor_id,
                    slot = %appointment.time_slot_id,
                    "appointment booked"
                );
            }
            Err(Error::Conflict(_)) => {
                metrics::booking_conflicted();
                warn!(doctor_id = %doctor_id, slot = %request.time_slot_id, "slot already held");
            }
            Err(_) => metrics::booking_failed(),
        }

        result
    }
}
