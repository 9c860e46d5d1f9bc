//! Appointment status transitions and deletion
//!
//! Status writes are transactional on their own. Slot release on
//! cancellation or deletion is a separate, best-effort compensating step: a
//! missing doctor or slot is logged and the status change still stands. It is
//! deliberately NOT part of the status transaction.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::metrics;
use crate::models::{Appointment, AppointmentStatus};
use crate::store::DataStore;

/// Outcome of a best-effort slot release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The slot was marked available again
    Released,
    /// The doctor document no longer exists
    DoctorMissing,
    /// The doctor exists but the slot id was not found
    SlotMissing,
}

/// Handles cancellation, completion and deletion of appointments
#[derive(Clone)]
pub struct StatusTransitionHandler {
    store: DataStore,
}

impl StatusTransitionHandler {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// Update an appointment's status. Cancellation releases the held slot
    /// (best-effort).
    pub async fn update_status(&self, id: Uuid, new_status: &str) -> Result<Appointment> {
        let status = AppointmentStatus::parse(new_status).ok_or_else(|| {
            Error::validation(
                "Invalid status provided. Must be pending, confirmed, cancelled, or completed.",
            )
        })?;

        let updated = self
            .store
            .transaction::<Appointment, Error, _>(move |docs| {
                let appointment = docs.appointments.get_mut(&id).ok_or_else(|| {
                    Error::not_found(format!("Appointment not found with ID of {id}"))
                })?;
                appointment.status = status;
                appointment.updated_at = Utc::now();
                Ok(appointment.clone())
            })
            .await?;

        info!(appointment_id = %id, status = %status, "appointment status updated");

        if status == AppointmentStatus::Cancelled {
            self.release_slot(&updated).await;
        }

        Ok(updated)
    }

    /// Delete an appointment and release its slot (best-effort)
    pub async fn delete_appointment(&self, id: Uuid) -> Result<()> {
        let removed = self
            .store
            .remove_appointment(id)
            .await
            .ok_or_else(|| Error::not_found(format!("Appointment not found with ID of {id}")))?;

        info!(appointment_id = %id, "appointment deleted");
        self.release_slot(&removed).await;
        Ok(())
    }

    /// Flip the appointment's slot back to available.
    ///
    /// Runs after (not within) the status write. Failure is reported through
    /// the log and the outcome value; it never fails the caller.
    pub async fn release_slot(&self, appointment: &Appointment) -> ReleaseOutcome {
        let doctor_id = appointment.doctor_id;
        let slot_id = appointment.time_slot_id.clone();

        let outcome = self
            .store
            .transaction::<ReleaseOutcome, std::convert::Infallible, _>(move |docs| {
                let Some(doctor) = docs.doctors.get_mut(&doctor_id) else {
                    return Ok(ReleaseOutcome::DoctorMissing);
                };
                match doctor.find_slot_mut(&slot_id) {
                    Some(slot) => {
                        slot.is_available = true;
                        doctor.updated_at = Utc::now();
                        Ok(ReleaseOutcome::Released)
                    }
                    None => Ok(ReleaseOutcome::SlotMissing),
                }
            })
            .await
            .unwrap_or(ReleaseOutcome::DoctorMissing);

        match outcome {
            ReleaseOutcome::Released => {
                metrics::slot_released();
                info!(
                    doctor_id = %appointment.doctor_id,
                    slot = %appointment.time_slot_id,
                    "slot released"
                );
            }
            ReleaseOutcome::DoctorMissing => warn!(
                doctor_id = %appointment.doctor_id,
                "slot release skipped: doctor no longer exists"
            ),
            ReleaseOutcome::SlotMissing => warn!(
                doctor_id = %appointment.doctor_id,
                slot = %appointment.time_slot_id,
                "slot release skipped: slot no longer exists"
            ),
        }

        outcome
    }
}
