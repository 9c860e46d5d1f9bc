//! Appointment booking workflow
//!
//! The heart of the service, in three pieces:
//!
//! - [`coordinator`] - reserves a doctor's time slot and creates the
//!   appointment record as one atomic unit
//! - [`transition`] - status changes and deletion, including slot release on
//!   cancellation
//! - [`query`] - read-only appointment lookups and listings
//!
//! Appointments are only ever created through the coordinator; a slot's
//! `isAvailable` flag is only ever flipped by the coordinator (reserve) and
//! the transition handler (release).

pub mod coordinator;
pub mod query;
pub mod transition;

pub use coordinator::{BookingCoordinator, BookingRequest};
pub use query::{AppointmentQueries, AppointmentView, DoctorRef};
pub use transition::{ReleaseOutcome, StatusTransitionHandler};
