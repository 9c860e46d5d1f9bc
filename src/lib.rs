//! medibook - Medical appointment booking service
//!
//! A backend API for booking medical appointments against doctors'
//! published time slots, with atomic slot reservation, cancellation that
//! releases slots, and token-based authentication.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Core data structures (doctors, slots, appointments, users)
//! - [`store`] - Transactional in-process document store
//! - [`booking`] - Booking coordinator, status transitions and queries
//! - [`doctors`] - Doctor directory and availability
//! - [`auth`] - Registration, login and token verification
//! - [`api`] - HTTP surface (routes, response envelope, server)
//! - [`metrics`] - Prometheus counters
//!
//! # Example
//!
//! ```no_run
//! use medibook::api::ApiServer;
//! use medibook::config::Config;
//! use medibook::store::DataStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let server = ApiServer::new(config, DataStore::new())?;
//!     server.start().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod booking;
pub mod config;
pub mod doctors;
pub mod error;
pub mod metrics;
pub mod models;
pub mod store;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{ApiServer, AppState};
    pub use crate::booking::{BookingCoordinator, BookingRequest, StatusTransitionHandler};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::models::{Appointment, AppointmentStatus, Doctor, TimeSlot, User};
    pub use crate::store::DataStore;
}

// Direct re-exports for convenience
pub use models::{Appointment, AppointmentStatus, Doctor, TimeSlot, User};
