//! HTTP surface of the booking service
//!
//! - [`response`] - uniform `{success, data, message}` envelope and the
//!   error-to-status mapping
//! - [`extract`] - bearer-token authentication extractor
//! - [`routes`] - route table and handlers
//! - [`server`] - shared state and server lifecycle

pub mod extract;
pub mod response;
pub mod routes;
pub mod server;

pub use response::{ApiError, ApiResponse};
pub use routes::create_router;
pub use server::{ApiServer, AppState};
