//! API server implementation
//!
//! Wires the document store and services into shared state, layers CORS and
//! request tracing per configuration, and runs the HTTP listener.

use std::time::Instant;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::AuthService;
use crate::booking::{AppointmentQueries, BookingCoordinator, StatusTransitionHandler};
use crate::config::Config;
use crate::doctors::DoctorDirectory;
use crate::error::{Error, Result};
use crate::store::DataStore;

use super::routes::create_router;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Document store behind all services
    pub store: DataStore,

    /// Atomic slot-reservation and booking
    pub coordinator: BookingCoordinator,

    /// Status transitions and deletion, with slot release
    pub transitions: StatusTransitionHandler,

    /// Appointment lookups and listings
    pub appointments: AppointmentQueries,

    /// Doctor directory
    pub doctors: DoctorDirectory,

    /// Registration, login and token verification
    pub auth: AuthService,

    /// Server start time
    pub start_time: Instant,

    /// Configuration
    pub config: Config,
}

impl AppState {
    /// Build the full service graph over one store
    pub fn new(store: DataStore, config: Config) -> Self {
        Self {
            coordinator: BookingCoordinator::new(store.clone()),
            transitions: StatusTransitionHandler::new(store.clone()),
            appointments: AppointmentQueries::new(store.clone()),
            doctors: DoctorDirectory::new(store.clone()),
            auth: AuthService::new(store.clone(), config.auth.clone()),
            store,
            start_time: Instant::now(),
            config,
        }
    }
}

// ============================================================================
// API Server
// ============================================================================

/// Main API server
pub struct ApiServer {
    config: Config,
    state: AppState,
}

impl ApiServer {
    /// Create a new server over the given store
    pub fn new(config: Config, store: DataStore) -> Result<Self> {
        config.validate()?;
        super::response::set_production(config.production);
        let state = AppState::new(store, config.clone());
        Ok(Self { config, state })
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        // Add CORS layer if enabled
        if self.config.server.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        // Add tracing layer if enabled
        if self.config.server.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start the server
    pub async fn start(&self) -> Result<()> {
        let router = self.build_router();
        let addr = self.config.server.bind_address;

        tracing::info!("Starting medibook API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::with_source(format!("Failed to bind {addr}"), e))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::with_source("Server error", e))?;

        Ok(())
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let router = self.build_router();
        let addr = self.config.server.bind_address;

        tracing::info!(
            "Starting medibook API server on {} (with graceful shutdown)",
            addr
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::with_source(format!("Failed to bind {addr}"), e))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| Error::with_source("Server error", e))?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.auth.jwt_secret = "test-secret".to_string();
        config.auth.bcrypt_cost = 4;
        config
    }

    #[test]
    fn test_server_creation() {
        let server = ApiServer::new(test_config(), DataStore::new());
        assert!(server.is_ok());
    }

    #[test]
    fn test_server_rejects_invalid_config() {
        // Missing JWT secret
        let server = ApiServer::new(Config::default(), DataStore::new());
        assert!(server.is_err());
    }

    #[tokio::test]
    async fn test_state_shares_one_store() {
        let server = ApiServer::new(test_config(), DataStore::new()).unwrap();
        let state = server.state();

        let doctor = crate::models::Doctor::new("Dr. Kim", "Cardiology");
        let id = doctor.id;
        state.store.put_doctor(doctor).await;

        // The directory sees documents written through the shared store
        let fetched = state.doctors.get(id).await.unwrap();
        assert_eq!(fetched.id, id);
    }
}
