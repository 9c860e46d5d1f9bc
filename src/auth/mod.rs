//! User registration, login and token verification

pub mod token;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::models::{is_valid_email, User, UserRole};
use crate::store::{DataStore, StoreError};

/// Minimum accepted password length
const MIN_PASSWORD_LEN: usize = 6;

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub phone: String,
}

/// Login payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Successful register/login result
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Registration, login and bearer-token verification
#[derive(Clone)]
pub struct AuthService {
    store: DataStore,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(store: DataStore, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Register a new user. Email must be unused; role defaults to patient.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse> {
        if request.name.trim().is_empty() {
            return Err(Error::validation("Name is required"));
        }
        if request.phone.trim().is_empty() {
            return Err(Error::validation("Phone number is required"));
        }
        if !is_valid_email(&request.email) {
            return Err(Error::validation("Please fill a valid email address"));
        }
        if request.password.len() < MIN_PASSWORD_LEN {
            return Err(Error::validation(
                "Password must be at least 6 characters long",
            ));
        }

        let password_hash = bcrypt::hash(&request.password, self.config.bcrypt_cost)
            .map_err(|e| Error::with_source("Password hashing failed", e))?;

        let now = chrono::Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            password_hash,
            role: request.role.unwrap_or_default(),
            phone: request.phone.trim().to_string(),
            created_at: now,
            updated_at: now,
        };

        self.store
            .insert_user(user.clone())
            .await
            .map_err(|e| match e {
                StoreError::DuplicateKey { .. } => Error::validation("User already exists"),
                other => other.into(),
            })?;

        info!(user_id = %user.id, role = ?user.role, "user registered");

        let token = token::issue(user.id, &self.config.jwt_secret, self.config.token_ttl_secs)?;
        Ok(AuthResponse { user, token })
    }

    /// Verify credentials and issue a token
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        let user = self
            .store
            .find_user_by_email(&request.email)
            .await
            .ok_or_else(|| Error::not_found("User not found"))?;

        let valid = bcrypt::verify(&request.password, &user.password_hash)
            .map_err(|e| Error::with_source("Password verification failed", e))?;
        if !valid {
            return Err(Error::auth("Invalid password"));
        }

        info!(user_id = %user.id, "user logged in");

        let token = token::issue(user.id, &self.config.jwt_secret, self.config.token_ttl_secs)?;
        Ok(AuthResponse { user, token })
    }

    /// Fetch the profile behind an authenticated user id
    pub async fn profile(&self, user_id: Uuid) -> Result<User> {
        self.store
            .get_user(user_id)
            .await
            .ok_or_else(|| Error::not_found("User not found"))
    }

    /// Resolve a bearer token to its user, for the auth extractor
    pub async fn verify_token(&self, token: &str) -> Result<User> {
        let user_id = token::verify(token, &self.config.jwt_secret)?;
        self.store
            .get_user(user_id)
            .await
            .ok_or_else(|| Error::auth("User not found, authorization denied"))
    }
}
