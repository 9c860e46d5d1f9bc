//! API response envelope and error mapping
//!
//! Every response carries a `success` boolean; successful writes add `data`
//! and a human-readable `message`, listings add `count` (and for the admin
//! listing, `total` and `pagination`). Errors are `{success: false,
//! message}` with the status derived from the error's structural kind.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::error;

use crate::error::{Error, ErrorKind};
use crate::metrics;
use crate::store::Pagination;

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            count: None,
            total: None,
            pagination: None,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// Listing response: `count` mirrors the number of returned items
    pub fn list(items: Vec<T>) -> Self {
        Self {
            success: true,
            count: Some(items.len()),
            total: None,
            pagination: None,
            data: Some(items),
            message: None,
        }
    }

    /// Paginated listing response
    pub fn paged(items: Vec<T>, total: usize, pagination: Pagination) -> Self {
        Self {
            success: true,
            count: Some(items.len()),
            total: Some(total),
            pagination: Some(pagination),
            data: Some(items),
            message: None,
        }
    }
}

/// Error body: `{success: false, message}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

/// Whether 500 responses hide the underlying error detail. Set once at
/// server construction; defaults to off (detail shown) for tests and tools.
static PRODUCTION: OnceLock<bool> = OnceLock::new();

pub fn set_production(production: bool) {
    PRODUCTION.set(production).ok();
}

fn production() -> bool {
    PRODUCTION.get().copied().unwrap_or(false)
}

/// Handler-level error, produced from [`Error`] and rendered with the status
/// its kind maps to
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

/// Map an error kind to its HTTP status.
///
/// Conflict intentionally maps to 400, not 409: the booking API reports a
/// held slot as a bad request ("Selected time slot is not available.").
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation | ErrorKind::Cast | ErrorKind::Conflict => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Auth => StatusCode::UNAUTHORIZED,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Validation => "validation",
        ErrorKind::NotFound => "not_found",
        ErrorKind::Conflict => "conflict",
        ErrorKind::Cast => "cast",
        ErrorKind::Auth => "auth",
        ErrorKind::Internal => "internal",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = status_for(kind);
        metrics::api_error(kind_label(kind));

        let message = if kind == ErrorKind::Internal {
            error!(error = %self.0, "unhandled error");
            if production() {
                "Server Error".to_string()
            } else {
                self.0.to_string()
            }
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response_shape() {
        let response = ApiResponse::success("data").with_message("ok");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"], "data");
        assert_eq!(value["message"], "ok");
        assert!(value.get("count").is_none());
    }

    #[test]
    fn test_list_response_counts_items() {
        let response = ApiResponse::list(vec![1, 2, 3]);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["count"], 3);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Cast), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Conflict), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Auth), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_for(ErrorKind::Internal),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
