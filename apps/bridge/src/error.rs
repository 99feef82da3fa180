//! # API Error Type
//!
//! Unified error type for bridge commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tally POS                              │
//! │                                                                         │
//! │  Frontend                    Rust Backend                               │
//! │  ────────                    ────────────                               │
//! │                                                                         │
//! │  {"cmd": "complete_sale"}                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<Reply, ApiError>                                         │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Bad args? ───────── serde_json::Error ─────────┐               │  │
//! │  │         │                                        │               │  │
//! │  │         ▼                                        ▼               │  │
//! │  │  Business rule? ──── CoreError::InsufficientStock ── ApiError ──►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ─── (save failed? ──► Notice, not an error) ───────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  {"ok": false, "error": {"code": "INSUFFICIENT_STOCK", "message": ...}} │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Persistence failures after a successful in-memory change are reported as
//! notices on a successful response (see [`crate::state::Notice`]). They only
//! become an [`ApiError`] for commands whose whole purpose is storage, such as
//! `clear_all_data`.

use serde::Serialize;
use tally_core::{CoreError, ValidationError};
use tally_db::DbError;
use thiserror::Error;

/// API error returned from bridge commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Sale not found: 3f2a..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// ## Usage in Frontend
/// ```typescript
/// const res = await bridge.call('set_line_quantity', { index, quantity });
/// if (!res.ok) {
///   switch (res.error.code) {
///     case 'VALIDATION_ERROR':
///       showFieldError(res.error.message);
///       break;
///     case 'SALE_ERROR':
///       showBanner(res.error.message);
///       break;
///     default:
///       showError('An error occurred');
///   }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced record does not exist
    NotFound,

    /// Form input failed validation
    ValidationError,

    /// Sale would take a product below zero stock
    InsufficientStock,

    /// Sale draft cannot perform the operation (not ready, last line, ...)
    SaleError,

    /// Storage failed for a storage-only command
    PersistenceError,

    /// Unknown command or malformed arguments
    BadRequest,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BadRequest, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        tracing::error!(error = %err, "Persistence failed");
        ApiError::new(
            ErrorCode::PersistenceError,
            format!("Could not save data: {}", err),
        )
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ProductNotFound(_) => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::NoCustomerSelected
            | CoreError::SaleNotReady { .. }
            | CoreError::LastLine
            | CoreError::TooManyLines { .. } => ErrorCode::SaleError,
            CoreError::Validation(e) => return ApiError::validation(e.to_string()),
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Malformed `args` for a known command.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::bad_request(format!("Invalid arguments: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Startup Errors
// =============================================================================

/// Failures that stop the bridge before it can serve requests.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_codes() {
        let err: ApiError = CoreError::InsufficientStock {
            product: "Formula 1".to_string(),
            available: 2,
            requested: 3,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let err: ApiError = CoreError::NoCustomerSelected.into();
        assert_eq!(err.code, ErrorCode::SaleError);
        assert_eq!(err.message, "Select a customer before completing the sale");

        let err: ApiError = CoreError::from(ValidationError::required("supplier")).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "supplier is required");
    }

    #[test]
    fn test_serializes_screaming_code() {
        let json = serde_json::to_value(ApiError::not_found("Sale", "s1")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Sale not found: s1");
    }

    #[test]
    fn test_db_error_is_persistence_error() {
        let err: ApiError = DbError::Unavailable("read-only".to_string()).into();
        assert_eq!(err.code, ErrorCode::PersistenceError);
    }
}
