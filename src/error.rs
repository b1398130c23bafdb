use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

/// Application error taxonomy.
///
/// Only `NotFound` and `Gone` ever reach an end user on the redirect path;
/// everything else is operational and surfaces on the API or in logs.
#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    NotFound { message: String, details: Value },
    /// Link exists and is active, but its expiry timestamp is in the past.
    Gone { message: String, details: Value },
    Conflict { message: String, details: Value },
    /// Short-code generation exceeded its collision retry cap.
    GenerationExhausted { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn gone(message: impl Into<String>, details: Value) -> Self {
        Self::Gone {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn generation_exhausted(message: impl Into<String>, details: Value) -> Self {
        Self::GenerationExhausted {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (code, message) = match self {
            AppError::Validation { message, .. } => ("validation_error", message),
            AppError::NotFound { message, .. } => ("not_found", message),
            AppError::Gone { message, .. } => ("gone", message),
            AppError::Conflict { message, .. } => ("conflict", message),
            AppError::GenerationExhausted { message, .. } => ("generation_exhausted", message),
            AppError::Internal { message, .. } => ("internal_error", message),
        };
        write!(f, "{code}: {message}")
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details,
            ),
            AppError::NotFound { message, details } => {
                (StatusCode::NOT_FOUND, "not_found", message, details)
            }
            AppError::Gone { message, details } => (StatusCode::GONE, "gone", message, details),
            AppError::Conflict { message, details } => {
                (StatusCode::CONFLICT, "conflict", message, details)
            }
            AppError::GenerationExhausted { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "generation_exhausted",
                message,
                details,
            ),
            AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }
    }

    AppError::internal("Database error", json!({}))
}

/// Returns true when the error is the `links.code` unique constraint firing,
/// i.e. a generated code lost an insert race and generation should be retried.
pub fn is_unique_violation_on_code(e: &AppError) -> bool {
    match e {
        AppError::Conflict { details, .. } => details
            .get("constraint")
            .and_then(Value::as_str)
            .is_some_and(|c| c == "links_code_key"),
        _ => false,
    }
}
