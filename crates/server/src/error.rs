use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use banchi_core::PeriodError;

/// Every pipeline failure maps to a stable machine code plus a human message.
/// Expected domain errors keep their specific code; store failures are
/// presented opaquely and logged server-side.
#[derive(Debug)]
pub enum ApiError {
    NotFound { code: &'static str, message: String },
    PreconditionFailed { code: &'static str, message: String },
    InvalidInput { code: &'static str, message: String },
    /// A reconciliation run failed mid-flight; carries the run id so the
    /// partially written results can be inspected.
    ReconciliationFailed { run_id: i64 },
    Dependency(sqlx::Error),
    Internal(String),
}

impl ApiError {
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::NotFound { code, message: message.into() }
    }

    pub fn precondition(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::PreconditionFailed { code, message: message.into() }
    }

    pub fn invalid(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::InvalidInput { code, message: message.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::PreconditionFailed { .. } => StatusCode::CONFLICT,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ReconciliationFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound { code, .. } => code,
            ApiError::PreconditionFailed { code, .. } => code,
            ApiError::InvalidInput { code, .. } => code,
            ApiError::ReconciliationFailed { .. } => "RECONCILIATION_FAILED",
            ApiError::Dependency(_) => "DEPENDENCY_FAILURE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The client-facing message. Internal errors are not leaked.
    fn public_message(&self) -> String {
        match self {
            ApiError::NotFound { message, .. } => message.clone(),
            ApiError::PreconditionFailed { message, .. } => message.clone(),
            ApiError::InvalidInput { message, .. } => message.clone(),
            ApiError::ReconciliationFailed { .. } => "Reconciliation failed".to_string(),
            ApiError::Dependency(_) => "Internal Server Error".to_string(),
            ApiError::Internal(_) => "Internal Server Error".to_string(),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Dependency(e)
    }
}

impl From<PeriodError> for ApiError {
    fn from(e: PeriodError) -> Self {
        ApiError::invalid("VALIDATION_ERROR", e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                ApiError::Dependency(e) => tracing::error!("store error: {e}"),
                ApiError::Internal(m) => tracing::error!("internal error: {m}"),
                ApiError::ReconciliationFailed { run_id } => {
                    tracing::error!("reconciliation run {run_id} failed")
                }
                _ => {}
            }
        }

        let mut body = json!({
            "status": "error",
            "code": self.code(),
            "message": self.public_message(),
        });
        if let ApiError::ReconciliationFailed { run_id } = &self {
            body["details"] = json!({ "run_id": run_id });
        }

        (status, Json(body)).into_response()
    }
}
