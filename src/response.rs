use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::StoreError;
use crate::services::correction::CorrectionError;
use crate::services::ingest::IngestError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
    is_operational: bool,
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", message)
    }

    pub fn internal(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: code.into(),
            message: message.into(),
            is_operational: false,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// The text safe to show a client.
    pub fn public_message(&self) -> &str {
        if self.is_operational {
            &self.message
        } else {
            "Internal server error"
        }
    }

    fn operational(
        status: StatusCode,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            is_operational: true,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: self.public_message().to_string(),
            code: self.code,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "store failure");
        Self::internal("STORE_ERROR", err.to_string())
    }
}

impl From<CorrectionError> for AppError {
    fn from(err: CorrectionError) -> Self {
        match err {
            CorrectionError::EmptyText | CorrectionError::TooLong { .. } => {
                Self::validation(err.to_string())
            }
            CorrectionError::Validation(inner) => {
                tracing::warn!(error = %inner, "spellchecker returned unusable spans");
                Self::validation(inner.to_string())
            }
            CorrectionError::Upstream(inner) => {
                tracing::warn!(error = %inner, "upstream service failed");
                Self::upstream("Spellchecking service is unavailable")
            }
            CorrectionError::Ingest(IngestError::UserNotFound(user_id)) => {
                Self::not_found(format!("User {user_id} not found"))
            }
            CorrectionError::Ingest(inner @ IngestError::Store { .. }) => {
                tracing::error!(error = %inner, "mistake ingestion aborted");
                Self::internal("STORE_ERROR", inner.to_string())
            }
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: impl Into<String>,
    message: impl Into<String>,
) -> AppError {
    AppError {
        status,
        code: code.into(),
        message: message.into(),
        is_operational: true,
    }
}
