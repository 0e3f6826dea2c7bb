/*
 * Responsibility
 * - AppError: request-level failures and their HTTP mapping (403 / 500)
 * - PreconditionViolation: integration bugs that must abort the request loudly
 * - Clients only ever see the generic status text; details go to the log
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::correlation::CorrelationError;
use crate::services::provider::ProviderError;
use crate::services::random::RandomError;
use crate::services::token::TokenError;

#[derive(Debug, Serialize)]
struct ErrorResponseBody {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: &'static str,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("forbidden")]
    Forbidden,

    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = match self {
            AppError::Forbidden => "FORBIDDEN",
            AppError::Internal => "INTERNAL",
        };

        let body = ErrorResponseBody {
            error: ErrorBody {
                code,
                message: status.canonical_reason().unwrap_or("error"),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<CorrelationError> for AppError {
    fn from(e: CorrelationError) -> Self {
        match e {
            CorrelationError::NotFound { .. } | CorrelationError::Invalid { .. } => {
                AppError::Forbidden
            }
            CorrelationError::Random(_) | CorrelationError::Signing(_) => AppError::Internal,
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::InvalidResponse(_) => AppError::Forbidden,
            ProviderError::Request(_)
            | ProviderError::Metadata(_)
            | ProviderError::NoBindingLocation(_) => AppError::Internal,
        }
    }
}

impl From<RandomError> for AppError {
    fn from(_: RandomError) -> Self {
        AppError::Internal
    }
}

/// Caller or integration bugs. Never turned into a response.
#[derive(Debug, Error)]
pub enum PreconditionViolation {
    #[error("reserved attribute header `{header}` present on inbound request")]
    ReservedHeaderPresent { header: String },

    #[error("RequireAccount wraps the assertion consumer endpoint `{path}`")]
    RequireAccountOnAcs { path: String },

    #[error("failed to sign token: {0}")]
    SigningFailed(#[source] TokenError),
}

/// Abort the current request. The panic hook and catch-panic layer installed by
/// `app` make this visible; it is never downgraded to a normal error.
pub fn fatal(violation: PreconditionViolation) -> ! {
    tracing::error!(error = %violation, "precondition violated");
    panic!("precondition violated: {violation}");
}
