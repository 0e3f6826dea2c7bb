use axum::{
    Router,
    routing::{get, post},
};

use crate::api::saml::handlers::{acs::acs, metadata::metadata};
use crate::error::AppError;
use crate::state::AppState;

/// Serve the metadata and ACS endpoints at the engine's configured paths and
/// hand every other request to `protected`.
///
/// `protected` is the embedding application, normally already wrapped with
/// `middleware::auth::require_account`.
pub fn router(state: AppState, protected: Router) -> Router {
    let metadata_path = state.metadata_path.to_string();
    let acs_path = state.acs_path.to_string();

    Router::new()
        .route(&metadata_path, get(metadata))
        .route(&acs_path, post(acs).fallback(not_an_assertion))
        .with_state(state)
        .fallback_service(protected)
}

// Anything but a POST to the consumer endpoint cannot carry a response.
async fn not_an_assertion() -> AppError {
    AppError::Forbidden
}
