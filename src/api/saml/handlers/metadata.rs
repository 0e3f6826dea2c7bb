use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::state::AppState;

pub const METADATA_CONTENT_TYPE: &str = "application/samlmetadata+xml";

pub async fn metadata(State(state): State<AppState>) -> Result<Response, AppError> {
    let document = state.provider.metadata().map_err(|err| {
        tracing::error!(error = %err, "cannot render service provider metadata");
        AppError::from(err)
    })?;

    Ok(([(header::CONTENT_TYPE, METADATA_CONTENT_TYPE)], document).into_response())
}
