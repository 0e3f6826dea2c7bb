use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::error::AppError;

/// `302 Found` carrying the jar's cookie changes.
pub(crate) fn found(jar: CookieJar, location: &str) -> Result<Response, AppError> {
    let location = HeaderValue::from_str(location).map_err(|_| {
        tracing::error!("redirect location is not a valid header value");
        AppError::Internal
    })?;

    Ok((StatusCode::FOUND, jar, [(header::LOCATION, location)]).into_response())
}
