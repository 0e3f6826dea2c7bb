use std::collections::HashMap;

use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use crate::api::redirect::found;
use crate::error::{AppError, PreconditionViolation, fatal};
use crate::services::correlation::CorrelationError;
use crate::services::provider::ProviderError;
use crate::state::AppState;

const RELAY_STATE_FIELD: &str = "RelayState";

/// Assertion consumer service.
///
/// Validates the posted response against every pending request ID, consumes
/// the matching correlation cookie, issues the session cookie and sends the
/// browser back to where it started.
pub async fn acs(
    State(state): State<AppState>,
    jar: CookieJar,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form.map_err(|err| {
        warn!(error = %err, "unreadable assertion consumer form");
        AppError::Forbidden
    })?;

    let possible_request_ids = state.registry.collect(&jar);

    let assertion = state
        .provider
        .parse_response(&form, &possible_request_ids)
        .map_err(|err| {
            log_rejected_response(&err);
            AppError::from(err)
        })?;

    let relay_state = form
        .get(RELAY_STATE_FIELD)
        .map(String::as_str)
        .unwrap_or_default();

    let (redirect_uri, jar) = if relay_state.is_empty() {
        // IdP-initiated: nothing to correlate with.
        (state.default_redirect_uri.to_string(), jar)
    } else {
        match state.correlation.resolve(jar.clone(), relay_state) {
            Ok((token, jar)) => (token.target_uri, jar),
            Err(err) => {
                warn!(error = %err, "correlation cookie rejected");
                let jar = match err {
                    CorrelationError::Invalid { .. } => state.correlation.discard(jar, relay_state),
                    _ => jar,
                };
                return Ok((jar, AppError::from(err)).into_response());
            }
        }
    };

    let session_cookie = state
        .sessions
        .issue(&assertion)
        .unwrap_or_else(|err| fatal(PreconditionViolation::SigningFailed(err)));

    found(jar.add(session_cookie), &redirect_uri)
}

fn log_rejected_response(err: &ProviderError) {
    match err {
        ProviderError::InvalidResponse(diag) => warn!(
            response = %diag.response,
            now = %diag.now,
            error = %diag.private_err,
            "SAML response rejected"
        ),
        other => warn!(error = %other, "SAML response rejected"),
    }
}
