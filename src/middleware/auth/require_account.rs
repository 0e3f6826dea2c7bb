//! Session check → attribute projection, or a redirect into the SAML login flow.
//!
//! On success the validated attributes are projected as `X-Saml-*` request
//! headers and inserted into request extensions as `SamlAttributes`.
//! Without a valid session the browser is sent to the IdP with a fresh
//! correlation cookie; the relay identifier travels as RelayState.

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::api::redirect::found;
use crate::error::{AppError, PreconditionViolation, fatal};
use crate::services::correlation::CorrelationError;
use crate::services::provider::Binding;
use crate::state::AppState;

/// Require a valid session on every route of `router`.
///
/// ```ignore
/// let app = Router::new().route("/", get(home));
/// let app = middleware::auth::require_account::apply(app, state.clone());
/// ```
pub fn apply<S>(router: Router<S>, state: AppState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(state, require_account))
}

async fn require_account(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(req.headers());

    match state.sessions.authorize(&jar, req.headers_mut()) {
        Ok(Some(attributes)) => {
            req.extensions_mut().insert(attributes);
            return Ok(next.run(req).await);
        }
        Ok(None) => {}
        Err(violation) => fatal(violation),
    }

    // Redirecting from the ACS endpoint would loop forever.
    if original_uri.path() == &*state.acs_path {
        fatal(PreconditionViolation::RequireAccountOnAcs {
            path: state.acs_path.to_string(),
        });
    }

    let idp_url = state
        .provider
        .sso_binding_location(Binding::HttpRedirect)
        .ok_or_else(|| {
            tracing::error!("identity provider has no HTTP-Redirect SSO location");
            AppError::Internal
        })?;

    let authn_request = state
        .provider
        .make_authentication_request(&idp_url)
        .map_err(|err| {
            tracing::error!(error = %err, "cannot build authentication request");
            AppError::from(err)
        })?;

    let target_uri = original_uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let jar = state.correlation.evict_excess(jar);
    let (relay_id, cookie) = state
        .correlation
        .begin(authn_request.id(), target_uri)
        .map_err(|err| match err {
            CorrelationError::Signing(source) => {
                fatal(PreconditionViolation::SigningFailed(source))
            }
            other => {
                tracing::error!(error = %other, "cannot start login attempt");
                AppError::from(other)
            }
        })?;

    let redirect_url = authn_request.redirect(&relay_id).map_err(|err| {
        tracing::error!(error = %err, "cannot build IdP redirect");
        AppError::from(err)
    })?;

    tracing::debug!(request_id = %authn_request.id(), "redirecting to identity provider");

    found(jar.add(cookie), redirect_url.as_str())
}
