//! Gate a router on one projected attribute value.
//!
//! Reads the `SamlAttributes` extension that `require_account` inserts, never
//! the `X-Saml-*` headers, so a client cannot satisfy the check by sending them.
//! The attribute name matches case-insensitively, as a header name would; the
//! value must match exactly.
//! Apply it before `require_account` so that it ends up inside it:
//!
//! ```ignore
//! let admin = require_attribute::apply(admin_routes, "role", "admin");
//! let app = require_account::apply(admin, state.clone());
//! ```

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::session::SamlAttributes;

#[derive(Debug, Clone)]
struct Requirement {
    name: Arc<str>,
    value: Arc<str>,
}

pub fn apply<S>(router: Router<S>, name: &str, value: &str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let requirement = Requirement {
        name: name.into(),
        value: value.into(),
    };
    router.layer(middleware::from_fn_with_state(requirement, require_attribute))
}

async fn require_attribute(
    State(requirement): State<Requirement>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let allowed = req
        .extensions()
        .get::<SamlAttributes>()
        .is_some_and(|attributes| attributes.contains(&requirement.name, &requirement.value));

    if !allowed {
        tracing::debug!(attribute = %requirement.name, "required attribute value missing");
        return Err(AppError::Forbidden);
    }

    Ok(next.run(req).await)
}
