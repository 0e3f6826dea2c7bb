use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};

use super::SamlAttributes;

/// Extractor for the `SamlAttributes` that `require_account` put into the
/// request extensions. Missing means the route is not behind the gate: 401.
#[derive(Debug, Clone)]
pub struct SamlAttributesExtractor(pub SamlAttributes);

impl<S> FromRequestParts<S> for SamlAttributesExtractor
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SamlAttributes>()
            .cloned()
            .map(SamlAttributesExtractor)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
