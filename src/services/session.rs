//! Stateless browser sessions.
//!
//! A session is nothing but a signed cookie. Every request re-derives validity
//! from the token, then projects its attributes into `X-Saml-*` request headers
//! and a typed [`SamlAttributes`] extension.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::{debug, warn};

use crate::error::PreconditionViolation;
use crate::services::provider::Assertion;
use crate::services::token::{SessionClaims, TokenCodec, TokenError};

pub const SESSION_COOKIE_NAME: &str = "token";

/// Reserved request-header namespace for projected attributes (lowercase, as
/// `HeaderName` normalises it).
pub const ATTRIBUTE_HEADER_PREFIX: &str = "x-saml-";

/// Validated session attributes, keyed by claim name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamlAttributes(BTreeMap<String, Vec<String>>);

impl SamlAttributes {
    pub fn new(attributes: BTreeMap<String, Vec<String>>) -> Self {
        Self(attributes)
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    /// Whether attribute `name` carries `value`.
    ///
    /// Names compare ASCII case-insensitively, like the `X-Saml-*` headers they
    /// project to; values must match exactly.
    pub fn contains(&self, name: &str, value: &str) -> bool {
        self.0
            .iter()
            .filter(|(claim, _)| claim.eq_ignore_ascii_case(name))
            .any(|(_, values)| values.iter().any(|v| v == value))
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

/// Header name a claim is projected under, if it forms a valid header name.
pub fn attribute_header(claim_name: &str) -> Option<HeaderName> {
    HeaderName::from_bytes(format!("{ATTRIBUTE_HEADER_PREFIX}{claim_name}").as_bytes()).ok()
}

#[derive(Debug, Clone)]
pub struct SessionManager {
    codec: Arc<TokenCodec>,
    lifetime: Duration,
}

impl SessionManager {
    pub fn new(codec: Arc<TokenCodec>, lifetime: Duration) -> Self {
        Self { codec, lifetime }
    }

    /// Flatten the assertion's attribute statement into claims.
    ///
    /// Attributes sharing a claim name are merged, values kept in document order.
    pub fn claims_from(assertion: &Assertion) -> BTreeMap<String, Vec<String>> {
        let mut attrs: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for attribute in &assertion.attributes {
            attrs
                .entry(attribute.claim_name().to_string())
                .or_default()
                .extend(attribute.values.iter().cloned());
        }
        attrs
    }

    /// Sign a session token for the assertion and wrap it in the session cookie.
    pub fn issue(&self, assertion: &Assertion) -> Result<Cookie<'static>, TokenError> {
        let iat = chrono::Utc::now().timestamp();
        let claims = SessionClaims {
            attrs: Self::claims_from(assertion),
            iat,
            exp: iat + self.lifetime.as_secs() as i64,
        };
        let signed = self.codec.sign(&claims)?;

        debug!(
            attributes = claims.attrs.len(),
            exp = claims.exp,
            "session token issued"
        );

        Ok(Cookie::build((SESSION_COOKIE_NAME, signed))
            .path("/")
            .max_age(time::Duration::seconds(self.lifetime.as_secs() as i64))
            .http_only(false)
            .build())
    }

    /// Validate the session cookie and project its claims into `headers`.
    ///
    /// `Ok(None)` is the ordinary unauthenticated case. Reserved headers already
    /// present on a request with a valid session are a precondition violation.
    pub fn authorize(
        &self,
        jar: &CookieJar,
        headers: &mut HeaderMap,
    ) -> Result<Option<SamlAttributes>, PreconditionViolation> {
        let Some(cookie) = jar.get(SESSION_COOKIE_NAME) else {
            return Ok(None);
        };

        let claims = match self.codec.verify::<SessionClaims>(cookie.value()) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(error = %err, "session token rejected");
                return Ok(None);
            }
        };

        if let Some(name) = headers
            .keys()
            .find(|name| name.as_str().starts_with(ATTRIBUTE_HEADER_PREFIX))
        {
            return Err(PreconditionViolation::ReservedHeaderPresent {
                header: name.to_string(),
            });
        }

        for (claim, values) in &claims.attrs {
            let Some(header_name) = attribute_header(claim) else {
                warn!(claim = %claim, "claim name is not a valid header name; not projected");
                continue;
            };
            for value in values {
                match HeaderValue::from_bytes(value.as_bytes()) {
                    Ok(v) => {
                        headers.append(header_name.clone(), v);
                    }
                    Err(_) => {
                        warn!(claim = %claim, "claim value is not a valid header value; not projected");
                    }
                }
            }
        }

        Ok(Some(SamlAttributes(claims.attrs)))
    }
}
