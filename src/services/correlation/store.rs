use std::{sync::Arc, time::Duration};

use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::{debug, warn};

use crate::services::random::{self, RandomError, RandomSource};
use crate::services::token::{CorrelationClaims, TokenCodec, TokenError};

/// Prefix of every correlation cookie; the rest of the name is the relay identifier.
pub const CORRELATION_COOKIE_PREFIX: &str = "saml_";

pub fn cookie_name(relay_id: &str) -> String {
    format!("{CORRELATION_COOKIE_PREFIX}{relay_id}")
}

/// What a login attempt needs to remember across the IdP round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationToken {
    pub request_id: String,
    pub target_uri: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CorrelationError {
    #[error("correlation cookie not found: {cookie}")]
    NotFound { cookie: String },
    #[error("correlation cookie {cookie} rejected: {source}")]
    Invalid {
        cookie: String,
        #[source]
        source: TokenError,
    },
    #[error(transparent)]
    Random(#[from] RandomError),
    #[error("failed to sign correlation token")]
    Signing(#[source] TokenError),
}

/// Cookie-backed store of in-flight login attempts. Nothing is kept server-side.
#[derive(Clone)]
pub struct CorrelationStore {
    codec: Arc<TokenCodec>,
    random: Arc<dyn RandomSource>,
    acs_path: String,
    max_age: Duration,
    max_pending: usize,
}

impl std::fmt::Debug for CorrelationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorrelationStore")
            .field("acs_path", &self.acs_path)
            .field("max_age", &self.max_age)
            .field("max_pending", &self.max_pending)
            .finish()
    }
}

impl CorrelationStore {
    pub fn new(
        codec: Arc<TokenCodec>,
        random: Arc<dyn RandomSource>,
        acs_path: impl Into<String>,
        max_age: Duration,
        max_pending: usize,
    ) -> Self {
        Self {
            codec,
            random,
            acs_path: acs_path.into(),
            max_age,
            max_pending: max_pending.max(1),
        }
    }

    /// Start a login attempt: returns the relay identifier and the cookie holding
    /// the signed correlation token.
    pub fn begin(
        &self,
        request_id: &str,
        target_uri: &str,
    ) -> Result<(String, Cookie<'static>), CorrelationError> {
        let relay_id = random::relay_identifier(self.random.as_ref())?;

        let iat = chrono::Utc::now().timestamp();
        let claims = CorrelationClaims {
            id: request_id.to_string(),
            uri: target_uri.to_string(),
            iat,
            exp: iat + self.max_age.as_secs() as i64,
        };
        let signed = self.codec.sign(&claims).map_err(CorrelationError::Signing)?;

        let cookie = Cookie::build((cookie_name(&relay_id), signed))
            .path(self.acs_path.clone())
            .max_age(time::Duration::seconds(self.max_age.as_secs() as i64))
            .http_only(false)
            .build();

        debug!(request_id = %request_id, "correlation cookie issued");

        Ok((relay_id, cookie))
    }

    /// Look up and consume the correlation cookie for `relay_id`.
    ///
    /// The returned jar carries the removal cookie, so the token can be used once.
    pub fn resolve(
        &self,
        jar: CookieJar,
        relay_id: &str,
    ) -> Result<(CorrelationToken, CookieJar), CorrelationError> {
        let name = cookie_name(relay_id);

        let value = match jar.get(&name) {
            Some(cookie) if !cookie.value().is_empty() => cookie.value().to_string(),
            _ => return Err(CorrelationError::NotFound { cookie: name }),
        };

        let claims = self
            .codec
            .verify::<CorrelationClaims>(&value)
            .map_err(|source| CorrelationError::Invalid {
                cookie: name.clone(),
                source,
            })?;

        let jar = jar.remove(self.removal(name));

        Ok((
            CorrelationToken {
                request_id: claims.id,
                target_uri: claims.uri,
            },
            jar,
        ))
    }

    /// Clear the correlation cookie for `relay_id` without reading it. Used when
    /// `resolve` rejected it, so a dead cookie does not count towards the cap.
    pub fn discard(&self, jar: CookieJar, relay_id: &str) -> CookieJar {
        jar.remove(self.removal(cookie_name(relay_id)))
    }

    /// Clear pending correlation cookies so that, with the one about to be issued,
    /// at most `max_pending` remain. Unverifiable cookies go first, then the oldest.
    pub fn evict_excess(&self, jar: CookieJar) -> CookieJar {
        let mut pending: Vec<(i64, String)> = jar
            .iter()
            .filter(|c| c.name().starts_with(CORRELATION_COOKIE_PREFIX))
            .map(|c| {
                let iat = self
                    .codec
                    .verify::<CorrelationClaims>(c.value())
                    .map(|claims| claims.iat)
                    .unwrap_or(i64::MIN);
                (iat, c.name().to_string())
            })
            .collect();

        let keep = self.max_pending - 1;
        if pending.len() <= keep {
            return jar;
        }

        pending.sort();
        let excess = pending.len() - keep;

        let mut jar = jar;
        for (_, name) in pending.into_iter().take(excess) {
            warn!(cookie = %name, "evicting pending correlation cookie");
            jar = jar.remove(self.removal(name));
        }
        jar
    }

    fn removal(&self, name: String) -> Cookie<'static> {
        Cookie::build((name, "")).path(self.acs_path.clone()).build()
    }
}
