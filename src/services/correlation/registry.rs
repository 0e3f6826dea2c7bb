use std::sync::Arc;

use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use super::store::CORRELATION_COOKIE_PREFIX;
use crate::services::token::{CorrelationClaims, TokenCodec};

/// Derives the request IDs an inbound response may legitimately answer.
#[derive(Debug, Clone)]
pub struct RequestIdRegistry {
    codec: Arc<TokenCodec>,
    allow_idp_initiated: bool,
}

impl RequestIdRegistry {
    pub fn new(codec: Arc<TokenCodec>, allow_idp_initiated: bool) -> Self {
        Self {
            codec,
            allow_idp_initiated,
        }
    }

    /// Collect request IDs from every verifiable correlation cookie.
    ///
    /// Cookies that fail verification are skipped, not fatal: several login
    /// attempts may be in flight and a stale one must not block a valid one.
    /// The empty string is added when IdP-initiated logins are allowed.
    pub fn collect(&self, jar: &CookieJar) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();

        for cookie in jar.iter() {
            if !cookie.name().starts_with(CORRELATION_COOKIE_PREFIX) || cookie.value().is_empty()
            {
                continue;
            }

            match self.codec.verify::<CorrelationClaims>(cookie.value()) {
                Ok(claims) => {
                    if !ids.contains(&claims.id) {
                        ids.push(claims.id);
                    }
                }
                Err(err) => {
                    warn!(cookie = %cookie.name(), error = %err, "skipping invalid correlation cookie");
                }
            }
        }

        if self.allow_idp_initiated && !ids.iter().any(String::is_empty) {
            ids.push(String::new());
        }

        ids
    }
}
