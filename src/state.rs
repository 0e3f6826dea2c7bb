/*
 * Responsibility
 * - Shared context attached to the router (AppState)
 * - Clone is cheap: every service sits behind an Arc and is read-only after startup
 */
use std::sync::Arc;

use crate::config::Config;
use crate::services::correlation::{CorrelationStore, RequestIdRegistry};
use crate::services::provider::ServiceProvider;
use crate::services::random::RandomSource;
use crate::services::session::SessionManager;
use crate::services::token::{TokenCodec, TokenError};

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn ServiceProvider>,
    pub correlation: Arc<CorrelationStore>,
    pub registry: Arc<RequestIdRegistry>,
    pub sessions: Arc<SessionManager>,
    pub metadata_path: Arc<str>,
    pub acs_path: Arc<str>,
    pub default_redirect_uri: Arc<str>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("metadata_path", &self.metadata_path)
            .field("acs_path", &self.acs_path)
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire the session layer around `provider`, signing with the configured SP key.
    pub fn new(
        config: &Config,
        provider: Arc<dyn ServiceProvider>,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self, TokenError> {
        let codec = Arc::new(
            TokenCodec::from_private_key_pem(&config.sp_private_key_pem)?
                .with_leeway(config.token_leeway_seconds),
        );

        let metadata_path: Arc<str> = provider.metadata_url().path().into();
        let acs_path: Arc<str> = provider.acs_url().path().into();

        let correlation = CorrelationStore::new(
            Arc::clone(&codec),
            random,
            acs_path.to_string(),
            provider.max_issue_delay(),
            config.max_pending_logins,
        );
        let registry = RequestIdRegistry::new(Arc::clone(&codec), config.allow_idp_initiated);
        let sessions = SessionManager::new(codec, config.session_lifetime);

        Ok(Self {
            provider,
            correlation: Arc::new(correlation),
            registry: Arc::new(registry),
            sessions: Arc::new(sessions),
            metadata_path,
            acs_path,
            default_redirect_uri: config.default_redirect_uri.as_str().into(),
        })
    }
}
