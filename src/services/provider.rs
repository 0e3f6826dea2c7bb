//! Boundary to the external SAML service-provider engine.
//!
//! XML parsing, signature verification and metadata generation all live behind
//! this trait. The session layer only correlates requests and issues cookies.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use url::Url;

/// SAML binding used to reach the IdP's single sign-on service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    HttpRedirect,
    HttpPost,
}

/// One `<Attribute>` from the assertion's attribute statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub friendly_name: Option<String>,
    pub values: Vec<String>,
}

impl Attribute {
    /// Claim name: the friendly name when present, otherwise the raw name.
    pub fn claim_name(&self) -> &str {
        match self.friendly_name.as_deref() {
            Some(friendly) if !friendly.is_empty() => friendly,
            _ => &self.name,
        }
    }
}

/// A validated assertion as handed back by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assertion {
    pub attributes: Vec<Attribute>,
}

/// Diagnostics the engine attaches to a rejected response.
///
/// Logged for operators, never sent to the client.
#[derive(Debug, Clone)]
pub struct InvalidResponse {
    pub response: String,
    pub now: DateTime<Utc>,
    pub private_err: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("invalid SAML response")]
    InvalidResponse(Box<InvalidResponse>),
    #[error("cannot build authentication request: {0}")]
    Request(String),
    #[error("cannot render metadata: {0}")]
    Metadata(String),
    #[error("no single sign-on location for {0:?}")]
    NoBindingLocation(Binding),
}

/// An outgoing authentication request.
pub trait AuthnRequest: Send {
    fn id(&self) -> &str;

    /// IdP URL carrying the encoded request and `relay_state`.
    fn redirect(&self, relay_state: &str) -> Result<Url, ProviderError>;
}

pub trait ServiceProvider: Send + Sync {
    fn metadata_url(&self) -> &Url;

    fn acs_url(&self) -> &Url;

    /// Longest accepted delay between issuing a request and receiving the response.
    fn max_issue_delay(&self) -> Duration;

    fn sso_binding_location(&self, binding: Binding) -> Option<Url>;

    /// Serialized SP metadata document.
    fn metadata(&self) -> Result<String, ProviderError>;

    fn make_authentication_request(
        &self,
        idp_url: &Url,
    ) -> Result<Box<dyn AuthnRequest>, ProviderError>;

    /// Validate the posted response. `possible_request_ids` lists every request ID
    /// the response may answer; matching `InResponseTo` is the engine's job.
    fn parse_response(
        &self,
        form: &HashMap<String, String>,
        possible_request_ids: &[String],
    ) -> Result<Assertion, ProviderError>;
}
