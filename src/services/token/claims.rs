use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Claims carried by the `saml_<relay>` cookie.
///
/// An empty `id` is the IdP-initiated sentinel and never produced by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationClaims {
    pub id: String,
    pub uri: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by the session cookie.
///
/// Attributes live under their own key so an assertion attribute named `exp`
/// cannot collide with the expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub attrs: BTreeMap<String, Vec<String>>,
    pub iat: i64,
    pub exp: i64,
}
