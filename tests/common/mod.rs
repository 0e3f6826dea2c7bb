#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, Response, header},
    routing,
};
use axum_extra::extract::cookie::Cookie;
use saml_session::api::extractors::SamlAttributesExtractor;
use saml_session::config::Config;
use saml_session::middleware::auth::{require_account, require_attribute};
use saml_session::services::provider::{
    Assertion, Attribute, AuthnRequest, Binding, InvalidResponse, ProviderError, ServiceProvider,
};
use saml_session::services::random::OsRandom;
use saml_session::state::AppState;
use url::Url;

pub const SP_KEY: &str = include_str!("../fixtures/sp_key.pem");
pub const OTHER_RSA_KEY: &str = include_str!("../fixtures/other_rsa_key.pem");

pub const IDP_SSO_URL: &str = "https://idp.example.com/sso";

/// Stand-in for the SAML engine.
///
/// A posted `SAMLResponse` of `valid:<id>` is accepted when `<id>` is among the
/// possible request IDs (empty id = IdP-initiated); anything else is rejected.
pub struct FakeProvider {
    metadata_url: Url,
    acs_url: Url,
    next_id: AtomicUsize,
    pub assertion: Assertion,
    pub seen_request_ids: Mutex<Vec<Vec<String>>>,
}

impl FakeProvider {
    pub fn new(assertion: Assertion) -> Self {
        Self {
            metadata_url: Url::parse("https://sp.example.com/saml/metadata").unwrap(),
            acs_url: Url::parse("https://sp.example.com/saml/acs").unwrap(),
            next_id: AtomicUsize::new(1),
            assertion,
            seen_request_ids: Mutex::new(Vec::new()),
        }
    }
}

struct FakeRequest {
    id: String,
    idp_url: Url,
}

impl AuthnRequest for FakeRequest {
    fn id(&self) -> &str {
        &self.id
    }

    fn redirect(&self, relay_state: &str) -> Result<Url, ProviderError> {
        let mut url = self.idp_url.clone();
        url.query_pairs_mut()
            .append_pair("SAMLRequest", &self.id)
            .append_pair("RelayState", relay_state);
        Ok(url)
    }
}

impl ServiceProvider for FakeProvider {
    fn metadata_url(&self) -> &Url {
        &self.metadata_url
    }

    fn acs_url(&self) -> &Url {
        &self.acs_url
    }

    fn max_issue_delay(&self) -> Duration {
        Duration::from_secs(90)
    }

    fn sso_binding_location(&self, binding: Binding) -> Option<Url> {
        match binding {
            Binding::HttpRedirect => Some(Url::parse(IDP_SSO_URL).unwrap()),
            Binding::HttpPost => None,
        }
    }

    fn metadata(&self) -> Result<String, ProviderError> {
        Ok("<EntityDescriptor entityID=\"https://sp.example.com/saml/metadata\"/>".to_string())
    }

    fn make_authentication_request(
        &self,
        idp_url: &Url,
    ) -> Result<Box<dyn AuthnRequest>, ProviderError> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeRequest {
            id: format!("id-{n}"),
            idp_url: idp_url.clone(),
        }))
    }

    fn parse_response(
        &self,
        form: &HashMap<String, String>,
        possible_request_ids: &[String],
    ) -> Result<Assertion, ProviderError> {
        self.seen_request_ids
            .lock()
            .unwrap()
            .push(possible_request_ids.to_vec());

        let response = form.get("SAMLResponse").cloned().unwrap_or_default();
        match response.strip_prefix("valid:") {
            Some(id) if possible_request_ids.iter().any(|p| p == id) => Ok(self.assertion.clone()),
            _ => Err(ProviderError::InvalidResponse(Box::new(InvalidResponse {
                response,
                now: chrono::Utc::now(),
                private_err: "InResponseTo does not match any pending request".into(),
            }))),
        }
    }
}

pub fn attribute(name: &str, friendly: Option<&str>, values: &[&str]) -> Attribute {
    Attribute {
        name: name.into(),
        friendly_name: friendly.map(Into::into),
        values: values.iter().map(|v| v.to_string()).collect(),
    }
}

pub fn assertion_with_roles(roles: &[&str]) -> Assertion {
    Assertion {
        attributes: vec![
            attribute("urn:oid:0.9.2342.19200300.100.1.1", Some("uid"), &["alice"]),
            attribute("role", None, roles),
        ],
    }
}

pub fn test_config() -> Config {
    Config::new("127.0.0.1:0".parse().unwrap(), SP_KEY)
}

pub fn state_with(config: &Config, provider: Arc<FakeProvider>) -> AppState {
    AppState::new(config, provider, Arc::new(OsRandom)).unwrap()
}

async fn whoami(SamlAttributesExtractor(attrs): SamlAttributesExtractor, headers: HeaderMap) -> String {
    let uid = attrs.get("uid").map(|v| v.join(",")).unwrap_or_default();
    let roles = headers
        .get_all("x-saml-role")
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect::<Vec<_>>()
        .join(",");
    format!("uid={uid};roles={roles}")
}

/// `/private` for any session, `/admin` for `role=admin`, both behind the gate.
pub fn protected_routes(state: AppState) -> Router {
    let admin = require_attribute::apply(
        Router::new().route("/admin", routing::get(|| async { "admin area" })),
        "role",
        "admin",
    );
    let app = Router::new().route("/private", routing::get(whoami)).merge(admin);
    require_account::apply(app, state)
}

pub fn set_cookies<B>(response: &Response<B>) -> Vec<Cookie<'static>> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| Cookie::parse(v.to_str().unwrap().to_string()).unwrap())
        .collect()
}

pub fn location<B>(response: &Response<B>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .unwrap()
        .to_string()
}

pub fn cookie_header(cookies: &[&Cookie<'_>]) -> String {
    cookies
        .iter()
        .map(|c| format!("{}={}", c.name(), c.value()))
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_acs(form: &[(&str, &str)], cookie: Option<&str>) -> Request<Body> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form.iter())
        .finish();
    let mut builder = Request::builder()
        .method("POST")
        .uri("/saml/acs")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The RelayState the gate put into the IdP redirect.
pub fn relay_state_of(idp_redirect: &str) -> String {
    Url::parse(idp_redirect)
        .unwrap()
        .query_pairs()
        .find(|(k, _)| k == "RelayState")
        .map(|(_, v)| v.into_owned())
        .expect("RelayState in redirect")
}
