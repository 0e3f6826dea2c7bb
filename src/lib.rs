//! Session and state-correlation layer between a web application and a SAML
//! service-provider engine.
//!
//! The engine (behind [`services::provider::ServiceProvider`]) parses and
//! verifies SAML. This crate correlates outgoing authentication requests with
//! incoming assertions through signed `saml_<relay>` cookies, turns validated
//! assertions into a signed `token` session cookie, and re-validates that cookie
//! on every request, projecting its attributes as `X-Saml-*` headers.
//! No server-side session store is involved.
//!
//! ```ignore
//! saml_session::app::run(provider, |state| {
//!     let admin = require_attribute::apply(admin_routes(), "role", "admin");
//!     require_account::apply(public_routes().merge(admin), state)
//! })
//! .await
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
