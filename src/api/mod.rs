pub mod extractors;
pub(crate) mod redirect;
pub mod saml;
