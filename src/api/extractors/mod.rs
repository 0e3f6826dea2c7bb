pub mod saml_attributes;

pub use saml_attributes::{SamlAttributes, SamlAttributesExtractor};
