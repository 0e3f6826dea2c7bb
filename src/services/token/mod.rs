pub mod claims;
pub mod codec;

pub use claims::{CorrelationClaims, SessionClaims};
pub use codec::{KeyFamily, TokenCodec, TokenError};
