//! Injectable source of cryptographically secure random bytes.
//!
//! Production code uses [`OsRandom`]. Tests can swap in a deterministic source
//! through the same trait without touching the callers.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;

/// Number of random bytes behind a relay identifier.
///
/// 42 bytes encode to exactly 56 base64 characters (no padding), which keeps the
/// RelayState parameter inside its 80 byte budget.
pub const RELAY_ID_BYTES: usize = 42;

#[derive(Debug, thiserror::Error)]
#[error("random source failure: {0}")]
pub struct RandomError(pub String);

pub trait RandomSource: Send + Sync {
    fn fill(&self, buf: &mut [u8]) -> Result<(), RandomError>;
}

/// Operating-system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<(), RandomError> {
        getrandom::fill(buf).map_err(|e| RandomError(e.to_string()))
    }
}

/// Draw a fresh relay identifier (URL-safe base64 of [`RELAY_ID_BYTES`] bytes).
pub fn relay_identifier(random: &dyn RandomSource) -> Result<String, RandomError> {
    let mut bytes = [0u8; RELAY_ID_BYTES];
    random.fill(&mut bytes)?;
    Ok(URL_SAFE.encode(bytes))
}
