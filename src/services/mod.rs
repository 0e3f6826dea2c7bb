pub mod correlation;
pub mod provider;
pub mod random;
pub mod session;
pub mod token;
