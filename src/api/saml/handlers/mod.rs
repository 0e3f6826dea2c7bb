pub mod acs;
pub mod metadata;
