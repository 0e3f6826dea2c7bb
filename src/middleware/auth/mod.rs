pub mod require_account;
pub mod require_attribute;
