/*
 * Responsibility
 * - auth: session gate (require_account) and attribute gate (require_attribute)
 * - http: cross-cutting transport layers
 */
pub mod auth;
pub mod http;
