/*!
 * Session attribute extractor
 *
 * Responsibility:
 * - Hand the attributes validated by `require_account` to handlers
 * - The type itself lives with the session manager that produces it
 */

mod core;

pub use self::core::SamlAttributesExtractor;
pub use crate::services::session::SamlAttributes;
