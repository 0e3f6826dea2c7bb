pub mod registry;
pub mod store;

pub use registry::RequestIdRegistry;
pub use store::{
    CORRELATION_COOKIE_PREFIX, CorrelationError, CorrelationStore, CorrelationToken, cookie_name,
};
