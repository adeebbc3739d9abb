//! Cross-cutting HTTP middleware. Authentication-specific layers live
//! in `crate::auth::middleware`.

pub mod logging;

pub use logging::request_logging;
