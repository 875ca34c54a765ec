//! Core handler infrastructure: the handler trait and the registry that
//! routes inbound messages to handlers.

pub mod registry;
pub mod traits;

pub use registry::{Registry, settle};
pub use traits::Handler;
