//! Network module.
//!
//! Contains the Gateway (TCP listener), the per-client Connection task and
//! client hostname resolution.

mod connection;
mod gateway;
mod resolve;

pub use gateway::Gateway;
