//! IRC command handlers.
//!
//! This module contains the Handler trait and command registry for dispatching
//! incoming IRC messages to appropriate handlers.
//!
//! Handlers are synchronous and run on the owning connection's task. Work
//! that has to wait on a directory is handed to
//! [`Session::enqueue`](crate::state::Session::enqueue).

mod channel;
mod connection;
pub mod core;

pub use connection::{on_disconnect, on_idle, quit};
pub use self::core::{Handler, Registry, settle};

