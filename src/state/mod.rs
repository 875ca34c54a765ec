//! State management module.
//!
//! Contains the per-connection [`Session`], the directory contracts it
//! talks to, and the shared [`Matrix`].

mod directory;
mod latch;
mod matrix;
pub mod memory;
mod outbound;
mod session;
mod uid;

#[cfg(test)]
pub(crate) mod test_support;

pub use directory::{Channel, ChannelDirectory, User, UserDirectory};
pub use matrix::{Matrix, ServerInfo};
pub use outbound::NickCell;
pub use session::{MAILBOX_CAPACITY, Mailbox, RegistrationData, Session, Task};
pub use uid::Uid;
