//! In-memory directory backends used by the standalone server.

mod channels;
mod users;

pub use channels::{MemoryChannel, MemoryChannels};
pub use users::MemoryUsers;
