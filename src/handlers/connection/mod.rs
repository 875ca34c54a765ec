//! Connection registration and liveness handlers.
//!
//! Handles NICK, USER, PING, PONG and QUIT, plus the idle/disconnect hooks
//! the connection loop calls into.

mod liveness;
mod nick;
mod ping;
mod quit;
mod user;
mod welcome;

pub use liveness::{on_disconnect, on_idle, quit};
pub use nick::NickHandler;
pub use ping::{PingHandler, PongHandler};
pub use quit::QuitHandler;
pub use user::UserHandler;
