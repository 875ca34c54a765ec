//! # tinyirc-proto
//!
//! Parsing and serialization of IRC (RFC 1459/2812) protocol lines for
//! the tinyircd server.
//!
//! ## Features
//!
//! - Strict message grammar: optional prefix, alphabetic or three-digit
//!   command, middle parameters and a single trailing parameter
//! - Fallible serialization that refuses to emit ambiguous lines
//! - Numeric reply codes and late-bound numeric replies
//! - RFC 1459 case mapping, nickname and channel-name validation
//! - Optional Tokio codecs for line framing
//!
//! ## Quick Start
//!
//! ```rust
//! use tinyirc_proto::{Message, Prefix};
//!
//! let msg = Message::parse(":alice!~a@host JOIN #rust").unwrap();
//! assert_eq!(msg.command, "JOIN");
//! assert_eq!(msg.params, vec!["#rust".to_string()]);
//!
//! let reply = Message::new("PRIVMSG", vec!["#rust".into(), "hello world".into()])
//!     .with_prefix(Prefix::new("alice", "~a", "host"));
//! assert_eq!(reply.to_line().unwrap(), ":alice!~a@host PRIVMSG #rust :hello world");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod casemap;
pub mod chan;
pub mod error;
#[cfg(feature = "tokio")]
pub mod irc;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod nick;
pub mod prefix;
pub mod response;

pub use self::casemap::{irc_eq, irc_to_lower};
pub use self::chan::ChannelExt;
pub use self::error::{MessageParseError, ProtocolError, SerializeError};
#[cfg(feature = "tokio")]
pub use self::irc::IrcCodec;
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::message::Message;
pub use self::nick::NickExt;
pub use self::prefix::Prefix;
pub use self::response::{Numeric, Response};
