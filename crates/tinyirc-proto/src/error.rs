//! Error types for the IRC protocol library.
//!
//! This module defines error types for transport-level failures,
//! message parsing failures and serialization refusals.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors raised by the codecs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse an IRC message.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The invalid message string.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },

    /// A message could not be turned into an unambiguous wire line.
    #[error("cannot serialize {command}: {cause}")]
    Serialize {
        /// Command of the offending message.
        command: String,
        /// The underlying serialization error.
        #[source]
        cause: SerializeError,
    },
}

/// Errors encountered when parsing IRC messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Message was empty.
    #[error("empty message")]
    EmptyMessage,

    /// Prefix did not match the host or nick mask grammar.
    #[error("invalid prefix: {0}")]
    InvalidPrefix(String),

    /// Command was invalid or missing.
    #[error("invalid command")]
    InvalidCommand,

    /// A middle or trailing parameter contained a forbidden character.
    #[error("invalid parameter at byte {position}")]
    InvalidParameter {
        /// Byte offset of the offending parameter within the line.
        position: usize,
    },

    /// Input remained after the message grammar was exhausted.
    #[error("unexpected trailing input at byte {position}")]
    TrailingInput {
        /// Byte offset where the unparsed input starts.
        position: usize,
    },
}

/// Errors raised when a [`Message`](crate::Message) violates the trailing
/// parameter rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SerializeError {
    /// An empty, space-containing or colon-led parameter was not the last one.
    #[error("parameter {index} ({param:?}) must be the last parameter")]
    TrailingNotLast {
        /// Index of the offending parameter.
        index: usize,
        /// The offending parameter.
        param: String,
    },

    /// A parameter contained NUL, CR or LF.
    #[error("parameter {index} contains a line terminator or NUL")]
    IllegalCharacter {
        /// Index of the offending parameter.
        index: usize,
    },

    /// The command was empty or contained a space.
    #[error("invalid command {0:?}")]
    InvalidCommand(String),
}
