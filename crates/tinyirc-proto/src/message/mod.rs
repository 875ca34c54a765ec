//! IRC message type, parsing and serialization.

mod nom_parser;
mod serialize;

use std::str::FromStr;

use crate::error::MessageParseError;
use crate::prefix::Prefix;

use self::nom_parser::ParsedMessage;

/// A single IRC protocol line in structured form.
///
/// At most one parameter may be empty, contain a space or start with `:`,
/// and it must be the last one; [`Message::to_line`] enforces this.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Message origin, if any.
    pub prefix: Option<Prefix>,
    /// Command verb or three-digit numeric, as sent.
    pub command: String,
    /// Positional parameters, trailing parameter included.
    pub params: Vec<String>,
}

impl Message {
    /// Create a message without a prefix.
    pub fn new(command: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            prefix: None,
            command: command.into(),
            params,
        }
    }

    /// Attach a prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Parse a single line. A trailing `\r\n` or `\n` is ignored.
    ///
    /// Empty lines yield [`MessageParseError::EmptyMessage`], which callers
    /// usually discard without comment.
    pub fn parse(line: &str) -> Result<Self, MessageParseError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let parsed = ParsedMessage::parse(line)?;

        let prefix = parsed.prefix.map(Prefix::parse).transpose()?;

        Ok(Self {
            prefix,
            command: parsed.command.to_owned(),
            params: parsed.params.iter().map(|p| (*p).to_owned()).collect(),
        })
    }

    /// Parameter at `index`, if present.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// `PING <origin>`
    pub fn ping(origin: impl Into<String>) -> Self {
        Self::new("PING", vec![origin.into()])
    }

    /// `PONG <server> <origin>`
    pub fn pong(server: impl Into<String>, origin: impl Into<String>) -> Self {
        Self::new("PONG", vec![server.into(), origin.into()])
    }

    /// `ERROR :<reason>`
    pub fn error(reason: impl Into<String>) -> Self {
        Self::new("ERROR", vec![reason.into()])
    }
}

impl FromStr for Message {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Message::parse(s)
    }
}
