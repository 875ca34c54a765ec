//! IRC message codec for tokio.
//!
//! Wraps [`LineCodec`] and converts lines to and from [`Message`] values.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, MessageParseError, ProtocolError};
use crate::line::LineCodec;
use crate::message::Message;

/// Tokio codec for encoding/decoding IRC messages.
///
/// Empty lines are skipped. A line that does not match the grammar is
/// returned as [`ProtocolError::InvalidMessage`]; framed streams stop after
/// an error, so servers that must survive bad input should read with
/// [`LineCodec`] and call [`Message::parse`] themselves.
#[derive(Debug, Default)]
pub struct IrcCodec {
    inner: LineCodec,
}

impl IrcCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LineCodec::with_max_len(max_len),
        }
    }
}

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Message>> {
        while let Some(line) = self.inner.decode(src)? {
            match Message::parse(&line) {
                Ok(msg) => return Ok(Some(msg)),
                Err(MessageParseError::EmptyMessage) => continue,
                Err(cause) => {
                    return Err(ProtocolError::InvalidMessage {
                        string: line,
                        cause,
                    })
                }
            }
        }
        Ok(None)
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> error::Result<()> {
        let line = msg.to_line().map_err(|cause| ProtocolError::Serialize {
            command: msg.command.clone(),
            cause,
        })?;
        self.inner.encode(line, dst)
    }
}
