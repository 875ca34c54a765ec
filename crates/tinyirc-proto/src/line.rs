//! Line-based codec for tokio.
//!
//! Splits a byte stream into `\n`-terminated lines (an optional `\r` is
//! stripped) and writes lines back with `\r\n`.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::error;

/// RFC 1459 line limit, terminator included.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 512;

/// Line-based codec that handles newline-terminated messages.
///
/// Lines longer than `max_len` bytes are discarded up to the next newline
/// instead of being buffered, so a peer cannot grow the read buffer without
/// bound. Invalid UTF-8 is replaced rather than rejected; the message
/// grammar decides what to do with it.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
    /// Skipping the remainder of an over-long line
    discarding: bool,
}

impl LineCodec {
    /// Create a codec with the default 512 byte limit.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LENGTH)
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }

    /// Maximum accepted line length in bytes.
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if self.discarding {
                    src.advance(src.len());
                    self.next_index = 0;
                } else if src.len() > self.max_len {
                    warn!(limit = self.max_len, "Discarding over-long line");
                    self.discarding = true;
                    src.advance(src.len());
                    self.next_index = 0;
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if line.len() > self.max_len {
                warn!(
                    actual = line.len(),
                    limit = self.max_len,
                    "Discarding over-long line"
                );
                continue;
            }

            let text = String::from_utf8_lossy(&line);
            return Ok(Some(text.trim_end_matches(['\r', '\n']).to_owned()));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        let line = self.decode(src)?;
        if line.is_none() {
            // unterminated tail at EOF is not a line
            src.advance(src.len());
            self.next_index = 0;
        }
        Ok(line)
    }
}

impl Encoder<String> for LineCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> error::Result<()> {
        dst.reserve(line.len() + 2);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}
