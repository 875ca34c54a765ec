//! Protocol limits configuration.

use serde::Deserialize;

/// Protocol limits configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum inbound line length in bytes, CRLF included (default: 512).
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    /// Channels a single user may be in at once (default: 20).
    #[serde(default = "default_max_channels_per_user")]
    pub max_channels_per_user: usize,
    /// Channel actor mailbox capacity (default: 256).
    #[serde(default = "default_channel_mailbox_capacity")]
    pub channel_mailbox_capacity: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_length: default_max_line_length(),
            max_channels_per_user: default_max_channels_per_user(),
            channel_mailbox_capacity: default_channel_mailbox_capacity(),
        }
    }
}

fn default_max_line_length() -> usize {
    512
}

fn default_max_channels_per_user() -> usize {
    20
}

fn default_channel_mailbox_capacity() -> usize {
    256
}
