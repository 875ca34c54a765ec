//! Channel name utilities.
//!
//! # Reference
//! - RFC 2812 Section 1.3: Channel names

/// Maximum channel name length, prefix included.
pub const MAX_CHANNEL_LEN: usize = 50;

/// Extension trait for checking if a string is a valid IRC channel name.
pub trait ChannelExt {
    /// Check if this string is a valid IRC channel name.
    ///
    /// Valid channel names start with `#`, `&`, `+` or `!`, contain no
    /// space, comma, BEL or other control characters, and are at most
    /// fifty characters long.
    fn is_channel_name(&self) -> bool;
}

impl ChannelExt for str {
    fn is_channel_name(&self) -> bool {
        let mut chars = self.chars();

        match chars.next() {
            Some('#' | '&' | '+' | '!') => {}
            _ => return false,
        }

        if self.chars().count() > MAX_CHANNEL_LEN {
            return false;
        }

        chars.all(|c| c != ' ' && c != ',' && !c.is_control())
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }
}
