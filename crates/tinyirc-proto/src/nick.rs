//! Nickname validation utilities.
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format (nickname definition)

/// Extension trait for checking if a string is a valid IRC nickname.
pub trait NickExt {
    /// Check if this string is a valid IRC nickname per RFC 2812.
    ///
    /// - First character: letter or one of `[\]^_`{|}`
    /// - Subsequent characters: letter, digit, special or hyphen
    /// - At most [`DEFAULT_NICK_MAX_LEN`] characters
    ///
    /// ```
    /// use tinyirc_proto::NickExt;
    ///
    /// assert!("nick".is_valid_nick());
    /// assert!("[cool]".is_valid_nick());
    /// assert!(!"123nick".is_valid_nick());
    /// assert!(!"nick name".is_valid_nick());
    /// ```
    fn is_valid_nick(&self) -> bool;

    /// Same as [`is_valid_nick`](NickExt::is_valid_nick) with a custom length limit.
    fn is_valid_nick_len(&self, max_len: usize) -> bool;
}

/// Default maximum nickname length.
pub const DEFAULT_NICK_MAX_LEN: usize = 30;

#[inline]
fn is_special(c: char) -> bool {
    matches!(c, '[' | ']' | '\\' | '`' | '_' | '^' | '{' | '|' | '}')
}

impl NickExt for str {
    fn is_valid_nick(&self) -> bool {
        self.is_valid_nick_len(DEFAULT_NICK_MAX_LEN)
    }

    fn is_valid_nick_len(&self, max_len: usize) -> bool {
        if self.is_empty() || self.len() > max_len {
            return false;
        }

        let mut chars = self.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || is_special(first) => {}
            _ => return false,
        }

        chars.all(|c| c.is_ascii_alphanumeric() || is_special(c) || c == '-')
    }
}

impl NickExt for String {
    fn is_valid_nick(&self) -> bool {
        self.as_str().is_valid_nick()
    }

    fn is_valid_nick_len(&self, max_len: usize) -> bool {
        self.as_str().is_valid_nick_len(max_len)
    }
}
