//! IRC message prefix types.
//!
//! A prefix identifies the origin of a message: either a server host or a
//! `nick[!user][@host]` mask.
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format

use std::fmt;
use std::str::FromStr;

use crate::error::MessageParseError;
use crate::nick::NickExt;

/// IRC message prefix - identifies the origin of a message.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Prefix {
    /// Server name (e.g., "irc.example.com")
    ServerName(String),
    /// User prefix: (nickname, username, hostname). Empty components are omitted on the wire.
    Nickname(String, String, String),
}

impl Prefix {
    /// Create a new user prefix from nick, user, and host components.
    ///
    /// ```
    /// use tinyirc_proto::Prefix;
    ///
    /// let prefix = Prefix::new("nick", "~user", "host.example.com");
    /// assert_eq!(prefix.to_string(), "nick!~user@host.example.com");
    /// ```
    pub fn new(nick: impl Into<String>, user: impl Into<String>, host: impl Into<String>) -> Self {
        Prefix::Nickname(nick.into(), user.into(), host.into())
    }

    /// Parse and validate a prefix (without the leading `:`).
    ///
    /// A bare word that is both a valid host and a valid nick is read as a
    /// nick; anything containing a dot (or a bracketed IPv6 literal) with no
    /// `!`/`@` is a server name.
    pub fn parse(s: &str) -> Result<Self, MessageParseError> {
        let invalid = || MessageParseError::InvalidPrefix(s.to_owned());

        if !s.contains(['!', '@']) {
            if s.is_valid_nick() {
                return Ok(Prefix::Nickname(s.to_owned(), String::new(), String::new()));
            }
            if is_host(s) {
                return Ok(Prefix::ServerName(s.to_owned()));
            }
            return Err(invalid());
        }

        let (before_host, host) = match s.split_once('@') {
            Some((left, host)) => (left, host),
            None => (s, ""),
        };
        let (nick, user) = match before_host.split_once('!') {
            Some((nick, user)) => (nick, user),
            None => (before_host, ""),
        };

        if !nick.is_valid_nick() {
            return Err(invalid());
        }
        if user.contains(['@', '\0', '\r', '\n']) {
            return Err(invalid());
        }
        if s.contains('@') && !is_host(host) {
            return Err(invalid());
        }

        Ok(Prefix::Nickname(
            nick.to_owned(),
            user.to_owned(),
            host.to_owned(),
        ))
    }

    /// Get the nickname if this is a user prefix.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(nick, _, _) if !nick.is_empty() => Some(nick),
            _ => None,
        }
    }

    /// Get the username if this is a user prefix.
    pub fn user(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(_, user, _) if !user.is_empty() => Some(user),
            _ => None,
        }
    }

    /// Get the hostname.
    pub fn host(&self) -> Option<&str> {
        match self {
            Prefix::ServerName(name) => Some(name),
            Prefix::Nickname(_, _, host) if !host.is_empty() => Some(host),
            _ => None,
        }
    }

    /// The name a prefix is compared against: the nick, or the whole server name.
    pub fn name(&self) -> &str {
        match self {
            Prefix::ServerName(name) => name,
            Prefix::Nickname(nick, _, _) => nick,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => write!(f, "{}", name),
            Prefix::Nickname(name, user, host) => match (&name[..], &user[..], &host[..]) {
                (name, "", "") => write!(f, "{}", name),
                (name, user, "") => write!(f, "{}!{}", name, user),
                (name, "", host) => write!(f, "{}@{}", name, host),
                (name, user, host) => write!(f, "{}!{}@{}", name, user, host),
            },
        }
    }
}

impl FromStr for Prefix {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Prefix::parse(s)
    }
}

/// Host grammar: DNS hostname, dotted IPv4, or bracketed IPv6.
pub fn is_host(s: &str) -> bool {
    is_hostname(s) || is_ipv4(s) || is_bracketed_ipv6(s)
}

fn is_hostname(s: &str) -> bool {
    let labels: Vec<&str> = s.split('.').collect();
    let Some((last, rest)) = labels.split_last() else {
        return false;
    };

    let label_ok = |label: &str| {
        let bytes = label.as_bytes();
        !bytes.is_empty()
            && bytes[0].is_ascii_alphanumeric()
            && bytes[bytes.len() - 1].is_ascii_alphanumeric()
            && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
    };

    rest.iter().all(|l| label_ok(l))
        && label_ok(last)
        && last.as_bytes()[0].is_ascii_alphabetic()
}

fn is_ipv4(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    parts.len() == 4
        && parts
            .iter()
            .all(|p| (1..=3).contains(&p.len()) && p.bytes().all(|b| b.is_ascii_digit()))
}

fn is_bracketed_ipv6(s: &str) -> bool {
    let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) else {
        return false;
    };
    inner.contains(':')
        && inner
            .chars()
            .all(|c| c.is_ascii_hexdigit() || c == ':' || c == '.')
}
