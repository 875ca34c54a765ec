//! IRC case-mapping and mask matching.
//!
//! IRC compares nicknames and channel names case-insensitively with the
//! `rfc1459` mapping, where `[]\~` are the uppercase forms of `{}|^`.

/// Convert a single character to IRC lowercase using RFC 1459 case mapping.
#[inline]
pub const fn irc_lower_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => (c as u8 + 32) as char,
        _ => c,
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(irc_lower_char).collect()
}

/// Compare two strings using IRC case-insensitive comparison.
pub fn irc_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.chars()
        .zip(b.chars())
        .all(|(ca, cb)| irc_lower_char(ca) == irc_lower_char(cb))
}

/// Match `text` against a `*`/`?` wildcard pattern, case-insensitively.
///
/// Used for `nick!user@host` ban and invite masks.
///
/// ```
/// use tinyirc_proto::casemap::matches_mask;
///
/// assert!(matches_mask("*!*@*.example.com", "nick!~user@host.EXAMPLE.com"));
/// assert!(matches_mask("bad[user]!*@*", "BAD{USER}!~u@h"));
/// assert!(!matches_mask("*!admin@*", "nick!~user@host"));
/// ```
pub fn matches_mask(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().map(irc_lower_char).collect();
    let text: Vec<char> = text.chars().map(irc_lower_char).collect();

    let mut p = 0;
    let mut t = 0;
    let mut star_p = None;
    let mut star_t = 0;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star_p = Some(p);
            star_t = t;
            p += 1;
        } else if let Some(sp) = star_p {
            // backtrack: let the last '*' swallow one more character
            p = sp + 1;
            star_t += 1;
            t = star_t;
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }

    p == pattern.len()
}
