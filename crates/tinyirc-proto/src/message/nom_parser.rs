//! Nom-based IRC message parser.
//!
//! Grammar (RFC 2812 section 2.3.1):
//!
//! ```text
//! message  = [ ":" prefix SPACE ] command params
//! command  = 1*letter / 3digit
//! params   = *( SPACE middle ) [ SPACE ":" trailing ]
//! middle   = nospcrlfcl *( ":" / nospcrlfcl )
//! trailing = *( ":" / " " / nospcrlfcl )
//! ```

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space1},
    error::ErrorKind,
    sequence::{preceded, terminated},
    IResult,
};
use smallvec::SmallVec;

use crate::error::MessageParseError;

/// Parse message prefix (the part after `:` and before the first space).
fn parse_prefix(input: &str) -> IResult<&str, &str> {
    terminated(preceded(char(':'), take_while1(|c| c != ' ')), space1)(input)
}

/// Parse the command name (1*letter or 3digit).
fn parse_command(input: &str) -> IResult<&str, &str> {
    let (rest, cmd) = take_while1(|c: char| c.is_ascii_alphanumeric())(input)?;

    let is_all_letters = cmd.chars().all(|c| c.is_ascii_alphabetic());
    let is_three_digits = cmd.len() == 3 && cmd.chars().all(|c| c.is_ascii_digit());

    if is_all_letters || is_three_digits {
        Ok((rest, cmd))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::AlphaNumeric,
        )))
    }
}

#[inline]
fn is_forbidden(c: char) -> bool {
    matches!(c, '\0' | '\r' | '\n')
}

/// Parse the parameter list that follows the command.
///
/// Consecutive spaces separate parameters like a single one. A parameter
/// introduced by `:` is the trailing parameter and swallows the rest of the
/// line, spaces included.
fn parse_params<'a>(
    line: &'a str,
    input: &'a str,
) -> Result<SmallVec<[&'a str; 15]>, MessageParseError> {
    let position = |rest: &str| line.len() - rest.len();
    let mut params: SmallVec<[&str; 15]> = SmallVec::new();
    let mut rest = input;

    while !rest.is_empty() {
        let trimmed = rest.trim_start_matches(' ');
        if trimmed.len() == rest.len() {
            return Err(MessageParseError::TrailingInput {
                position: position(rest),
            });
        }
        rest = trimmed;
        if rest.is_empty() {
            break;
        }

        if let Some(trailing) = rest.strip_prefix(':') {
            if trailing.contains(is_forbidden) {
                return Err(MessageParseError::InvalidParameter {
                    position: position(rest),
                });
            }
            params.push(trailing);
            break;
        }

        let end = rest.find(' ').unwrap_or(rest.len());
        let param = &rest[..end];
        if param.contains(is_forbidden) {
            return Err(MessageParseError::InvalidParameter {
                position: position(rest),
            });
        }
        params.push(param);
        rest = &rest[end..];
    }

    Ok(params)
}

/// A parsed IRC message with borrowed string slices.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedMessage<'a> {
    /// Raw prefix string (without the leading `:`), if present.
    pub prefix: Option<&'a str>,
    /// The command name, as sent.
    pub command: &'a str,
    /// Command parameters, including trailing.
    pub params: SmallVec<[&'a str; 15]>,
}

impl<'a> ParsedMessage<'a> {
    /// Parse a line with its line terminator already removed.
    pub fn parse(line: &'a str) -> Result<Self, MessageParseError> {
        if line.is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let (input, prefix) = if line.starts_with(':') {
            match parse_prefix(line) {
                Ok((rest, prefix)) => (rest, Some(prefix)),
                Err(_) => return Err(MessageParseError::InvalidPrefix(line.to_owned())),
            }
        } else {
            (line, None)
        };

        let (rest, command) =
            parse_command(input).map_err(|_| MessageParseError::InvalidCommand)?;
        let params = parse_params(line, rest)?;

        Ok(ParsedMessage {
            prefix,
            command,
            params,
        })
    }
}
