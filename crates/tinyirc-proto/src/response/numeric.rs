use crate::message::Message;
use crate::prefix::Prefix;

use super::Response;

/// Target used when the recipient has no nick yet.
pub const WILDCARD_TARGET: &str = "*";

/// A numeric reply whose target has not been chosen yet.
///
/// IRC numerics always carry the recipient's nick as their first parameter.
/// That nick may change between building a reply and writing it, so the
/// target is supplied in [`Numeric::bind`] at write time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Numeric {
    /// Numeric code.
    pub response: Response,
    /// Parameters after the target.
    pub params: Vec<String>,
}

impl Numeric {
    /// Build a reply from a code and its parameters (target excluded).
    pub fn new(response: Response, params: Vec<String>) -> Self {
        Self { response, params }
    }

    /// Produce the wire message with `target` as first parameter, or `*`
    /// when there is none.
    pub fn bind(self, prefix: Option<Prefix>, target: Option<&str>) -> Message {
        let mut params = Vec::with_capacity(self.params.len() + 1);
        params.push(target.unwrap_or(WILDCARD_TARGET).to_owned());
        params.extend(self.params);

        Message {
            prefix,
            command: self.response.to_string(),
            params,
        }
    }
}
