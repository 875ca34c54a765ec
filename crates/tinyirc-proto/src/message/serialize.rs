use crate::error::SerializeError;

use super::Message;

#[inline]
fn needs_trailing(param: &str) -> bool {
    param.is_empty() || param.contains(' ') || param.starts_with(':')
}

impl Message {
    /// Serialize to a wire line without the `\r\n` terminator.
    ///
    /// A parameter that is empty, contains a space or starts with `:` is
    /// emitted as the trailing parameter (`" :" + param`). If such a
    /// parameter is not the last one the message cannot be expressed
    /// unambiguously and [`SerializeError::TrailingNotLast`] is returned.
    pub fn to_line(&self) -> Result<String, SerializeError> {
        if self.command.is_empty() || self.command.contains([' ', '\0', '\r', '\n']) {
            return Err(SerializeError::InvalidCommand(self.command.clone()));
        }

        let mut line = String::with_capacity(
            self.command.len() + self.params.iter().map(|p| p.len() + 2).sum::<usize>() + 64,
        );

        if let Some(prefix) = &self.prefix {
            let prefix = prefix.to_string();
            if !prefix.is_empty() {
                line.push(':');
                line.push_str(&prefix);
                line.push(' ');
            }
        }
        line.push_str(&self.command);

        let last = self.params.len().saturating_sub(1);
        for (index, param) in self.params.iter().enumerate() {
            if param.contains(['\0', '\r', '\n']) {
                return Err(SerializeError::IllegalCharacter { index });
            }
            if needs_trailing(param) {
                if index != last {
                    return Err(SerializeError::TrailingNotLast {
                        index,
                        param: param.clone(),
                    });
                }
                line.push_str(" :");
            } else {
                line.push(' ');
            }
            line.push_str(param);
        }

        Ok(line)
    }
}
