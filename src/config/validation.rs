//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;
use tinyirc_proto::ChannelExt;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("server.name must not contain spaces: '{0}'")]
    InvalidServerName(String),
    #[error("server.network is required")]
    MissingNetworkName,
    #[error("server.idle_timeouts.{0} must be greater than zero")]
    ZeroIdleTimeout(&'static str),
    #[error("limits.max_line_length must be at least 16, got {0}")]
    LineLengthTooSmall(usize),
    #[error("channel name is invalid: '{0}'")]
    InvalidChannelName(String),
    #[error("channel '{0}' is declared more than once")]
    DuplicateChannel(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let name = &config.server.name;
    if name.is_empty() {
        errors.push(ValidationError::MissingServerName);
    } else if name.contains(char::is_whitespace) {
        errors.push(ValidationError::InvalidServerName(name.clone()));
    }
    if config.server.network.is_empty() {
        errors.push(ValidationError::MissingNetworkName);
    }

    if config.server.idle_timeouts.ping == 0 {
        errors.push(ValidationError::ZeroIdleTimeout("ping"));
    }
    if config.server.idle_timeouts.timeout == 0 {
        errors.push(ValidationError::ZeroIdleTimeout("timeout"));
    }

    if config.limits.max_line_length < 16 {
        errors.push(ValidationError::LineLengthTooSmall(
            config.limits.max_line_length,
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for block in &config.channels {
        if !block.name.is_channel_name() {
            errors.push(ValidationError::InvalidChannelName(block.name.clone()));
        } else if !seen.insert(tinyirc_proto::irc_to_lower(&block.name)) {
            errors.push(ValidationError::DuplicateChannel(block.name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
