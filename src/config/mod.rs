//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, MotdConfig)
//! - [`listen`]: Network listener configuration
//! - [`limits`]: Protocol limits (line length, channels per user)
//! - [`channels`]: Predeclared channel blocks
//! - [`validation`]: Startup sanity checks

mod channels;
mod limits;
mod listen;
mod types;
mod validation;

pub use channels::ChannelBlock;
pub use limits::LimitsConfig;
pub use listen::ListenConfig;
pub use types::{Config, ConfigError, IdleTimeoutsConfig, MotdConfig, ServerConfig};
pub use validation::{ValidationError, validate};
