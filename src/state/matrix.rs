//! The Matrix - shared server state reachable from every connection.

use std::sync::Arc;

use super::directory::{ChannelDirectory, UserDirectory};
use super::memory::{MemoryChannels, MemoryUsers};
use super::uid::UidGenerator;
use crate::config::Config;

/// This server's identity information.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub network: String,
    pub motd: Vec<String>,
}

/// Shared state: server identity and the directories.
///
/// Either directory may be absent. Without a user directory no nick is
/// ever in use; without a channel directory every channel is unknown.
pub struct Matrix {
    pub server: ServerInfo,
    pub users: Option<Arc<dyn UserDirectory>>,
    pub channels: Option<Arc<dyn ChannelDirectory>>,
    pub uid_gen: UidGenerator,
}

impl Matrix {
    /// Build the standalone server state with in-memory directories.
    pub fn new(config: &Config) -> Self {
        let channels = MemoryChannels::new(&config.limits);
        for block in &config.channels {
            channels.declare(block);
        }
        let users = MemoryUsers::new(channels.clone());

        Self {
            server: ServerInfo {
                name: config.server.name.clone(),
                network: config.server.network.clone(),
                motd: config.motd.load_lines(),
            },
            users: Some(Arc::new(users)),
            channels: Some(Arc::new(channels)),
            uid_gen: UidGenerator::new(config.server.sid.clone()),
        }
    }

    pub fn with_directories(
        server: ServerInfo,
        users: Option<Arc<dyn UserDirectory>>,
        channels: Option<Arc<dyn ChannelDirectory>>,
    ) -> Self {
        Self {
            server,
            users,
            channels,
            uid_gen: UidGenerator::new("001"),
        }
    }

    /// Registered users, for the LUSER block. Counts only this connection
    /// when there is no user directory.
    pub fn user_count(&self) -> usize {
        self.users.as_ref().map_or(1, |users| users.user_count())
    }
}
