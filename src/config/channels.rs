//! Predeclared channel configuration.

use serde::Deserialize;

/// A `[[channel]]` block. Predeclared channels exist from startup and are
/// never removed when they empty out.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelBlock {
    pub name: String,
    pub topic: Option<String>,
    /// Join key (`+k`).
    pub key: Option<String>,
    /// Member limit (`+l`).
    pub limit: Option<usize>,
    /// Invite-only (`+i`); users matching `invite_masks` may still join.
    #[serde(default)]
    pub invite_only: bool,
    #[serde(default)]
    pub invite_masks: Vec<String>,
    /// `nick!user@host` wildcard masks refused with "banned".
    #[serde(default)]
    pub ban_masks: Vec<String>,
}
