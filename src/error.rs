//! Unified error handling for tinyircd.
//!
//! Handler failures are split by what the client should see: a numeric
//! reply, nothing at all, or a torn-down connection.

use thiserror::Error;
use tinyirc_proto::Numeric;

// ============================================================================
// Collaborator signals (user and channel directories)
// ============================================================================

/// "This command's side effect could not complete now."
///
/// Not a failure of the client: it is answered with RPL_TRYAGAIN, or not at
/// all when `silent` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("command dropped: {}", .reason.as_deref().unwrap_or("try again later"))]
pub struct DroppedCommand {
    pub reason: Option<String>,
    pub silent: bool,
}

impl DroppedCommand {
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            silent: false,
        }
    }

    pub fn silent() -> Self {
        Self {
            reason: None,
            silent: true,
        }
    }
}

/// Why a channel refused a JOIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum JoinRefusal {
    #[error("banned")]
    Banned,
    #[error("invite only")]
    NeedInvite,
    #[error("bad key")]
    WrongPassword,
    #[error("channel full")]
    ChannelFull,
    #[error("too many channels")]
    TooManyChannels,
}

impl JoinRefusal {
    /// The numeric a refused JOIN of `channel` is answered with.
    pub fn to_numeric(self, channel: &str) -> Numeric {
        match self {
            Self::Banned => Numeric::err_bannedfromchan(channel),
            Self::NeedInvite => Numeric::err_inviteonlychan(channel),
            Self::WrongPassword => Numeric::err_badchannelkey(channel),
            Self::ChannelFull => Numeric::err_channelisfull(channel),
            Self::TooManyChannels => Numeric::err_toomanychannels(channel),
        }
    }

    /// Static label for metrics.
    pub fn label(self) -> &'static str {
        match self {
            Self::Banned => "banned",
            Self::NeedInvite => "need_invite",
            Self::WrongPassword => "wrong_password",
            Self::ChannelFull => "channel_full",
            Self::TooManyChannels => "too_many_channels",
        }
    }
}

/// Outcome of a failed directory or channel operation.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Domain refusal of a JOIN.
    #[error("join refused: {0}")]
    Refused(JoinRefusal),

    /// Transient refusal; the client may retry.
    #[error(transparent)]
    Dropped(#[from] DroppedCommand),

    /// Anything else. Not answered with a numeric.
    #[error(transparent)]
    Failed(anyhow::Error),
}

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("not enough parameters")]
    NeedMoreParams,

    #[error("not registered")]
    NotRegistered,

    #[error("{command}: {cause}")]
    Dropped {
        command: &'static str,
        cause: DroppedCommand,
    },

    #[error("{command}: collaborator failure: {error}")]
    Directory {
        command: &'static str,
        error: anyhow::Error,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Wrap a directory failure that happened while running `command`.
    pub fn from_directory(command: &'static str, err: DirectoryError) -> Self {
        match err {
            DirectoryError::Dropped(cause) => Self::Dropped { command, cause },
            DirectoryError::Failed(error) => Self::Directory { command, error },
            DirectoryError::Refused(reason) => {
                Self::Internal(format!("{command}: unexpected join refusal ({reason})"))
            }
        }
    }

    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NeedMoreParams => "need_more_params",
            Self::NotRegistered => "not_registered",
            Self::Dropped { .. } => "dropped",
            Self::Directory { .. } => "directory_failure",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Errors that end the connection instead of producing a reply.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Directory { .. } | Self::Internal(_))
    }

    /// Convert to a numeric reply for the client.
    ///
    /// Returns `None` for silent drops and for fatal errors.
    pub fn to_reply(&self, cmd_name: &str) -> Option<Numeric> {
        match self {
            Self::NeedMoreParams => Some(Numeric::err_needmoreparams(cmd_name)),
            Self::NotRegistered => Some(Numeric::err_notregistered()),
            Self::Dropped { cause, .. } if cause.silent => None,
            Self::Dropped { command, cause } => {
                Some(Numeric::rpl_tryagain(command, cause.reason.as_deref()))
            }
            Self::Directory { .. } | Self::Internal(_) => None,
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;
