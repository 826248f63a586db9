//! Error types for provisioning.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProvisionError>;

#[derive(Debug, Error)]
pub enum ProvisionError {
    /// An external command exited non-zero. Carries the exact command text.
    #[error("failed: {command:?} (exit code {exit_code})")]
    CommandFailed { command: String, exit_code: i32 },

    #[error("could not start shell for {command:?}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("argument cannot be shell-quoted: {value:?}")]
    UnquotableArgument { value: String },

    #[error("no Ruby version configured and none found in the workspace")]
    BlankVersion,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProvisionError {
    /// Exit code of the failing command, if this error came from one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProvisionError::CommandFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    /// Text of the failing command, if any.
    pub fn command(&self) -> Option<&str> {
        match self {
            ProvisionError::CommandFailed { command, .. } | ProvisionError::Spawn { command, .. } => {
                Some(command.as_str())
            }
            _ => None,
        }
    }
}
