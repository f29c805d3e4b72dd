//! Error types for the homehub-command crate.

/// Errors produced when issuing a command to the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// No connection was available when the command was sent
    #[error("no hub connection available")]
    Offline,

    /// The hub did not answer within the command timeout
    #[error("command expired without a response")]
    Expired,
}

/// Convenience type alias for Results using CommandError.
pub type Result<T> = std::result::Result<T, CommandError>;
