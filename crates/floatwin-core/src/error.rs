use std::{fmt, io};

use serde::Serialize;
use thiserror::Error;

/// Compositor call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceOp {
    Add,
    Update,
    Remove,
}

impl fmt::Display for SurfaceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceOp::Add => f.write_str("add"),
            SurfaceOp::Update => f.write_str("update"),
            SurfaceOp::Remove => f.write_str("remove"),
        }
    }
}

/// Rejection reported by the OS window manager.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositorError {
    #[error("overlay permission was revoked")]
    PermissionRevoked,
    #[error("surface is not attached to the window manager")]
    NotAttached,
    #[error("host context was destroyed")]
    ContextDestroyed,
    #[error("{0}")]
    Rejected(String),
}

/// Failure raised by a content engine or its factory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("failed to start entrypoint {entrypoint}: {reason}")]
    Startup { entrypoint: String, reason: String },
    #[error("no listener on the engine message channel")]
    NoListener,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Overlay permission is not granted")]
    PermissionDenied,
    #[error("No host context is attached")]
    NoHostContext,
    #[error("Failed to {op} overlay surface: {reason}")]
    SurfaceOperationFailed {
        op: SurfaceOp,
        #[source]
        reason: CompositorError,
    },
    #[error("Content engine {0} not found")]
    EngineNotFound(String),
    #[error("Content engine unavailable: {0}")]
    EngineUnavailable(#[from] EngineError),
    #[error("Content engine {0} is already attached to a surface")]
    EngineAlreadyActive(u64),
    #[error("Command {0} is not implemented")]
    UnsupportedCommand(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Failed to parse settings: {0}")]
    Settings(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub fn surface(op: SurfaceOp, reason: CompositorError) -> Self {
        Error::SurfaceOperationFailed { op, reason }
    }

    /// Stable code reported across the command boundary.
    pub fn code(&self) -> &'static str {
        match self {
            Error::PermissionDenied => "PERMISSION_DENIED",
            Error::NoHostContext => "NO_HOST_CONTEXT",
            Error::SurfaceOperationFailed { .. } => "SURFACE_OPERATION_FAILED",
            Error::EngineNotFound(_) => "ENGINE_NOT_FOUND",
            Error::EngineUnavailable(_) => "ENGINE_UNAVAILABLE",
            Error::EngineAlreadyActive(_) => "ENGINE_ALREADY_ACTIVE",
            Error::UnsupportedCommand(_) => "NOT_IMPLEMENTED",
            Error::InvalidArgument(_) => "INVALID_ARGUMENT",
            Error::Settings(_) => "SETTINGS_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }
}

/// Serializable form of [`Error`] handed back to the host app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandError {
    pub code: String,
    pub message: String,
}

impl From<Error> for CommandError {
    fn from(e: Error) -> Self {
        Self {
            code: e.code().to_string(),
            message: e.to_string(),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_error_carries_op_and_code() {
        let err = Error::surface(SurfaceOp::Add, CompositorError::PermissionRevoked);
        assert_eq!(err.code(), "SURFACE_OPERATION_FAILED");
        assert_eq!(
            err.to_string(),
            "Failed to add overlay surface: overlay permission was revoked"
        );
    }

    #[test]
    fn command_error_uses_wire_code() {
        let err: CommandError = Error::UnsupportedCommand("spin".into()).into();
        assert_eq!(err.code, "NOT_IMPLEMENTED");
        assert_eq!(err.message, "Command spin is not implemented");
    }
}
