use serde::Serialize;
use thiserror::Error;

/// Failures surfaced by session and window operations
#[derive(Debug, Error)]
pub enum Error {
    #[error("No session found and auto-create disabled")]
    SessionNotFound,
    #[error("Failed to create session \"{name}\"")]
    SessionCreationFailed { name: String, detail: String },
    #[error("Window \"{0}\" already exists")]
    WindowAlreadyExists(String),
    #[error("Window \"{0}\" does not exist")]
    WindowNotFound(String),
    #[error("Failed to create window \"{name}\"")]
    WindowCreationFailed { name: String, detail: String },
    #[error("Failed to rename initial window to \"{name}\"")]
    WindowRenameFailed { name: String, detail: String },
    #[error("tmux {operation} failed")]
    ExternalServiceFailure { operation: String, detail: String },
}

/// Machine-readable classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SessionNotFound,
    SessionCreationFailed,
    WindowAlreadyExists,
    WindowNotFound,
    WindowCreationFailed,
    WindowRenameFailed,
    ExternalServiceFailure,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SessionNotFound => ErrorKind::SessionNotFound,
            Error::SessionCreationFailed { .. } => ErrorKind::SessionCreationFailed,
            Error::WindowAlreadyExists(_) => ErrorKind::WindowAlreadyExists,
            Error::WindowNotFound(_) => ErrorKind::WindowNotFound,
            Error::WindowCreationFailed { .. } => ErrorKind::WindowCreationFailed,
            Error::WindowRenameFailed { .. } => ErrorKind::WindowRenameFailed,
            Error::ExternalServiceFailure { .. } => ErrorKind::ExternalServiceFailure,
        }
    }

    /// Raw diagnostic from tmux, when the failure came from it
    pub fn detail(&self) -> Option<&str> {
        match self {
            Error::SessionCreationFailed { detail, .. }
            | Error::WindowCreationFailed { detail, .. }
            | Error::WindowRenameFailed { detail, .. }
            | Error::ExternalServiceFailure { detail, .. } => {
                let detail = detail.trim();
                (!detail.is_empty()).then_some(detail)
            }
            _ => None,
        }
    }

    pub(crate) fn external(operation: &str, detail: impl Into<String>) -> Self {
        Error::ExternalServiceFailure {
            operation: operation.to_string(),
            detail: detail.into(),
        }
    }

    /// Re-tag an adapter failure as the creation/rename error the caller expects.
    pub(crate) fn into_session_creation(self, name: &str) -> Self {
        Error::SessionCreationFailed {
            name: name.to_string(),
            detail: self.raw_detail(),
        }
    }

    pub(crate) fn into_window_creation(self, name: &str) -> Self {
        Error::WindowCreationFailed {
            name: name.to_string(),
            detail: self.raw_detail(),
        }
    }

    pub(crate) fn into_window_rename(self, name: &str) -> Self {
        Error::WindowRenameFailed {
            name: name.to_string(),
            detail: self.raw_detail(),
        }
    }

    fn raw_detail(&self) -> String {
        self.detail()
            .map(str::to_string)
            .unwrap_or_else(|| self.to_string())
    }
}

/// Structured failure report written by `-o json`
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Outcome {
    pub fn failure(err: &anyhow::Error) -> Self {
        let core = err.downcast_ref::<Error>();
        Self {
            success: false,
            error: core.map(Error::kind),
            message: err.to_string(),
            details: core.and_then(Error::detail).map(str::to_string),
        }
    }
}
