// Error types shared by the library modules.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = UploaderError> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploaderError {
    /// Bad credentials and transport problems during login are not told apart.
    #[error("Login failed. Please check ID & password and try again")]
    AuthFailure,

    #[error("Supported files not found in {}", directory.display())]
    NoFilesFound { directory: PathBuf },

    #[error("{operation} failed: {message}")]
    RemoteOperationFailure {
        operation: &'static str,
        message: String,
    },

    #[error("Invalid upload target: {0}")]
    InvalidTarget(String),
}

impl UploaderError {
    pub fn remote(operation: &'static str, message: impl ToString) -> Self {
        UploaderError::RemoteOperationFailure {
            operation,
            message: message.to_string(),
        }
    }
}
