use crate::validation::RejectionReason;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("{reason}")]
    Validation { reason: RejectionReason },

    #[error("{message}")]
    Transport { message: String },

    #[error("Malformed response: {details}")]
    MalformedResponse { details: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl UploadError {
    pub fn transport(message: impl Into<String>) -> Self {
        UploadError::Transport {
            message: message.into(),
        }
    }

    pub fn malformed(details: impl Into<String>) -> Self {
        UploadError::MalformedResponse {
            details: details.into(),
        }
    }

    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            UploadError::Validation { .. } => "validation",
            UploadError::Transport { .. } => "transport",
            UploadError::MalformedResponse { .. } => "malformed_response",
            UploadError::Config(_) => "config",
            UploadError::Io(_) => "io",
        }
    }
}

impl From<RejectionReason> for UploadError {
    fn from(reason: RejectionReason) -> Self {
        UploadError::Validation { reason }
    }
}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        UploadError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for UploadError {
    fn from(err: serde_json::Error) -> Self {
        UploadError::malformed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, UploadError>;
