use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("{variable} must be configured")]
    Misconfigured { variable: &'static str },

    #[error("failed to copy s3://{bucket}/{key} to failure prefix: {message}")]
    Copy {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("failed to delete s3://{bucket}/{key}: {message}")]
    Delete {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("failed to send failure notification for s3://{bucket}/{key}: {message}")]
    Email {
        bucket: String,
        key: String,
        message: String,
    },
}

impl NotifyError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedEvent(message.into())
    }

    /// Stable identifier used in structured log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedEvent(_) => "malformed_event",
            Self::Misconfigured { .. } => "misconfiguration",
            Self::Copy { .. } => "copy_failed",
            Self::Delete { .. } => "delete_failed",
            Self::Email { .. } => "email_failed",
        }
    }
}
