use thiserror::Error;

/// Shown when a network failure carries no usable message.
pub const NETWORK_FALLBACK_MESSAGE: &str = "An error occurred while analyzing the resume";

/// Terminal failure of a submission attempt. `Display` is the user-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("{0}")]
    Validation(ValidationError),
    #[error("Error: {status_text}")]
    Transport { status: u16, status_text: String },
    #[error("{}", .message.as_deref().unwrap_or(NETWORK_FALLBACK_MESSAGE))]
    Network { message: Option<String> },
}

impl SubmissionError {
    /// Network-class failure; a blank message falls back to the generic text.
    pub fn network(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            None
        } else {
            Some(message)
        };
        Self::Network { message }
    }

    pub fn transport(status: u16, status_text: impl Into<String>) -> Self {
        Self::Transport {
            status,
            status_text: status_text.into(),
        }
    }
}

impl From<ValidationError> for SubmissionError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

/// Rejections detected before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please upload a resume PDF file")]
    MissingResume,
    #[error("Only PDF resumes are supported")]
    NotPdf,
}
