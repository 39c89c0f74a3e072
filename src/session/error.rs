use crate::services::llm::InferenceClientError;

/// Errors that end a session.
#[derive(Debug)]
pub enum SessionError {
    /// The inference server rejected the request or the stream broke.
    Inference(InferenceClientError),
    /// Reading from or writing to the console failed.
    Console(std::io::Error),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Inference(e) => write!(f, "Inference failed: {e}"),
            SessionError::Console(e) => write!(f, "Console error: {e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Inference(e) => Some(e),
            SessionError::Console(e) => Some(e),
        }
    }
}

impl From<InferenceClientError> for SessionError {
    fn from(err: InferenceClientError) -> Self {
        SessionError::Inference(err)
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Console(err)
    }
}
