#[derive(Debug)]
pub enum InferenceClientError {
    /// The request could not be sent or the connection broke.
    Request(String),
    /// The server answered with a non-success status.
    Api(String),
    /// A body or stream line was not the JSON we expected.
    Serialization(String),
    /// The client was configured with unusable values.
    Config(String),
}

impl std::fmt::Display for InferenceClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceClientError::Request(s) => write!(f, "Request Error: {s}"),
            InferenceClientError::Api(s) => write!(f, "API Error: {s}"),
            InferenceClientError::Serialization(s) => write!(f, "Serialization Error: {s}"),
            InferenceClientError::Config(s) => write!(f, "Config Error: {s}"),
        }
    }
}

impl std::error::Error for InferenceClientError {}

impl From<reqwest::Error> for InferenceClientError {
    fn from(err: reqwest::Error) -> Self {
        InferenceClientError::Request(err.to_string())
    }
}

impl From<serde_json::Error> for InferenceClientError {
    fn from(err: serde_json::Error) -> Self {
        InferenceClientError::Serialization(err.to_string())
    }
}
