use std::collections::HashMap;

use crate::services::llm::{InferenceClient, InferenceClientError};

/// Connection settings for an Ollama server.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Server address, `http://localhost:11434` when unset.
    pub base_url: Option<String>,
    /// Sent as a bearer token, for servers behind an authenticating proxy.
    pub api_key: Option<String>,
    pub extra_headers: Option<HashMap<String, String>>,
}

pub trait ClientBuilder {
    fn base_url(self, base_url: Option<impl Into<String>>) -> Self;
    fn api_key(self, api_key: Option<impl Into<String>>) -> Self;
    fn extra_headers(self, extra_headers: Option<HashMap<String, String>>) -> Self;
    fn build(self) -> Result<InferenceClient, InferenceClientError>;
}

impl ClientBuilder for ClientConfig {
    fn base_url(mut self, base_url: Option<impl Into<String>>) -> Self {
        self.base_url = base_url.map(|s| s.into());
        self
    }

    fn api_key(mut self, api_key: Option<impl Into<String>>) -> Self {
        self.api_key = api_key.map(|s| s.into());
        self
    }

    fn extra_headers(mut self, extra_headers: Option<HashMap<String, String>>) -> Self {
        self.extra_headers = extra_headers;
        self
    }

    fn build(self) -> Result<InferenceClient, InferenceClientError> {
        InferenceClient::try_from(self)
    }
}
