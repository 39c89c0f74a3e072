use std::{future::Future, sync::Arc};

use crate::services::llm::{
    models::{
        chat::{ChatRequest, ChatResponse, ChatStreamChunk},
        errors::InferenceClientError,
        generate::{GenerateRequest, GenerateResponse, GenerateStreamChunk},
        tags::ListModelsResponse,
    },
    providers::ollama::{OllamaClient, ResponseStream},
    ClientConfig,
};

/// Operations the chat programs need from an inference server.
///
/// The session loops are generic over this trait so they can be driven by
/// [`InferenceClient`] in the binaries and by scripted substitutes in tests.
/// Streams are boxed so any implementation can hand back its own stream type.
pub trait InferenceBackend: Send + Sync {
    /// Whole completion for a single prompt.
    fn generate(
        &self,
        request: GenerateRequest,
    ) -> impl Future<Output = Result<GenerateResponse, InferenceClientError>> + Send;

    /// Completion for a single prompt, delivered as it is produced.
    fn generate_stream(
        &self,
        request: GenerateRequest,
    ) -> impl Future<Output = Result<ResponseStream<GenerateStreamChunk>, InferenceClientError>> + Send;

    /// Whole assistant reply to a list of messages.
    fn chat(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, InferenceClientError>> + Send;

    /// Assistant reply to a list of messages, delivered as content deltas.
    fn chat_stream(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<ResponseStream<ChatStreamChunk>, InferenceClientError>> + Send;

    /// Models installed on the server.
    fn list_models(
        &self,
    ) -> impl Future<Output = Result<ListModelsResponse, InferenceClientError>> + Send;
}

/// HTTP client for an Ollama server.
#[derive(Clone, Debug)]
pub struct InferenceClient {
    config: ClientConfig,
    inner: Arc<OllamaClient>,
}

impl InferenceClient {
    pub fn get_config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }
}

impl InferenceBackend for InferenceClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, InferenceClientError> {
        self.inner.generate(request).await
    }

    async fn generate_stream(&self, request: GenerateRequest) -> Result<ResponseStream<GenerateStreamChunk>, InferenceClientError> {
        self.inner.generate_stream(request).await
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, InferenceClientError> {
        self.inner.chat(request).await
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ResponseStream<ChatStreamChunk>, InferenceClientError> {
        self.inner.chat_stream(request).await
    }

    async fn list_models(&self) -> Result<ListModelsResponse, InferenceClientError> {
        self.inner.list_models().await
    }
}

impl TryFrom<ClientConfig> for InferenceClient {
    type Error = InferenceClientError;

    fn try_from(cfg: ClientConfig) -> Result<Self, Self::Error> {
        let config = cfg.clone();
        Ok(Self {
            config,
            inner: Arc::new(OllamaClient::new(cfg)?),
        })
    }
}
