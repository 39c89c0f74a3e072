//! Scripted stand-in for an inference server.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::services::llm::{
    ChatRequest, ChatResponse, ChatStreamChunk, GenerateRequest, GenerateResponse,
    GenerateStreamChunk, InferenceBackend, InferenceClientError, ListModelsResponse, Message,
    ModelInfo, ResponseStream,
};

/// What the backend answers to the next request.
pub(crate) enum Reply {
    /// Content deltas, delivered in order and followed by a `done` chunk.
    Fragments(Vec<&'static str>),
    /// `(thinking, content)` deltas for reasoning models.
    Thoughts(Vec<(&'static str, &'static str)>),
    /// Content deltas, then a broken connection.
    BreaksAfter(Vec<&'static str>),
    /// The server refuses the request.
    Rejected,
}

pub(crate) struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    chat_requests: Mutex<Vec<ChatRequest>>,
    generate_requests: Mutex<Vec<GenerateRequest>>,
    models: Option<Vec<&'static str>>,
}

impl ScriptedBackend {
    pub(crate) fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            chat_requests: Mutex::new(Vec::new()),
            generate_requests: Mutex::new(Vec::new()),
            models: None,
        }
    }

    pub(crate) fn with_models(mut self, models: Vec<&'static str>) -> Self {
        self.models = Some(models);
        self
    }

    pub(crate) fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub(crate) fn generate_requests(&self) -> Vec<GenerateRequest> {
        self.generate_requests.lock().unwrap().clone()
    }

    fn next_reply(&self) -> Reply {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("backend received more requests than scripted")
    }
}

fn rejected() -> InferenceClientError {
    InferenceClientError::Api("Ollama request failed: 500 Internal Server Error - boom".into())
}

fn chat_chunk(thinking: Option<&str>, content: &str, done: bool) -> ChatStreamChunk {
    let mut message = Message::assistant(content);
    message.thinking = thinking.map(str::to_string);
    ChatStreamChunk {
        model: "scripted".into(),
        created_at: "2025-03-01T10:00:00Z".into(),
        message: Some(message),
        done,
        done_reason: done.then(|| "stop".to_string()),
        total_duration: None,
        eval_count: None,
    }
}

fn generate_chunk(response: &str, done: bool) -> GenerateResponse {
    GenerateResponse {
        model: "scripted".into(),
        created_at: "2025-03-01T10:00:00Z".into(),
        response: response.into(),
        done,
        done_reason: done.then(|| "stop".to_string()),
        thinking: None,
        context: None,
        total_duration: None,
        load_duration: None,
        prompt_eval_count: None,
        prompt_eval_duration: None,
        eval_count: None,
        eval_duration: None,
    }
}

fn stream_of<T: Send + 'static>(items: Vec<Result<T, InferenceClientError>>) -> ResponseStream<T> {
    Box::pin(tokio_stream::iter(items))
}

impl InferenceBackend for ScriptedBackend {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, InferenceClientError> {
        self.generate_requests.lock().unwrap().push(request);
        match self.next_reply() {
            Reply::Fragments(parts) => Ok(generate_chunk(&parts.concat(), true)),
            _ => Err(rejected()),
        }
    }

    async fn generate_stream(&self, request: GenerateRequest) -> Result<ResponseStream<GenerateStreamChunk>, InferenceClientError> {
        self.generate_requests.lock().unwrap().push(request);
        let items = match self.next_reply() {
            Reply::Fragments(parts) => {
                let mut items: Vec<_> = parts.into_iter().map(|p| Ok(generate_chunk(p, false))).collect();
                items.push(Ok(generate_chunk("", true)));
                items
            }
            Reply::BreaksAfter(parts) => {
                let mut items: Vec<_> = parts.into_iter().map(|p| Ok(generate_chunk(p, false))).collect();
                items.push(Err(InferenceClientError::Request("connection reset".into())));
                items
            }
            _ => return Err(rejected()),
        };
        Ok(stream_of(items))
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, InferenceClientError> {
        self.chat_requests.lock().unwrap().push(request);
        match self.next_reply() {
            Reply::Fragments(parts) => Ok(ChatResponse {
                model: "scripted".into(),
                created_at: "2025-03-01T10:00:00Z".into(),
                message: Message::assistant(parts.concat()),
                done: true,
                done_reason: Some("stop".into()),
                total_duration: None,
                load_duration: None,
                prompt_eval_count: None,
                prompt_eval_duration: None,
                eval_count: None,
                eval_duration: None,
            }),
            _ => Err(rejected()),
        }
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ResponseStream<ChatStreamChunk>, InferenceClientError> {
        self.chat_requests.lock().unwrap().push(request);
        let items = match self.next_reply() {
            Reply::Fragments(parts) => {
                let mut items: Vec<_> = parts.into_iter().map(|p| Ok(chat_chunk(None, p, false))).collect();
                items.push(Ok(chat_chunk(None, "", true)));
                items
            }
            Reply::Thoughts(parts) => {
                let mut items: Vec<_> = parts
                    .into_iter()
                    .map(|(t, c)| Ok(chat_chunk(Some(t), c, false)))
                    .collect();
                items.push(Ok(chat_chunk(None, "", true)));
                items
            }
            Reply::BreaksAfter(parts) => {
                let mut items: Vec<_> = parts.into_iter().map(|p| Ok(chat_chunk(None, p, false))).collect();
                items.push(Err(InferenceClientError::Request("connection reset".into())));
                items
            }
            Reply::Rejected => return Err(rejected()),
        };
        Ok(stream_of(items))
    }

    async fn list_models(&self) -> Result<ListModelsResponse, InferenceClientError> {
        let Some(models) = &self.models else {
            return Err(InferenceClientError::Request("connection refused".into()));
        };
        Ok(ListModelsResponse {
            models: models
                .iter()
                .map(|m| ModelInfo {
                    name: m.to_string(),
                    model: m.to_string(),
                    ..Default::default()
                })
                .collect(),
        })
    }
}
