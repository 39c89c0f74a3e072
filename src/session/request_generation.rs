use crate::services::llm::models::{
    base::{BaseRequest, InferenceOptions, Message},
    chat::ChatRequest,
    generate::GenerateRequest,
};

/// Common parameters for building a request.
///
/// A bare model name converts into parameters with default options.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    pub model: String,
    pub options: Option<InferenceOptions>,
    pub stream: bool,
    pub keep_alive: Option<String>,
}

impl RequestParams {
    pub fn new<T: Into<String>>(model: T, stream: bool) -> Self {
        Self {
            model: model.into(),
            stream,
            ..Default::default()
        }
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    fn base(self) -> BaseRequest {
        BaseRequest {
            model: self.model,
            options: self.options,
            stream: Some(self.stream),
            keep_alive: self.keep_alive,
        }
    }

    pub fn into_chat_request(self, messages: Vec<Message>) -> ChatRequest {
        ChatRequest {
            base: self.base(),
            messages,
            think: None,
        }
    }

    pub fn into_generate_request<T: Into<String>>(self, prompt: T) -> GenerateRequest {
        GenerateRequest {
            base: self.base(),
            prompt: prompt.into(),
        }
    }
}

impl From<&str> for RequestParams {
    fn from(model: &str) -> Self {
        Self::new(model, false)
    }
}

impl From<String> for RequestParams {
    fn from(model: String) -> Self {
        Self::new(model, false)
    }
}

/// Message list for one cycle of the history chat.
///
/// The whole history comes first, then the fixed system instruction, then
/// the new user text. The instruction is added for every cycle and is never
/// part of `history`.
pub fn history_messages(history: &[Message], system_instruction: &str, input: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.extend_from_slice(history);
    messages.push(Message::system(system_instruction));
    messages.push(Message::user(input));
    messages
}
