use serde::{Deserialize, Serialize};

use super::base::BaseRequest;

/// Request for the `/api/generate` endpoint.
#[derive(Serialize, Debug, Clone)]
pub struct GenerateRequest {
    #[serde(flatten)]
    pub base: BaseRequest,
    pub prompt: String,
}

/// Response from the `/api/generate` endpoint.
///
/// When streaming is disabled this holds the whole completion. When it is
/// enabled every line of the stream has this shape, `response` holds the new
/// text only and the final one (`done == true`) carries the statistics.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GenerateResponse {
    /// The model name used for generation.
    pub model: String,
    /// The timestamp when the response was created.
    pub created_at: String,
    /// The generated text.
    #[serde(default)]
    pub response: String,
    /// Indicates if this is the final response.
    pub done: bool,
    /// Why generation finished. Only present when `done` is `true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<String>,
    /// Thinking text from reasoning models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    /// An encoding of the conversation context. Present only if `done` is `true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<i64>>,
    /// Time spent generating the response (nanoseconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,
    /// Time spent loading the model (nanoseconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_duration: Option<u64>,
    /// Number of tokens in the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u32>,
    /// Time spent evaluating the prompt (nanoseconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_duration: Option<u64>,
    /// Number of tokens in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u32>,
    /// Time spent generating the response (nanoseconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_duration: Option<u64>,
}

/// Streaming `/api/generate` chunks share the response shape.
pub type GenerateStreamChunk = GenerateResponse;
