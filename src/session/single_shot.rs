//! One request, one printed answer.
//!
//! Each helper sends exactly one request with a fixed message list, writes
//! the answer to `out` and returns it. Client errors are passed straight up.

use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument};

use crate::services::llm::{models::base::Message, InferenceBackend};
use crate::session::{error::SessionError, request_generation::RequestParams};

pub const DEFAULT_MODEL: &str = "llama3.2:1b";
pub const SKY_PROMPT: &str = "Why is the sky blue?";
pub const PIRATE_SYSTEM_PROMPT: &str = "You speak and sound like a pirate with short sentences.";
pub const PIRATE_USER_PROMPT: &str = "Tell me about your boat.";

async fn emit<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> Result<(), SessionError> {
    out.write_all(text.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

/// Generates a whole completion for `prompt` and prints it on one line.
#[instrument(name = "single_shot.generate", skip(backend, params, out))]
pub async fn generate_once<B, P, W>(backend: &B, params: P, prompt: &str, out: &mut W) -> Result<String, SessionError>
where
    B: InferenceBackend,
    P: Into<RequestParams>,
    W: AsyncWrite + Unpin,
{
    let request = params.into().with_stream(false).into_generate_request(prompt);
    let response = backend.generate(request).await?;
    debug!(eval_count = ?response.eval_count, "completion received");

    emit(out, &response.response).await?;
    emit(out, "\n").await?;
    Ok(response.response)
}

/// Streams a completion for `prompt`, printing each piece as it arrives.
#[instrument(name = "single_shot.generate_stream", skip(backend, params, out))]
pub async fn generate_streaming<B, P, W>(backend: &B, params: P, prompt: &str, out: &mut W) -> Result<String, SessionError>
where
    B: InferenceBackend,
    P: Into<RequestParams>,
    W: AsyncWrite + Unpin,
{
    emit(out, "Streaming response:\n").await?;

    let request = params.into().with_stream(true).into_generate_request(prompt);
    let mut stream = backend.generate_stream(request).await?;
    let mut full = String::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if !chunk.response.is_empty() {
            emit(out, &chunk.response).await?;
            full.push_str(&chunk.response);
        }
        if chunk.done {
            break;
        }
    }

    emit(out, "\n").await?;
    Ok(full)
}

/// Sends `[system, user]` once and prints the assistant's reply.
#[instrument(name = "single_shot.chat", skip(backend, params, out))]
pub async fn chat_with_system<B, P, W>(
    backend: &B,
    params: P,
    system_prompt: &str,
    user_prompt: &str,
    out: &mut W,
) -> Result<String, SessionError>
where
    B: InferenceBackend,
    P: Into<RequestParams>,
    W: AsyncWrite + Unpin,
{
    let messages = vec![Message::system(system_prompt), Message::user(user_prompt)];
    let request = params.into().with_stream(false).into_chat_request(messages);
    let response = backend.chat(request).await?;

    emit(out, &response.message.content).await?;
    emit(out, "\n").await?;
    Ok(response.message.content)
}
