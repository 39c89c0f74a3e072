use futures::StreamExt;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::services::llm::{InferenceBackend, InferenceClientError, ListModelsResponse, Message};
use crate::session::{
    console::Console, error::SessionError, request_generation::RequestParams,
    transcript::Transcript,
};

pub const THINKING_MODEL: &str = "qwen3:0.6b";
/// Model families that can return their reasoning separately.
pub const THINKING_FAMILIES: [&str; 2] = ["deepseek-r1", "qwen3"];
pub const THINKING_SYSTEM_PROMPT: &str = "You are a helpful assistant that thinks through answers.";
pub const QUERY_PROMPT: &str = "Query: ";
const QUIT_KEYWORDS: [&str; 3] = ["quit", "exit", "q"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelCheck {
    Supported,
    /// The model is missing or not a thinking model; lists the installed ones that are.
    Unsupported { available: Vec<String> },
}

/// Installed models whose family supports thinking.
pub fn thinking_models(listing: &ListModelsResponse) -> Vec<String> {
    listing
        .models
        .iter()
        .filter(|m| THINKING_FAMILIES.iter().any(|f| *f == m.family()))
        .map(|m| m.model.clone())
        .collect()
}

/// What the model produced for one question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThoughtAnswer {
    pub thinking: String,
    pub answer: String,
}

/// Chat with a reasoning model, showing its thinking before the answer.
///
/// Unlike [`ChatSession`](crate::session::chat_loop::ChatSession) the system
/// prompt is stored once at the start of the transcript.
pub struct ThinkingChat<B> {
    id: Uuid,
    backend: B,
    params: RequestParams,
    transcript: Transcript,
}

impl<B: InferenceBackend> ThinkingChat<B> {
    pub fn new<P: Into<RequestParams>>(backend: B, params: P) -> Self {
        Self {
            id: Uuid::new_v4(),
            backend,
            params: params.into().with_stream(true),
            transcript: Transcript::with_system(THINKING_SYSTEM_PROMPT),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn validate_model(&self) -> Result<ModelCheck, InferenceClientError> {
        let listing = self.backend.list_models().await?;
        let available = thinking_models(&listing);
        if available.iter().any(|m| *m == self.params.model) {
            Ok(ModelCheck::Supported)
        } else {
            Ok(ModelCheck::Unsupported { available })
        }
    }

    /// Checks the model and explains on the console when it cannot be used.
    pub async fn ensure_model<R, W>(&self, console: &mut Console<R, W>) -> Result<bool, SessionError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let available = match self.validate_model().await {
            Ok(ModelCheck::Supported) => return Ok(true),
            Ok(ModelCheck::Unsupported { available }) => available,
            Err(e) => {
                warn!(error = %e, "could not list models");
                console.writeln(&format!("Error checking models: {e}")).await?;
                return Ok(false);
            }
        };

        console
            .writeln(&format!("Model '{}' is not a thinking model.", self.params.model))
            .await?;
        if available.is_empty() {
            console.writeln("No thinking models found. Install with:").await?;
            console.writeln("ollama pull deepseek-r1 or ollama pull qwen3").await?;
        } else {
            console.writeln("Available thinking models:").await?;
            for model in &available {
                console.writeln(&format!("- {model}")).await?;
            }
        }
        Ok(false)
    }

    /// Streams the answer to `question` with thinking enabled.
    ///
    /// The question stays in the transcript even if the request fails; the
    /// answer is only kept when it is not empty.
    #[instrument(name = "thinking.ask", skip_all, fields(session_id = %self.id))]
    pub async fn ask<R, W>(&mut self, question: &str, console: &mut Console<R, W>) -> Result<ThoughtAnswer, SessionError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.transcript.push(Message::user(question));

        let mut request = self
            .params
            .clone()
            .into_chat_request(self.transcript.turns().to_vec());
        request.think = Some(true);

        let mut stream = self.backend.chat_stream(request).await?;
        let mut result = ThoughtAnswer::default();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;

            if let Some(thinking) = chunk.thinking() {
                if result.thinking.is_empty() {
                    console.write("Thinking:\n").await?;
                }
                console.write(thinking).await?;
                result.thinking.push_str(thinking);
            }

            let content = chunk.content();
            if !content.is_empty() {
                if result.answer.is_empty() && !result.thinking.is_empty() {
                    console.write("\n\nAnswer:\n").await?;
                }
                console.write(content).await?;
                result.answer.push_str(content);
            }

            if chunk.done {
                break;
            }
        }

        if !result.answer.is_empty() {
            self.transcript.push(Message::assistant(result.answer.clone()));
        }
        info!(
            thinking_chars = result.thinking.len(),
            answer_chars = result.answer.len(),
            "answer complete"
        );
        Ok(result)
    }

    /// Question loop; `quit`, `exit`, `q` or end of input stop it.
    ///
    /// Failed questions are reported and the loop carries on.
    pub async fn run<R, W>(&mut self, mut console: Console<R, W>) -> Result<W, SessionError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        console.writeln(&format!("Thinking Chat ({})", self.params.model)).await?;
        console.writeln("Type your questions or 'quit' to exit\n").await?;

        loop {
            let Some(line) = console.read_line(QUERY_PROMPT).await? else {
                console.writeln("\nGoodbye!").await?;
                break;
            };
            let query = line.trim();

            let folded = query.to_lowercase();
            if QUIT_KEYWORDS.iter().any(|k| *k == folded) {
                console.writeln("Goodbye!").await?;
                break;
            }
            if query.is_empty() {
                continue;
            }

            match self.ask(query, &mut console).await {
                Ok(_) => console.write("\n\n").await?,
                Err(SessionError::Console(e)) => return Err(SessionError::Console(e)),
                Err(e) => console.writeln(&format!("Error: {e}")).await?,
            }
        }

        Ok(console.close())
    }
}
