pub mod cli;
pub mod observability;
pub mod services;
pub mod session;

pub use cli::CliArgs;
pub use observability::{init_default_tracing, init_tracing, shutdown_tracing};
pub use services::llm::{
    ChatRequest, ChatResponse, ChatStreamChunk, ClientBuilder, ClientConfig, GenerateRequest,
    GenerateResponse, InferenceBackend, InferenceClient, InferenceClientError, Message, Role,
};
pub use session::{ChatSession, Console, SessionError, ThinkingChat, Transcript};
