//! Interactive chat that keeps the conversation history. Type `exit` to stop.
//!
//! cargo run --example 04_chat_history_stream -- --temperature 0.7 --keep-alive 10m

use clap::Parser;
use ollama_guide::session::single_shot::DEFAULT_MODEL;
use ollama_guide::{init_tracing, shutdown_tracing, ChatSession, CliArgs, Console};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();
    let client = args.client()?;
    let telemetry = init_tracing(args.langfuse())?;

    let mut session = ChatSession::new(client, args.request_params(DEFAULT_MODEL));
    let result = session.run(Console::stdio()).await;

    shutdown_tracing(telemetry);
    result?;
    Ok(())
}
