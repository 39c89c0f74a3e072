//! A single chat turn steered by a system prompt.

use clap::Parser;
use ollama_guide::session::single_shot::{
    chat_with_system, DEFAULT_MODEL, PIRATE_SYSTEM_PROMPT, PIRATE_USER_PROMPT,
};
use ollama_guide::{init_tracing, shutdown_tracing, CliArgs};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();
    let client = args.client()?;
    let telemetry = init_tracing(args.langfuse())?;

    let mut out = tokio::io::stdout();
    let result = chat_with_system(
        &client,
        args.request_params(DEFAULT_MODEL),
        PIRATE_SYSTEM_PROMPT,
        PIRATE_USER_PROMPT,
        &mut out,
    )
    .await;

    shutdown_tracing(telemetry);
    result?;
    Ok(())
}
