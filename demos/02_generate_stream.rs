//! Same question as `01_generate`, printed piece by piece while it is produced.

use clap::Parser;
use ollama_guide::session::single_shot::{generate_streaming, DEFAULT_MODEL, SKY_PROMPT};
use ollama_guide::{init_tracing, shutdown_tracing, CliArgs};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();
    let client = args.client()?;
    let telemetry = init_tracing(args.langfuse())?;

    let mut out = tokio::io::stdout();
    let result = generate_streaming(&client, args.request_params(DEFAULT_MODEL), SKY_PROMPT, &mut out).await;

    shutdown_tracing(telemetry);
    result?;
    Ok(())
}
