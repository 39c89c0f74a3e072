//! Chat with a reasoning model and watch it think. Type `quit` to stop.

use clap::Parser;
use ollama_guide::session::thinking::THINKING_MODEL;
use ollama_guide::{init_tracing, shutdown_tracing, CliArgs, Console, ThinkingChat};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();
    let client = args.client()?;
    let telemetry = init_tracing(args.langfuse())?;

    let mut chat = ThinkingChat::new(client, args.request_params(THINKING_MODEL));
    let mut console = Console::stdio();

    let result = match chat.ensure_model(&mut console).await {
        Ok(true) => chat.run(console).await.map(|_| ()),
        Ok(false) => Ok(()),
        Err(e) => Err(e),
    };

    shutdown_tracing(telemetry);
    result?;
    Ok(())
}
