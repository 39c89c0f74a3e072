pub mod langfuse;
pub mod logging;

use opentelemetry_sdk::trace::SdkTracerProvider;

pub use langfuse::{LangfuseOptions, TelemetryError};
pub use logging::init_default_tracing;

/// Installs the global subscriber: Langfuse export when credentials are
/// given, plain console logging otherwise.
pub fn init_tracing(langfuse: Option<LangfuseOptions>) -> Result<Option<SdkTracerProvider>, TelemetryError> {
    match langfuse {
        Some(options) => langfuse::init(options).map(Some),
        None => {
            init_default_tracing();
            Ok(None)
        }
    }
}

/// Flushes exported spans; failures are only logged.
pub fn shutdown_tracing(provider: Option<SdkTracerProvider>) {
    if let Some(provider) = provider {
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = ?e, "failed to flush spans");
        }
    }
}
