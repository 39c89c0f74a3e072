use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_langfuse::ExporterBuilder;
use opentelemetry_sdk::trace::span_processor_with_async_runtime::BatchSpanProcessor;
use opentelemetry_sdk::{resource::Resource, runtime, trace::SdkTracerProvider};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use tracing::{Metadata, Subscriber};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::{Context, Filter, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

const SERVICE: &str = "ollama-guide";

/// Credentials for a Langfuse project.
#[derive(Debug, Clone)]
pub struct LangfuseOptions {
    pub public_key: String,
    pub secret_key: String,
    /// Langfuse cloud when unset.
    pub host: Option<String>,
}

#[derive(Debug)]
pub enum TelemetryError {
    Exporter(String),
}

impl std::fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelemetryError::Exporter(s) => write!(f, "Langfuse exporter error: {s}"),
        }
    }
}

impl std::error::Error for TelemetryError {}

/// Only this crate's spans are exported; HTTP internals stay local.
#[derive(Debug, Clone)]
struct CrateSpanFilter;

impl<S> Filter<S> for CrateSpanFilter
where
    S: Subscriber,
{
    fn enabled(&self, meta: &Metadata<'_>, _cx: &Context<'_, S>) -> bool {
        meta.target().starts_with("ollama_guide")
    }
}

/// Console logging plus span export to Langfuse.
///
/// The returned provider must be shut down before exit so buffered spans
/// are flushed.
pub fn init(options: LangfuseOptions) -> Result<SdkTracerProvider, TelemetryError> {
    let mut builder = ExporterBuilder::default().with_basic_auth(&options.public_key, &options.secret_key);
    if let Some(host) = &options.host {
        builder = builder.with_host(host);
    }
    let exporter = builder
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let resource = Resource::builder()
        .with_attributes([
            KeyValue::new(SERVICE_NAME, SERVICE),
            KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
        ])
        .build();

    let processor = BatchSpanProcessor::builder(exporter, runtime::Tokio).build();

    let provider = SdkTracerProvider::builder()
        .with_resource(resource)
        .with_span_processor(processor)
        .build();

    let tracer = provider.tracer(SERVICE);
    global::set_tracer_provider(provider.clone());

    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = fmt::layer()
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let otel_layer = tracing_opentelemetry::layer()
        .with_tracer(tracer)
        .with_filter(CrateSpanFilter);

    Registry::default().with(fmt_layer).with(otel_layer).init();

    Ok(provider)
}
