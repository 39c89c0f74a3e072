use async_stream::try_stream;
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::{fmt, pin::Pin};
use tracing::{debug, error, span, Instrument, Level, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::services::llm::models::{
    chat::{ChatRequest, ChatResponse, ChatStreamChunk},
    errors::InferenceClientError,
    generate::{GenerateRequest, GenerateResponse, GenerateStreamChunk},
    tags::ListModelsResponse,
};
use crate::services::llm::ClientConfig;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

pub type ResponseStream<R> =
    Pin<Box<dyn Stream<Item = Result<R, InferenceClientError>> + Send + 'static>>;

#[derive(Debug, Clone)]
pub struct OllamaClient {
    pub client: Client,
    pub base_url: String,
}

impl OllamaClient {
    pub fn new(cfg: ClientConfig) -> Result<Self, InferenceClientError> {
        let base_url = cfg
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        if base_url.is_empty() {
            return Err(InferenceClientError::Config("Base URL is empty".into()));
        }

        let mut headers = HeaderMap::new();
        if let Some(key) = cfg.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| InferenceClientError::Config(format!("Invalid API key: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        for (name, value) in cfg.extra_headers.unwrap_or_default() {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| InferenceClientError::Config(format!("Invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(&value)
                .map_err(|e| InferenceClientError::Config(format!("Invalid header value: {e}")))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| InferenceClientError::Config(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    async fn send<R>(&self, method: &str, endpoint: &str, request: RequestBuilder, input: Option<String>) -> Result<R, InferenceClientError>
    where
        R: DeserializeOwned + fmt::Debug,
    {
        let url = format!("{}{}", self.base_url, endpoint);

        let span = span!(
            Level::INFO,
            "Ollama HTTP Request",
            "langfuse.observation.name" = format!("{method} {endpoint}").as_str(),
            "langfuse.observation.type" = "span",
            "http.request.method" = method,
            "url.full" = url.as_str(),
            "server.address" = self.base_url.as_str(),
        );

        if let Some(body) = input {
            span.set_attribute("langfuse.observation.input", body);
        }

        async {
            let response = request.send().await.map_err(|e| {
                record_error(&Span::current(), &e.to_string());
                InferenceClientError::Request(e.to_string())
            })?;

            let status = response.status();
            debug!(%status, "received response");
            Span::current().set_attribute("http.response.status_code", status.as_u16() as i64);

            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Failed to read error body".into());

                error!(%status, body = %error_text, "request failed");
                Span::current().set_status(opentelemetry::trace::Status::Error {
                    description: format!("HTTP {status}").into(),
                });
                Span::current()
                    .set_attribute("langfuse.observation.status_message", error_text.clone());

                return Err(InferenceClientError::Api(format!(
                    "Ollama request failed: {status} - {error_text}"
                )));
            }

            let response_text = response.text().await.map_err(|e| {
                InferenceClientError::Request(format!("Failed to read response text: {e}"))
            })?;

            Span::current().set_attribute("langfuse.observation.output", response_text.clone());

            match serde_json::from_str::<R>(&response_text) {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    error!(%e, raw = %response_text, "deserialization error");
                    record_error(&Span::current(), "Deserialization Error");
                    Err(InferenceClientError::Serialization(format!(
                        "Error decoding response body: {e}. Raw JSON was: '{response_text}'"
                    )))
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn post<T, R>(&self, endpoint: &str, request_body: &T) -> Result<R, InferenceClientError>
    where
        T: serde::Serialize + fmt::Debug,
        R: DeserializeOwned + fmt::Debug,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        let input = serde_json::to_string(request_body).ok();
        self.send("POST", endpoint, self.client.post(&url).json(request_body), input)
            .await
    }

    async fn get<R>(&self, endpoint: &str) -> Result<R, InferenceClientError>
    where
        R: DeserializeOwned + fmt::Debug,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        self.send("GET", endpoint, self.client.get(&url), None).await
    }

    async fn post_stream<T, R>(&self, endpoint: &str, body: &T) -> Result<ResponseStream<R>, InferenceClientError>
    where
        T: serde::Serialize + fmt::Debug,
        R: DeserializeOwned + StreamedChunk + fmt::Debug + Send + 'static,
    {
        let url = format!("{}{}", self.base_url, endpoint);

        let span = span!(
            Level::INFO,
            "Ollama HTTP stream",
            "langfuse.observation.name" = format!("POST (Stream) {endpoint}").as_str(),
            "langfuse.observation.type" = "span",
            "http.request.method" = "POST",
            "url.full" = url.as_str(),
        );

        if let Ok(b) = serde_json::to_string(body) {
            span.set_attribute("langfuse.observation.input", b);
        }

        let stream_span = span.clone();

        let resp = async {
            let resp = self.client.post(&url).json(body).send().await.map_err(|e| {
                record_error(&Span::current(), &e.to_string());
                InferenceClientError::Request(e.to_string())
            })?;

            let status = resp.status();
            Span::current().set_attribute("http.response.status_code", status.as_u16() as i64);

            if !status.is_success() {
                let error_text = resp
                    .text()
                    .await
                    .unwrap_or_else(|_| "Failed to read error body".into());
                error!(%status, body = %error_text, "stream request failed");
                record_error(&Span::current(), &format!("HTTP {status}"));
                return Err(InferenceClientError::Api(format!(
                    "Ollama request failed: {status} - {error_text}"
                )));
            }
            Ok(resp)
        }
        .instrument(span)
        .await?;

        let lines = decode_ndjson::<_, _, _, R>(resp.bytes_stream());
        Ok(Box::pin(observe_stream(lines, stream_span)))
    }

    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, InferenceClientError> {
        self.post("/api/generate", &request).await
    }

    pub async fn generate_stream(&self, request: GenerateRequest) -> Result<ResponseStream<GenerateStreamChunk>, InferenceClientError> {
        self.post_stream("/api/generate", &request).await
    }

    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, InferenceClientError> {
        self.post("/api/chat", &request).await
    }

    pub async fn chat_stream(&self, request: ChatRequest) -> Result<ResponseStream<ChatStreamChunk>, InferenceClientError> {
        self.post_stream("/api/chat", &request).await
    }

    pub async fn list_models(&self) -> Result<ListModelsResponse, InferenceClientError> {
        self.get("/api/tags").await
    }
}

/// Splits a byte stream into newline-delimited JSON values.
///
/// Ollama terminates every object with `\n`, but network chunks may cut a
/// line anywhere, so bytes are buffered until a full line is available.
/// Blank lines are skipped and a trailing line without newline is still read.
pub(crate) fn decode_ndjson<S, B, E, R>(byte_stream: S) -> impl Stream<Item = Result<R, InferenceClientError>> + Send + 'static
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: fmt::Display + Send + 'static,
    R: DeserializeOwned + Send + 'static,
{
    try_stream! {
        let mut buf = Vec::<u8>::new();
        futures::pin_mut!(byte_stream);

        while let Some(chunk) = byte_stream.next().await {
            let chunk = chunk.map_err(|e| InferenceClientError::Request(e.to_string()))?;
            buf.extend_from_slice(chunk.as_ref());

            while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buf.drain(..=pos).collect();
                if let Some(parsed) = parse_line::<R>(&line)? {
                    yield parsed;
                }
            }
        }

        if let Some(parsed) = parse_line::<R>(&buf)? {
            yield parsed;
        }
    }
}

/// What span bookkeeping needs to know about a streamed chunk.
pub(crate) trait StreamedChunk {
    fn is_done(&self) -> bool;
    fn text(&self) -> &str;
}

impl StreamedChunk for ChatStreamChunk {
    fn is_done(&self) -> bool {
        self.done
    }

    fn text(&self) -> &str {
        self.content()
    }
}

impl StreamedChunk for GenerateResponse {
    fn is_done(&self) -> bool {
        self.done
    }

    fn text(&self) -> &str {
        &self.response
    }
}

/// Records output, chunk count and final status of a stream on its span.
///
/// The span is completed when the `done` chunk passes through, since
/// callers usually stop polling right after it.
fn observe_stream<S, R>(lines: S, stream_span: Span) -> impl Stream<Item = Result<R, InferenceClientError>> + Send + 'static
where
    S: Stream<Item = Result<R, InferenceClientError>> + Send + 'static,
    R: StreamedChunk + Send + 'static,
{
    try_stream! {
        futures::pin_mut!(lines);
        let mut chunk_count: i64 = 0;
        let mut output = String::new();
        let mut finished = false;

        while let Some(item) = lines.next().await {
            let parsed = item.map_err(|e| {
                error!(error = %e, "stream failed");
                record_error(&stream_span, &e.to_string());
                e
            })?;
            chunk_count += 1;
            output.push_str(parsed.text());

            if parsed.is_done() && !finished {
                finish_stream_span(&stream_span, chunk_count, &output);
                finished = true;
            }
            yield parsed;
        }

        if !finished {
            finish_stream_span(&stream_span, chunk_count, &output);
        }
    }
}

fn finish_stream_span(span: &Span, chunk_count: i64, output: &str) {
    span.set_attribute("stream.chunk_count", chunk_count);
    span.set_attribute("langfuse.observation.output", output.to_string());
    span.set_status(opentelemetry::trace::Status::Ok);
}

fn parse_line<R: DeserializeOwned>(line: &[u8]) -> Result<Option<R>, InferenceClientError> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(line).map(Some).map_err(|e| {
        InferenceClientError::Serialization(format!(
            "Error decoding stream line: {e}. Raw line was: '{}'",
            String::from_utf8_lossy(line).trim_end()
        ))
    })
}

fn record_error(span: &Span, error_message: &str) {
    span.set_attribute("otel.status_code", "ERROR");
    span.set_attribute("error.message", error_message.to_string());
    span.set_status(opentelemetry::trace::Status::Error {
        description: error_message.to_string().into(),
    });
}
