use clap::Parser;

use crate::observability::LangfuseOptions;
use crate::services::llm::{
    ClientBuilder, ClientConfig, InferenceClient, InferenceClientError, InferenceOptions, DEFAULT_BASE_URL,
};
use crate::session::request_generation::RequestParams;

/// Options shared by every program in this crate.
#[derive(Debug, Clone, Parser)]
pub struct CliArgs {
    /// Model to use; each program has its own default.
    #[arg(long, env = "OLLAMA_MODEL")]
    pub model: Option<String>,

    /// Address of the Ollama server.
    #[arg(long, env = "OLLAMA_HOST", default_value = DEFAULT_BASE_URL)]
    pub host: String,

    /// Bearer token for servers behind an authenticating proxy.
    #[arg(long, env = "OLLAMA_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// How long the server keeps the model loaded after a request, e.g. `10m`.
    #[arg(long, env = "OLLAMA_KEEP_ALIVE")]
    pub keep_alive: Option<String>,

    #[arg(long)]
    pub temperature: Option<f32>,

    #[arg(long)]
    pub seed: Option<i32>,

    /// Context window size in tokens.
    #[arg(long)]
    pub num_ctx: Option<u32>,

    #[arg(long)]
    pub num_predict: Option<i32>,

    #[arg(long, env = "LANGFUSE_PUBLIC_KEY", hide_env_values = true)]
    pub langfuse_public_key: Option<String>,

    #[arg(long, env = "LANGFUSE_SECRET_KEY", hide_env_values = true)]
    pub langfuse_secret_key: Option<String>,

    #[arg(long, env = "LANGFUSE_HOST")]
    pub langfuse_host: Option<String>,
}

impl CliArgs {
    pub fn model_or(&self, default: &str) -> String {
        self.model.clone().unwrap_or_else(|| default.to_string())
    }

    /// Request parameters for `default_model` unless `--model` overrides it.
    ///
    /// Options are only sent when at least one of them was given.
    pub fn request_params(&self, default_model: &str) -> RequestParams {
        let options = InferenceOptions {
            num_ctx: self.num_ctx,
            temperature: self.temperature,
            seed: self.seed,
            num_predict: self.num_predict,
        };
        RequestParams {
            options: (options != InferenceOptions::default()).then_some(options),
            keep_alive: self.keep_alive.clone(),
            ..RequestParams::from(self.model_or(default_model))
        }
    }

    pub fn client(&self) -> Result<InferenceClient, InferenceClientError> {
        ClientConfig::default()
            .base_url(Some(self.host.clone()))
            .api_key(self.api_key.clone())
            .build()
    }

    /// Langfuse settings, present only when both keys are set.
    pub fn langfuse(&self) -> Option<LangfuseOptions> {
        match (&self.langfuse_public_key, &self.langfuse_secret_key) {
            (Some(public_key), Some(secret_key)) => Some(LangfuseOptions {
                public_key: public_key.clone(),
                secret_key: secret_key.clone(),
                host: self.langfuse_host.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = CliArgs::try_parse_from([
            "chat_history_stream",
            "--model",
            "qwen3:4b",
            "--host",
            "http://gpu-box:11434",
        ])
        .unwrap();
        assert_eq!(args.model_or("llama3.2:1b"), "qwen3:4b");
        assert_eq!(args.client().unwrap().base_url(), "http://gpu-box:11434");
    }

    #[test]
    fn model_falls_back_to_program_default() {
        let args = CliArgs::try_parse_from(["generate", "--host", "http://localhost:11434"]).unwrap();
        let args = CliArgs { model: None, ..args };
        assert_eq!(args.model_or("llama3.2:1b"), "llama3.2:1b");
    }

    #[test]
    fn sampling_flags_become_request_options() {
        let args = CliArgs::try_parse_from([
            "chat_history_stream",
            "--temperature",
            "0.3",
            "--num-ctx",
            "4096",
            "--keep-alive",
            "10m",
        ])
        .unwrap();
        let params = args.request_params("llama3.2:1b");
        assert_eq!(params.keep_alive.as_deref(), Some("10m"));
        assert_eq!(
            params.options,
            Some(InferenceOptions {
                temperature: Some(0.3),
                num_ctx: Some(4096),
                ..Default::default()
            })
        );
    }

    #[test]
    fn no_sampling_flags_send_no_options() {
        let args = CliArgs::try_parse_from(["generate"]).unwrap();
        let args = CliArgs { keep_alive: None, ..args };
        let params = args.request_params("llama3.2:1b");
        assert!(params.options.is_none());
        assert!(params.keep_alive.is_none());
    }

    #[test]
    fn unusable_api_key_fails_when_building_the_client() {
        let args = CliArgs {
            api_key: Some("bad\nkey".into()),
            ..CliArgs::try_parse_from(["generate"]).unwrap()
        };
        assert!(matches!(args.client(), Err(InferenceClientError::Config(_))));
    }

    #[test]
    fn langfuse_needs_both_keys() {
        let base = CliArgs::try_parse_from(["generate"]).unwrap();

        let half = CliArgs {
            langfuse_public_key: Some("pk".into()),
            langfuse_secret_key: None,
            ..base.clone()
        };
        assert!(half.langfuse().is_none());

        let full = CliArgs {
            langfuse_public_key: Some("pk".into()),
            langfuse_secret_key: Some("sk".into()),
            langfuse_host: Some("https://langfuse.internal".into()),
            ..base
        };
        let options = full.langfuse().unwrap();
        assert_eq!(options.public_key, "pk");
        assert_eq!(options.host.as_deref(), Some("https://langfuse.internal"));
    }
}
