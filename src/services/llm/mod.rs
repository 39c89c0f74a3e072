pub mod client;
pub mod client_config;
pub mod models;
pub mod providers;

pub use client::{InferenceBackend, InferenceClient};
pub use client_config::{ClientBuilder, ClientConfig};
pub use models::*;
pub use providers::ollama::{ResponseStream, DEFAULT_BASE_URL};
