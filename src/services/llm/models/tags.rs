use serde::{Deserialize, Serialize};

/// Response from `GET /api/tags`: the models installed on the server.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ListModelsResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ModelInfo {
    #[serde(default)]
    pub name: String,
    /// Full model tag, e.g. `qwen3:0.6b`.
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl ModelInfo {
    /// Model family: the tag without its `:variant` suffix.
    pub fn family(&self) -> &str {
        self.model.split(':').next().unwrap_or_default()
    }
}
