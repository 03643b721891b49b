use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A selectable model and the asset key it loads from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub id: String,
    pub name: String,
    pub url: String,
    /// XOR-obfuscated copy of the asset, when one is published
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfuscated_url: Option<String>,
}

impl ModelConfig {
    pub fn new(id: &str, name: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            obfuscated_url: None,
        }
    }

    pub fn with_obfuscated_url(mut self, url: &str) -> Self {
        self.obfuscated_url = Some(url.to_string());
        self
    }
}

pub const DEFAULT_MODEL_ID: &str = "chair";

/// Built-in catalog
pub fn available_models() -> Vec<ModelConfig> {
    vec![
        ModelConfig::new("chair", "Chair", "/blender-compressed/chair-transformed.glb.gz")
            .with_obfuscated_url("/blender-compressed/chair-transformed-obfuscated.glb"),
        ModelConfig::new("chair2", "Chair 2", "/chair2.glb.gz"),
    ]
}

pub fn find_model<'a>(catalog: &'a [ModelConfig], id: &str) -> Option<&'a ModelConfig> {
    catalog.iter().find(|model| model.id == id)
}

/// Reads a JSON array of models, replacing the built-in catalog
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<ModelConfig>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read model catalog: {:?}", path))?;
    let catalog: Vec<ModelConfig> = serde_json::from_str(&text)
        .with_context(|| format!("Invalid model catalog: {:?}", path))?;

    if catalog.is_empty() {
        anyhow::bail!("Model catalog {:?} is empty", path);
    }
    Ok(catalog)
}
