use pagecraft_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "pagecraft.config.json";

/// Pagecraft configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Backend the `fetch` command talks to
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Bearer token for authenticated endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Session tunables used by `apply`
    #[serde(default)]
    pub editor: EditorConfig,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            token: None,
            editor: EditorConfig::default(),
        }
    }
}
