use serde::{Deserialize, Serialize};

/// Tunables of an editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Quiet period before a dirty document is auto-saved
    pub auto_save_delay_ms: u64,

    /// Quiet period before the outline follows free-text edits
    pub outline_debounce_ms: u64,

    /// Quiet period before free-text edits become a history entry
    pub text_history_debounce_ms: u64,

    /// Maximum history entries kept (0 = unlimited)
    pub history_limit: usize,

    /// Smallest box a resize can produce
    pub min_width: f64,
    pub min_height: f64,

    /// Edge length of a resize handle in pixels
    pub handle_size: f64,

    /// Upload size limit used when the caller gives none
    pub upload_limit_mb: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            auto_save_delay_ms: 2000,
            outline_debounce_ms: 300,
            text_history_debounce_ms: 300,
            history_limit: 200,
            min_width: 50.0,
            min_height: 30.0,
            handle_size: 10.0,
            upload_limit_mb: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{ "autoSaveDelayMs": 500, "historyLimit": 0 }"#;
        let config: EditorConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.auto_save_delay_ms, 500);
        assert_eq!(config.history_limit, 0);
        assert_eq!(config.outline_debounce_ms, 300);
        assert_eq!(config.min_width, 50.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(EditorConfig::default()).unwrap();
        assert_eq!(json["uploadLimitMb"], 5.0);
        assert_eq!(json["minHeight"], 30.0);
    }
}
