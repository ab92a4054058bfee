use crate::editor::sync::SyncPolicy;
use crate::render::manipulator::ManipulatorMode;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// 0xRRGGBB colors for the two highlight states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HighlightColors {
    pub neutral: u32,
    pub selected: u32,
}

impl Default for HighlightColors {
    fn default() -> Self {
        Self {
            neutral: 0x00ff00,
            selected: 0x0000ff,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub initial_mode: ManipulatorMode,
    pub sync_policy: SyncPolicy,
    pub highlight: HighlightColors,
}

pub fn parse_config(json: &str) -> Result<EditorConfig> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_config_from_file(path: &Path) -> Result<EditorConfig> {
    let json = std::fs::read_to_string(path)?;
    parse_config(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.initial_mode, ManipulatorMode::Translate);
        assert_eq!(config.sync_policy, SyncPolicy::Continuous);
    }

    #[test]
    fn partial_config_overrides_only_named_fields() {
        let config = parse_config(
            r#"{ "initial_mode": "rotate", "sync_policy": "trailing_edge", "highlight": { "selected": 16711680 } }"#,
        )
        .unwrap();
        assert_eq!(config.initial_mode, ManipulatorMode::Rotate);
        assert_eq!(config.sync_policy, SyncPolicy::TrailingEdge);
        assert_eq!(config.highlight.selected, 0xff0000);
        assert_eq!(config.highlight.neutral, 0x00ff00);
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = parse_config("{ initial_mode: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut path = std::env::temp_dir();
        path.push(format!("previz_sync_missing_{}.json", std::process::id()));
        let err = load_config_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn load_from_file() {
        let mut path = std::env::temp_dir();
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        path.push(format!(
            "previz_sync_config_{}_{}.json",
            std::process::id(),
            nonce
        ));
        std::fs::write(&path, r#"{ "initial_mode": "scale" }"#).unwrap();
        let config = load_config_from_file(&path).unwrap();
        assert_eq!(config.initial_mode, ManipulatorMode::Scale);
        let _ = std::fs::remove_file(path);
    }
}
