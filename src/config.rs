//! Preview configuration, loaded from TOML.
//!
//! Default location: `<config_dir>/apl-preview/config.toml`. A missing file
//! means all defaults; every section and key is optional.

use std::path::{Path, PathBuf};

/// Inclusive bounds for `preview.highlight_duration_ms`.
const HIGHLIGHT_RANGE_MS: std::ops::RangeInclusive<u64> = 1..=60_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Invalid(String),
    #[error("cannot read config {path}: {reason}")]
    Read { path: PathBuf, reason: String },
}

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct PreviewConfig {
    pub preview: PreviewSection,
    pub viewport: ViewportSection,
    pub storage: StorageSection,
}

/// `[preview]`: webview page and editor highlighting.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct PreviewSection {
    /// How long an activated component stays highlighted in the editor.
    pub highlight_duration_ms: u64,
    pub preview_script: String,
    pub viewhost_script: String,
}

impl Default for PreviewSection {
    fn default() -> Self {
        Self {
            highlight_duration_ms: 1000,
            preview_script: "assets/aplPreview.js".to_string(),
            viewhost_script: "node_modules/apl-viewhost-web/index.js".to_string(),
        }
    }
}

/// `[viewport]`: device selected when nothing has been persisted.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ViewportSection {
    /// Example device name from the viewport catalog; `None` keeps the
    /// catalog's own default.
    pub default_device: Option<String>,
}

/// `[storage]`
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct StorageSection {
    /// Persist state to this file; in-memory only when absent.
    pub state_file: Option<PathBuf>,
}

impl PreviewConfig {
    pub fn highlight_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.preview.highlight_duration_ms)
    }
}

pub fn parse(toml_str: &str) -> Result<PreviewConfig, ConfigError> {
    let cfg: PreviewConfig =
        toml::from_str(toml_str).map_err(|e| ConfigError::Invalid(e.to_string()))?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &PreviewConfig) -> Result<(), ConfigError> {
    if !HIGHLIGHT_RANGE_MS.contains(&cfg.preview.highlight_duration_ms) {
        return Err(ConfigError::Invalid(format!(
            "preview.highlight_duration_ms must be between {} and {}, got {}",
            HIGHLIGHT_RANGE_MS.start(),
            HIGHLIGHT_RANGE_MS.end(),
            cfg.preview.highlight_duration_ms
        )));
    }
    if cfg.preview.preview_script.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "preview.preview_script must not be empty".to_string(),
        ));
    }
    if cfg.preview.viewhost_script.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "preview.viewhost_script must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Load `path`, or defaults when it does not exist.
pub fn load(path: &Path) -> Result<PreviewConfig, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(PreviewConfig::default());
        }
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };
    let cfg = parse(&text)?;
    tracing::info!("loaded config from {}", path.display());
    Ok(cfg)
}

/// `<config_dir>/apl-preview/config.toml`, if the platform has a config dir.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("apl-preview").join("config.toml"))
}

/// Load from [`default_path`], falling back to defaults.
pub fn load_default() -> Result<PreviewConfig, ConfigError> {
    match default_path() {
        Some(path) => load(&path),
        None => Ok(PreviewConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = parse("").expect("empty config is valid");
        assert_eq!(cfg, PreviewConfig::default());
        assert_eq!(cfg.preview.highlight_duration_ms, 1000);
        assert!(cfg.viewport.default_device.is_none());
        assert!(cfg.storage.state_file.is_none());
    }

    #[test]
    fn full_config_parses_successfully() {
        let cfg = parse(
            r#"
[preview]
highlight_duration_ms = 2500
preview_script = "dist/preview.js"
viewhost_script = "dist/viewhost.js"

[viewport]
default_device = "Echo Spot"

[storage]
state_file = "/var/tmp/apl-state.json"
"#,
        )
        .expect("valid config");
        assert_eq!(cfg.highlight_duration(), std::time::Duration::from_millis(2500));
        assert_eq!(cfg.preview.preview_script, "dist/preview.js");
        assert_eq!(cfg.viewport.default_device.as_deref(), Some("Echo Spot"));
        assert_eq!(
            cfg.storage.state_file,
            Some(PathBuf::from("/var/tmp/apl-state.json"))
        );
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = parse("[preview]\nhighlight_duration_ms = 50\n").expect("valid config");
        assert_eq!(cfg.preview.preview_script, "assets/aplPreview.js");
    }

    #[test]
    fn invalid_toml_returns_config_error() {
        let result = parse("[preview\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_highlight_duration_is_rejected() {
        let err = parse("[preview]\nhighlight_duration_ms = 0\n").expect_err("out of range");
        assert!(err.to_string().contains("highlight_duration_ms"));
    }

    #[test]
    fn excessive_highlight_duration_is_rejected() {
        assert!(parse("[preview]\nhighlight_duration_ms = 60001\n").is_err());
        assert!(parse("[preview]\nhighlight_duration_ms = 60000\n").is_ok());
    }

    #[test]
    fn blank_script_is_rejected() {
        assert!(parse("[preview]\npreview_script = \"  \"\n").is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = load(&dir.path().join("config.toml")).expect("defaults");
        assert_eq!(cfg, PreviewConfig::default());
    }

    #[test]
    fn load_reads_and_validates_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[preview]\nhighlight_duration_ms = 0\n").expect("write");
        assert!(matches!(load(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn directory_path_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(load(dir.path()), Err(ConfigError::Read { .. })));
    }
}
