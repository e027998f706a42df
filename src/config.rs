//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MAILTREE_CONFIG` (environment variable)
//! 2. `~/.config/mailtree/config.toml` (Linux/macOS)
//!    `%APPDATA%\mailtree\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Message tree building.
    pub parser: ParserConfig,
    /// Address validation.
    pub validation: ValidationConfig,
    /// CLI output.
    pub output: OutputConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Message tree building.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Most multipart containers allowed inside each other.
    pub max_depth: usize,
}

/// Address validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Require an MX or A record for the domain.
    pub use_dns: bool,
    /// Per-query DNS timeout in seconds.
    pub dns_timeout_secs: u64,
}

/// CLI output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format: "tree" or "json".
    pub format: String,
    /// Render HTML parts as plain text in tree output.
    pub html_as_text: bool,
    /// Longest content preview per part in tree output (0 = unlimited).
    pub preview_chars: usize,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: crate::parser::mime::MAX_DEPTH,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            use_dns: false,
            dns_timeout_secs: 5,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "tree".to_string(),
            html_as_text: true,
            preview_chars: 400,
        }
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MAILTREE_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("mailtree").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailtree")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.parser.max_depth, 10);
        assert!(!cfg.validation.use_dns);
        assert_eq!(cfg.output.format, "tree");
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let mut cfg = Config::default();
        cfg.parser.max_depth = 4;
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.parser.max_depth, 4);
        assert_eq!(parsed.output.preview_chars, cfg.output.preview_chars);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[validation]
use_dns = true

[output]
format = "json"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert!(cfg.validation.use_dns);
        assert_eq!(cfg.output.format, "json");
        // Other fields use defaults
        assert_eq!(cfg.validation.dns_timeout_secs, 5);
        assert_eq!(cfg.parser.max_depth, 10);
        assert!(cfg.output.html_as_text);
    }
}
