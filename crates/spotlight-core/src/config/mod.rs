//! Configuration management for Spotlight.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a missing file or a
//! partial file both work.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Spotlight.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Image-understanding provider settings
    pub openrouter: OpenRouterConfig,

    /// Video-understanding provider settings
    pub bedrock: BedrockConfig,

    /// Chat-assistant platform settings
    pub assistant: AssistantConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.spotlight.spotlight/config.toml
    /// - Linux: ~/.config/spotlight/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\spotlight\config\config.toml
    ///
    /// Falls back to ~/.spotlight/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "spotlight", "spotlight")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".spotlight").join("config.toml")
            })
    }

    /// Get the resolved prompt directory (with ~ expansion).
    pub fn prompt_dir(&self) -> PathBuf {
        let path_str = self.general.prompt_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Path of the locate-main prompt file.
    pub fn locate_prompt_path(&self) -> PathBuf {
        self.prompt_dir().join(&self.general.locate_prompt_file)
    }

    /// Path of the describe prompt file.
    pub fn describe_prompt_path(&self) -> PathBuf {
        self.prompt_dir().join(&self.general.describe_prompt_file)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
///
/// Plain values pass through; empty values and unset variables yield `None`.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Pick an explicit setting if non-empty, else the named environment variable.
pub fn setting_or_env(value: Option<&str>, env_var: &str) -> Option<String> {
    value
        .filter(|v| !v.is_empty())
        .map(String::from)
        .or_else(|| std::env::var(env_var).ok().filter(|v| !v.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.openrouter.model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.openrouter.fallback_models.len(), 5);
        assert_eq!(config.openrouter.timeout_ms, 60_000);
        assert_eq!(config.general.locate_prompt_file, "locateMain.txt");
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[openrouter]"));
        assert!(toml.contains("[bedrock]"));
        assert!(toml.contains("[assistant]"));
        assert!(toml.contains("${BACKBOARD_API_KEY}"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[openrouter]\nmodel = \"google/gemini-2.5-flash\"\n\n[bedrock]\nregion = \"eu-west-1\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.openrouter.model, "google/gemini-2.5-flash");
        assert_eq!(config.openrouter.fallback_models.len(), 5);
        assert_eq!(config.bedrock.region, "eu-west-1");
        assert_eq!(config.bedrock.max_payload_mb, 36);
    }

    #[test]
    fn test_load_from_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[openrouter\nmodel = ").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_prompt_paths_join_prompt_dir() {
        let mut config = Config::default();
        config.general.prompt_dir = PathBuf::from("/srv/prompts");
        assert_eq!(
            config.locate_prompt_path(),
            PathBuf::from("/srv/prompts/locateMain.txt")
        );
        assert_eq!(
            config.describe_prompt_path(),
            PathBuf::from("/srv/prompts/describe.txt")
        );
    }

    #[test]
    fn test_resolve_env_var() {
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        assert_eq!(resolve_env_var(""), None);
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_SPOTLIGHT_123}"), None);
    }

    #[test]
    fn test_setting_or_env_prefers_explicit_value() {
        assert_eq!(
            setting_or_env(Some("us-east-1"), "DEFINITELY_NOT_SET_SPOTLIGHT_456"),
            Some("us-east-1".to_string())
        );
        assert_eq!(
            setting_or_env(Some(""), "DEFINITELY_NOT_SET_SPOTLIGHT_456"),
            None
        );
        assert_eq!(setting_or_env(None, "DEFINITELY_NOT_SET_SPOTLIGHT_456"), None);
    }
}
