//! Configuration validation.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openrouter.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "openrouter.model must not be empty".into(),
            ));
        }
        if self
            .openrouter
            .fallback_models
            .iter()
            .any(|m| m.trim().is_empty())
        {
            return Err(ConfigError::ValidationError(
                "openrouter.fallback_models must not contain empty entries".into(),
            ));
        }
        if self.openrouter.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "openrouter.timeout_ms must be > 0".into(),
            ));
        }
        if self.bedrock.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "bedrock.timeout_ms must be > 0".into(),
            ));
        }
        if self.assistant.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "assistant.timeout_ms must be > 0".into(),
            ));
        }
        if self.general.locate_prompt_file.is_empty() || self.general.describe_prompt_file.is_empty()
        {
            return Err(ConfigError::ValidationError(
                "general prompt file names must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let mut config = Config::default();
        config.openrouter.model = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("openrouter.model"));
    }

    #[test]
    fn test_validate_rejects_empty_fallback_entry() {
        let mut config = Config::default();
        config.openrouter.fallback_models.push(String::new());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fallback_models"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.openrouter.timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("openrouter.timeout_ms"));

        let mut config = Config::default();
        config.bedrock.timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("bedrock.timeout_ms"));

        let mut config = Config::default();
        config.assistant.timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("assistant.timeout_ms"));
    }

    #[test]
    fn test_empty_fallback_list_is_allowed() {
        let mut config = Config::default();
        config.openrouter.fallback_models.clear();
        assert!(config.validate().is_ok());
    }
}
