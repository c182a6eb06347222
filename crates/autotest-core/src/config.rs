//! Configuration
//!
//! Precedence, highest first: CLI flags (applied by the caller through the
//! `with_*` builders), environment, TOML file, defaults.
//!
//! Environment keys:
//! - `OPENAI_API_KEY`
//! - `OPENAI_BASE_URL`
//! - `AUTOTEST_MODEL`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "autotest.toml";

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_MODEL: &str = "AUTOTEST_MODEL";

/// Errors loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("no API key configured (set OPENAI_API_KEY)")]
    MissingApiKey,
}

/// Settings for model access and file locations
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutotestConfig {
    /// Chat model name
    pub model: String,
    pub temperature: f32,
    /// Base URL of the OpenAI-compatible API, without `/chat/completions`
    pub api_base: String,
    /// Never written back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    /// Directory holding `<name>_prompt.md` templates
    pub prompts_dir: PathBuf,
    /// Root the generated test tree is written under
    pub tests_dir: PathBuf,
}

impl Default for AutotestConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4.1-mini".to_string(),
            temperature: 0.0,
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            request_timeout_secs: 120,
            prompts_dir: PathBuf::from("prompts"),
            tests_dir: PathBuf::from("tests"),
        }
    }
}

impl std::fmt::Debug for AutotestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutotestConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("prompts_dir", &self.prompts_dir)
            .field("tests_dir", &self.tests_dir)
            .finish()
    }
}

impl AutotestConfig {
    /// Parse TOML text; absent keys keep their defaults
    ///
    /// # Errors
    /// [`ConfigError::Parse`] attributed to `origin`.
    pub fn from_toml_str(text: &str, origin: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(origin.into(), e))
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Io`] or [`ConfigError::Parse`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.into(), e))?;
        Self::from_toml_str(&text, path)
    }

    /// Load file layer then environment layer
    ///
    /// An explicit path must exist; otherwise `autotest.toml` is used when
    /// present and defaults when not.
    ///
    /// # Errors
    /// File read or parse failures.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let candidate = Path::new(DEFAULT_CONFIG_FILE);
                if candidate.exists() {
                    Self::from_file(candidate)?
                } else {
                    Self::default()
                }
            }
        };
        Ok(base.apply_env())
    }

    /// Apply the process environment
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides from an arbitrary lookup
    #[must_use]
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(base) = non_empty(ENV_BASE_URL) {
            self.api_base = base;
        }
        if let Some(model) = non_empty(ENV_MODEL) {
            self.model = model;
        }
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub fn with_prompts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompts_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_tests_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tests_dir = dir.into();
        self
    }

    /// API key, required before any model call
    ///
    /// # Errors
    /// [`ConfigError::MissingApiKey`] if none is configured.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }
}
