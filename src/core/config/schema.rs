//! core::config::schema
//!
//! Configuration schema types.
//!
//! The same schema is used for the global (user) file and the project file;
//! the project file overrides the global one key by key. `user_dir` and
//! `providers` are global-only and are ignored in a project file.
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., `api_base` must be an http(s) URL).

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::defaults::{ParamSet, ParamValue};

/// One configuration file.
///
/// # Example
///
/// ```toml
/// markdown = true
/// format_stdin = true
/// timeout_secs = 120
///
/// [defaults]
/// model = "anthropic/claude-3-7-sonnet-latest"
/// temperature = 0.0
///
/// [commands.chat.params]
/// temperature = 0.7
///
/// [providers.openai]
/// api_base = "https://api.openai.com"
/// api_key_env = "OPENAI_API_KEY"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Override of the user directory holding templates and keys
    pub user_dir: Option<PathBuf>,

    /// Render responses as markdown when stdout is a terminal
    pub markdown: Option<bool>,

    /// Wrap piped stdin content for prompting
    pub format_stdin: Option<bool>,

    /// Request timeout for model API calls
    pub timeout_secs: Option<u64>,

    /// Global parameter defaults
    pub defaults: Option<BTreeMap<String, ParamValue>>,

    /// Per-command parameter defaults and preset definitions
    pub commands: Option<BTreeMap<String, CommandConfig>>,

    /// Provider endpoints and key variables
    pub providers: Option<ProvidersConfig>,
}

impl FileConfig {
    /// Keys set here that only the global config may carry.
    pub fn global_only_keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.user_dir.is_some() {
            keys.push("user_dir");
        }
        if self.providers.is_some() {
            keys.push("providers");
        }
        keys
    }

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        if let Some(defaults) = &self.defaults {
            validate_params("defaults", defaults)?;
        }

        if let Some(commands) = &self.commands {
            for (name, command) in commands {
                if name.is_empty() || name.chars().any(char::is_whitespace) {
                    return Err(ConfigError::InvalidValue(format!(
                        "invalid command name '{}'",
                        name
                    )));
                }
                command.validate(name)?;
            }
        }

        if let Some(providers) = &self.providers {
            providers.validate()?;
        }

        Ok(())
    }
}

fn validate_params(scope: &str, params: &BTreeMap<String, ParamValue>) -> Result<(), ConfigError> {
    let set: ParamSet = params.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    set.validate()
        .map_err(|e| ConfigError::InvalidValue(format!("{}: {}", scope, e)))
}

/// Defaults and preset definition for one command.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CommandConfig {
    /// Help text shown when listing presets
    pub description: Option<String>,

    /// Templates run as the system prompt (first is primary)
    pub templates: Option<Vec<String>>,

    /// Treat arguments as a shell command whose output is the input
    pub shell: Option<bool>,

    /// Parameter defaults for this command
    pub params: Option<BTreeMap<String, ParamValue>>,
}

impl CommandConfig {
    /// Validate one command entry.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if let Some(templates) = &self.templates {
            if templates.is_empty() {
                return Err(ConfigError::InvalidValue(format!(
                    "commands.{}.templates cannot be empty",
                    name
                )));
            }
            if templates.iter().any(|t| t.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(format!(
                    "commands.{}.templates contains an empty reference",
                    name
                )));
            }
        }

        if let Some(params) = &self.params {
            validate_params(&format!("commands.{}.params", name), params)?;
        }

        Ok(())
    }
}

/// Provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProvidersConfig {
    pub anthropic: Option<ProviderConfig>,
    pub openai: Option<ProviderConfig>,
}

impl ProvidersConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(p) = &self.anthropic {
            p.validate("anthropic")?;
        }
        if let Some(p) = &self.openai {
            p.validate("openai")?;
        }
        Ok(())
    }
}

/// Settings for a single provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// API base URL (scheme and host, no trailing path)
    pub api_base: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
}

impl ProviderConfig {
    pub fn validate(&self, provider: &str) -> Result<(), ConfigError> {
        if let Some(base) = &self.api_base {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "providers.{}.api_base must be an http(s) URL, got '{}'",
                    provider, base
                )));
            }
        }

        if let Some(var) = &self.api_key_env {
            if var.is_empty() {
                return Err(ConfigError::InvalidValue(format!(
                    "providers.{}.api_key_env cannot be empty",
                    provider
                )));
            }
        }

        Ok(())
    }
}
