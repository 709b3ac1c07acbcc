//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! llmx has two configuration scopes:
//! - **Global**: User-level settings
//! - **Project**: Overrides for the current working directory
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$LLMX_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/llmx/config.toml`
//! 3. `~/.llmx/config.toml` (canonical write location)
//!
//! # Project Config Location
//!
//! `.llmx/config.toml` in the working directory.
//!
//! # Example
//!
//! ```no_run
//! use llmx::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/path/to/project"))).unwrap();
//! let config = result.config;
//!
//! println!("Markdown: {}", config.markdown());
//! println!("Timeout: {}s", config.timeout_secs());
//! ```

pub mod schema;

pub use schema::{CommandConfig, FileConfig, ProviderConfig, ProvidersConfig};

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::defaults::ParamValue;

/// Environment variable pointing at the global config file.
pub const CONFIG_ENV: &str = "LLMX_CONFIG";

/// Default request timeout for model API calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The file that triggered the warning, if known.
    pub path: Option<PathBuf>,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Which config file a write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    Global,
    Project,
}

/// Merged configuration from all sources.
///
/// This struct provides accessor methods that apply precedence rules
/// automatically. Project config overrides global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: FileConfig,
    /// Project configuration (if present)
    pub project: Option<FileConfig>,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    /// Path to the project config file (if loaded)
    project_path: Option<PathBuf>,
}

impl Config {
    /// Build a config from already parsed parts.
    pub fn from_parts(global: FileConfig, project: Option<FileConfig>) -> Self {
        Self {
            global,
            project,
            global_path: None,
            project_path: None,
        }
    }

    /// Load configuration from default locations.
    ///
    /// If `project_dir` is provided, also loads its project config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(project_dir: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let (global, global_path) = Self::load_global()?;

        let (project, project_path) = match project_dir {
            Some(dir) => Self::load_project(dir)?,
            None => (None, None),
        };
        let project =
            project.map(|p| Self::restrict_project(p, project_path.as_deref(), &mut warnings));

        global.validate()?;
        if let Some(ref p) = project {
            p.validate()?;
        }

        log::debug!(
            "config: global={:?} project={:?}",
            global_path,
            project_path
        );

        Ok(ConfigLoadResult {
            config: Config {
                global,
                project,
                global_path,
                project_path,
            },
            warnings,
        })
    }

    /// Load global configuration from standard locations.
    fn load_global() -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
        // 1. Check $LLMX_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 2. Check $XDG_CONFIG_HOME/llmx/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("llmx/config.toml");
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 3. Check ~/.llmx/config.toml
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".llmx/config.toml");
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((FileConfig::default(), None))
    }

    /// Load project configuration from the given directory.
    fn load_project(dir: &Path) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigError> {
        let path = Self::project_config_path(dir);
        if !path.exists() {
            return Ok((None, None));
        }
        let config = Self::read_config(&path)?;
        Ok((Some(config), Some(path)))
    }

    /// Drop global-only keys from a project file.
    ///
    /// A project file travels with the directory it sits in, so it may not
    /// redirect provider endpoints, key variables, or the user directory.
    fn restrict_project(
        mut config: FileConfig,
        path: Option<&Path>,
        warnings: &mut Vec<ConfigWarning>,
    ) -> FileConfig {
        for key in config.global_only_keys() {
            warnings.push(ConfigWarning {
                message: format!(
                    "ignoring '{}' in project config; it is only read from the global config",
                    key
                ),
                path: path.map(Path::to_path_buf),
            });
        }
        config.providers = None;
        config.user_dir = None;
        config
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for global config.
    ///
    /// Returns `$LLMX_CONFIG` when set, otherwise `~/.llmx/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".llmx/config.toml"))
    }

    /// Get the canonical path for project config.
    pub fn project_config_path(dir: &Path) -> PathBuf {
        dir.join(".llmx/config.toml")
    }

    /// Read the file for `scope` as it is on disk (defaults if absent).
    pub fn read_scope(scope: ConfigScope, dir: &Path) -> Result<(FileConfig, PathBuf), ConfigError> {
        let path = match scope {
            ConfigScope::Global => Self::global_config_path()?,
            ConfigScope::Project => Self::project_config_path(dir),
        };
        let config = if path.exists() {
            Self::read_config(&path)?
        } else {
            FileConfig::default()
        };
        Ok((config, path))
    }

    /// Validate and write a config file atomically.
    pub fn write_scope(
        scope: ConfigScope,
        dir: &Path,
        config: &FileConfig,
    ) -> Result<PathBuf, ConfigError> {
        config.validate()?;
        let path = match scope {
            ConfigScope::Global => Self::global_config_path()?,
            ConfigScope::Project => {
                if let Some(key) = config.global_only_keys().first() {
                    return Err(ConfigError::InvalidValue(format!(
                        "'{}' can only be set in the global config",
                        key
                    )));
                }
                Self::project_config_path(dir)
            }
        };
        Self::write_config_atomic(&path, config)?;
        Ok(path)
    }

    /// Write a config file atomically.
    fn write_config_atomic<T: serde::Serialize>(
        path: &Path,
        config: &T,
    ) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        // Write to temp file in same directory (for atomic rename)
        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    fn pick<T>(&self, f: impl Fn(&FileConfig) -> Option<T>) -> Option<T> {
        self.project.as_ref().and_then(&f).or_else(|| f(&self.global))
    }

    /// Configured user directory, if any. Global config only.
    pub fn user_dir(&self) -> Option<PathBuf> {
        self.global.user_dir.clone()
    }

    /// Whether responses render as markdown by default.
    ///
    /// Defaults to `true` if not configured.
    pub fn markdown(&self) -> bool {
        self.pick(|c| c.markdown).unwrap_or(true)
    }

    /// Whether piped stdin is wrapped for prompting.
    ///
    /// Defaults to `true` if not configured.
    pub fn format_stdin(&self) -> bool {
        self.pick(|c| c.format_stdin).unwrap_or(true)
    }

    /// Request timeout in seconds.
    ///
    /// Defaults to [`DEFAULT_TIMEOUT_SECS`] if not configured.
    pub fn timeout_secs(&self) -> u64 {
        self.pick(|c| c.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// Global parameter defaults, project values winning key by key.
    pub fn default_params(&self) -> BTreeMap<String, ParamValue> {
        let mut params = self.global.defaults.clone().unwrap_or_default();
        if let Some(project) = self.project.as_ref().and_then(|p| p.defaults.as_ref()) {
            params.extend(project.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        params
    }

    /// Command entries; a project entry replaces the global entry of the
    /// same name.
    pub fn commands(&self) -> BTreeMap<String, CommandConfig> {
        let mut commands = self.global.commands.clone().unwrap_or_default();
        if let Some(project) = self.project.as_ref().and_then(|p| p.commands.as_ref()) {
            commands.extend(project.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        commands
    }

    /// File that defines the command entry `name`, if known.
    pub fn command_defined_in(&self, name: &str) -> Option<PathBuf> {
        let in_project = self
            .project
            .as_ref()
            .and_then(|p| p.commands.as_ref())
            .is_some_and(|c| c.contains_key(name));
        if in_project {
            self.project_path.clone()
        } else {
            self.global_path.clone()
        }
    }

    /// Anthropic provider settings.
    pub fn anthropic(&self) -> ProviderConfig {
        self.provider(|p| p.anthropic.as_ref())
    }

    /// OpenAI provider settings.
    pub fn openai(&self) -> ProviderConfig {
        self.provider(|p| p.openai.as_ref())
    }

    /// Provider settings come from the global config only.
    fn provider(&self, f: impl Fn(&ProvidersConfig) -> Option<&ProviderConfig>) -> ProviderConfig {
        self.global
            .providers
            .as_ref()
            .and_then(f)
            .cloned()
            .unwrap_or_default()
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded project config file.
    pub fn project_config_loaded_from(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }
}
