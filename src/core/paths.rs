//! core::paths
//!
//! Centralized path routing for the LLM user directory.
//!
//! # Storage Layout
//!
//! Templates and API keys live in the same user directory the `llm` tool
//! family shares, so existing template libraries keep working:
//! - `templates/<name>.yaml` - Stored prompt templates
//! - `keys.json` - Provider API keys
//!
//! # Resolution
//!
//! The user directory is chosen in this order:
//! 1. `user_dir` from the config file
//! 2. `$LLM_USER_PATH` if set
//! 3. `<config_dir>/io.datasette.llm` (platform config directory)
//!
//! # Example
//!
//! ```
//! use llmx::core::paths::LlmPaths;
//! use std::path::PathBuf;
//!
//! let paths = LlmPaths::new(PathBuf::from("/home/ada/.config/io.datasette.llm"));
//!
//! assert_eq!(
//!     paths.template_path("review"),
//!     PathBuf::from("/home/ada/.config/io.datasette.llm/templates/review.yaml")
//! );
//! ```

use std::path::{Path, PathBuf};

use super::config::ConfigError;

/// Environment variable overriding the user directory.
pub const USER_PATH_ENV: &str = "LLM_USER_PATH";

/// Directory name used under the platform config directory.
const APP_DIR_NAME: &str = "io.datasette.llm";

/// Centralized path routing for user-level storage.
///
/// No code outside this module should compute `*.join("templates")` or
/// `*.join("keys.json")` paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmPaths {
    /// Root of the user directory.
    pub user_dir: PathBuf,
}

impl LlmPaths {
    /// Create paths rooted at an explicit user directory.
    pub fn new(user_dir: PathBuf) -> Self {
        Self { user_dir }
    }

    /// Resolve the user directory.
    ///
    /// `configured` is the `user_dir` value from the config file, if any.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoHomeDir` if no location can be determined.
    pub fn discover(configured: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(dir) = configured {
            return Ok(Self::new(expand_home(dir)));
        }

        if let Ok(dir) = std::env::var(USER_PATH_ENV) {
            if !dir.is_empty() {
                return Ok(Self::new(PathBuf::from(dir)));
            }
        }

        let base = dirs::config_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(Self::new(base.join(APP_DIR_NAME)))
    }

    /// Directory holding stored templates.
    pub fn templates_dir(&self) -> PathBuf {
        self.user_dir.join("templates")
    }

    /// Path of the API keys file.
    pub fn keys_path(&self) -> PathBuf {
        self.user_dir.join("keys.json")
    }
}

/// Expand a leading `~` to the home directory.
///
/// Paths without a leading `~`, or when the home directory is unknown,
/// are returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_under_user_dir() {
        let paths = LlmPaths::new(PathBuf::from("/data/llm"));
        assert_eq!(paths.templates_dir(), PathBuf::from("/data/llm/templates"));
        assert_eq!(paths.keys_path(), PathBuf::from("/data/llm/keys.json"));
    }

    #[test]
    fn configured_dir_wins() {
        let paths = LlmPaths::discover(Some(Path::new("/opt/prompts"))).unwrap();
        assert_eq!(paths.user_dir, PathBuf::from("/opt/prompts"));
    }

    #[test]
    fn expand_home_leaves_absolute_paths() {
        assert_eq!(
            expand_home(Path::new("/etc/llm")),
            PathBuf::from("/etc/llm")
        );
    }

    #[test]
    fn expand_home_replaces_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/llm")), home.join("llm"));
        }
    }
}
