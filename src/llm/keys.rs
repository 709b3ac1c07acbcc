//! llm::keys
//!
//! API key lookup.
//!
//! A key comes from the provider's environment variable when it is set and
//! non-empty, otherwise from `keys.json` in the user directory. The keys
//! file is a flat JSON object:
//!
//! ```json
//! { "anthropic": "sk-ant-...", "openai": "sk-..." }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::{LlmError, Provider};

/// Find the API key for `provider`.
///
/// `env_var` is the variable to check first; `keys_path` is the keys file.
///
/// # Errors
///
/// - `LlmError::KeysFile` if the keys file exists but is unreadable or not
///   a JSON object of strings
/// - `LlmError::MissingKey` if no key is found
pub fn find_key(provider: Provider, env_var: &str, keys_path: &Path) -> Result<String, LlmError> {
    if let Ok(key) = std::env::var(env_var) {
        if !key.trim().is_empty() {
            log::debug!("using {} key from ${}", provider, env_var);
            return Ok(key.trim().to_string());
        }
    }

    let keys = read_keys(keys_path)?;
    for alias in provider.key_aliases() {
        if let Some(key) = keys.get(*alias).filter(|k| !k.trim().is_empty()) {
            log::debug!("using {} key '{}' from {}", provider, alias, keys_path.display());
            return Ok(key.trim().to_string());
        }
    }

    Err(LlmError::MissingKey {
        provider: provider.to_string(),
        env_var: env_var.to_string(),
        keys_path: keys_path.to_path_buf(),
    })
}

fn read_keys(path: &Path) -> Result<BTreeMap<String, String>, LlmError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => {
            return Err(LlmError::KeysFile {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    };

    serde_json::from_str(&content).map_err(|e| LlmError::KeysFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
