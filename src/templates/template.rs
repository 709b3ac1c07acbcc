//! templates::template
//!
//! A single loaded template.
//!
//! # Format
//!
//! A template file is either YAML with any of these keys:
//!
//! ```yaml
//! system: You are a careful reviewer.
//! prompt: |
//!   Review the following change for {{focus}}:
//!
//!   {{input}}
//! model: anthropic/claude-3-7-sonnet-latest
//! defaults:
//!   focus: correctness
//! options:
//!   temperature: 0.2
//! ```
//!
//! or plain text, in which case the whole content is the prompt. YAML that
//! carries neither `prompt` nor `system` is treated as plain text as well.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::interpolate::Bindings;
use super::TemplateError;
use crate::defaults::{Overrides, ParamValue, MODEL_KEY};

/// Where a template was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Looked up by name in the template store.
    Store(PathBuf),
    /// Addressed by filesystem path.
    File(PathBuf),
    /// Built in memory.
    Inline,
}

/// On-disk YAML shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TemplateFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, serde_yaml::Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, ParamValue>,
}

/// A loaded, immutable template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// Name used to reference the template (file stem for paths).
    pub name: String,
    pub source: TemplateSource,
    pub system: Option<String>,
    pub prompt: Option<String>,
    /// Default variable bindings.
    pub defaults: Bindings,
    /// Parameter options, including `model` when the template names one.
    pub options: Overrides,
}

impl Template {
    /// Parse template content.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::Invalid` if the content is a YAML template
    /// whose fields have the wrong shape.
    pub fn parse(
        name: impl Into<String>,
        source: TemplateSource,
        content: &str,
    ) -> Result<Self, TemplateError> {
        let name = name.into();

        if !is_yaml_template(content) {
            return Ok(Self::plain(name, source, content));
        }

        let file: TemplateFile =
            serde_yaml::from_str(content).map_err(|e| TemplateError::Invalid {
                name: name.clone(),
                message: e.to_string(),
            })?;

        let mut defaults = Bindings::new();
        for (key, value) in file.defaults {
            let rendered = scalar_to_string(&value).ok_or_else(|| TemplateError::Invalid {
                name: name.clone(),
                message: format!("default for '{}' must be a scalar", key),
            })?;
            defaults.insert(key, rendered);
        }

        let mut options: Overrides = file.options.into_iter().collect();
        if let Some(model) = file.model {
            options.insert(MODEL_KEY, ParamValue::Text(model));
        }

        Ok(Self {
            name,
            source,
            system: file.system,
            prompt: file.prompt,
            defaults,
            options,
        })
    }

    /// A template whose whole content is the prompt.
    pub fn plain(name: impl Into<String>, source: TemplateSource, content: &str) -> Self {
        Self {
            name: name.into(),
            source,
            system: None,
            prompt: Some(content.to_string()),
            defaults: Bindings::new(),
            options: Overrides::new(),
        }
    }

    /// Main text of the template: the prompt, or the system prompt if there
    /// is no prompt.
    pub fn body(&self) -> Option<&str> {
        self.prompt.as_deref().or(self.system.as_deref())
    }
}

/// Whether content is a YAML mapping with a `prompt` or `system` key.
pub fn is_yaml_template(content: &str) -> bool {
    match serde_yaml::from_str::<serde_yaml::Value>(content) {
        Ok(serde_yaml::Value::Mapping(map)) => {
            map.contains_key("prompt") || map.contains_key("system")
        }
        _ => false,
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Render content for storage as a template file.
///
/// YAML templates are validated and returned unchanged; anything else is
/// stored as the `prompt` of a new template.
pub fn to_storage(name: &str, content: &str) -> Result<String, TemplateError> {
    if is_yaml_template(content) {
        Template::parse(name, TemplateSource::Inline, content)?;
        return Ok(content.to_string());
    }

    let file = TemplateFile {
        prompt: Some(content.to_string()),
        ..Default::default()
    };
    serde_yaml::to_string(&file).map_err(|e| TemplateError::Invalid {
        name: name.to_string(),
        message: e.to_string(),
    })
}
