//! defaults
//!
//! Per-command baseline invocation parameters and override resolution.
//!
//! # Precedence
//!
//! Parameters are resolved in this order (later overrides earlier):
//! 1. Built-in global defaults
//! 2. `[defaults]` from the config file
//! 3. Built-in and configured per-command defaults
//! 4. Overrides (template options, then CLI flags)
//!
//! A command with no entry of its own resolves against the global set.
//!
//! # Typing
//!
//! Every value is a [`ParamValue`]. When an override targets a key that has
//! a default, the override is coerced to the default's [`ParamKind`]; a value
//! that cannot be coerced is rejected with [`DefaultsError::InvalidOverride`].
//!
//! # Example
//!
//! ```
//! use llmx::defaults::{Defaults, Overrides, ParamValue};
//!
//! let defaults = Defaults::builtin();
//! let mut overrides = Overrides::new();
//! overrides.insert_raw("temperature", "0.7");
//!
//! let params = defaults.resolve("prompt", &overrides).unwrap();
//! assert_eq!(params.get("temperature"), Some(&ParamValue::Float(0.7)));
//! assert_eq!(params.model(), Some("anthropic/claude-3-7-sonnet-latest"));
//! ```

pub mod presets;

pub use presets::{Preset, Presets};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::Config;

/// Default model for ordinary commands.
pub const DEFAULT_MODEL: &str = "anthropic/claude-3-7-sonnet-latest";

/// Default model for the built-in preset commands.
pub const PRESET_MODEL: &str = "anthropic/claude-3-sonnet-20240229";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.0;

/// Parameter key holding the model id.
pub const MODEL_KEY: &str = "model";

/// Parameter key holding the sampling temperature.
pub const TEMPERATURE_KEY: &str = "temperature";

/// Parameter key holding the response token limit.
pub const MAX_TOKENS_KEY: &str = "max_tokens";

/// Errors from parameter resolution.
#[derive(Debug, Error, PartialEq)]
pub enum DefaultsError {
    #[error("invalid value for '{key}': expected {expected}, got '{value}'")]
    InvalidOverride {
        key: String,
        expected: ParamKind,
        value: String,
    },

    #[error("invalid value for '{key}': {reason}")]
    OutOfRange { key: String, reason: String },
}

/// The kind of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Bool,
    Int,
    Float,
    Text,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Bool => "a boolean",
            ParamKind::Int => "an integer",
            ParamKind::Float => "a number",
            ParamKind::Text => "text",
        };
        f.write_str(name)
    }
}

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// The kind of this value.
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Bool(_) => ParamKind::Bool,
            ParamValue::Int(_) => ParamKind::Int,
            ParamValue::Float(_) => ParamKind::Float,
            ParamValue::Text(_) => ParamKind::Text,
        }
    }

    /// Infer a typed value from raw command-line text.
    ///
    /// Used for keys that have no default to coerce against.
    pub fn infer(raw: &str) -> Self {
        if let Some(b) = parse_bool_literal(raw) {
            return ParamValue::Bool(b);
        }
        if let Ok(i) = raw.parse::<i64>() {
            return ParamValue::Int(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                return ParamValue::Float(f);
            }
        }
        ParamValue::Text(raw.to_string())
    }

    /// Coerce this value to `kind`.
    ///
    /// Same kinds pass through, integers widen to floats, text is parsed,
    /// and anything renders to text. Everything else is rejected.
    pub fn coerce_to(&self, kind: ParamKind) -> Option<ParamValue> {
        match (self, kind) {
            (v, k) if v.kind() == k => Some(v.clone()),
            (ParamValue::Int(i), ParamKind::Float) => Some(ParamValue::Float(*i as f64)),
            (v, ParamKind::Text) => Some(ParamValue::Text(v.to_string())),
            (ParamValue::Text(s), ParamKind::Bool) => parse_bool(s).map(ParamValue::Bool),
            (ParamValue::Text(s), ParamKind::Int) => s.trim().parse().ok().map(ParamValue::Int),
            (ParamValue::Text(s), ParamKind::Float) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(ParamValue::Float),
            _ => None,
        }
    }

    /// Text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content as a float, if numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Convert to a JSON value for request bodies.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParamValue::Bool(b) => serde_json::Value::Bool(*b),
            ParamValue::Int(i) => serde_json::Value::from(*i),
            ParamValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ParamValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

fn parse_bool_literal(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Override values keyed by parameter name.
///
/// Values inserted with [`Overrides::insert_raw`] are kept as text and
/// coerced when they meet a default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides(BTreeMap<String, ParamValue>);

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw command-line value.
    pub fn insert_raw(&mut self, key: impl Into<String>, raw: impl Into<String>) {
        self.0.insert(key.into(), ParamValue::Text(raw.into()));
    }

    /// Insert an already typed value.
    pub fn insert(&mut self, key: impl Into<String>, value: ParamValue) {
        self.0.insert(key.into(), value);
    }

    /// Layer `other` on top of these overrides.
    pub fn extend(&mut self, other: &Overrides) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }
}

impl From<BTreeMap<String, ParamValue>> for Overrides {
    fn from(map: BTreeMap<String, ParamValue>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, ParamValue)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A resolved set of invocation parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet(BTreeMap<String, ParamValue>);

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ParamValue) {
        self.0.insert(key.into(), value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    /// The model id, if set.
    pub fn model(&self) -> Option<&str> {
        self.get(MODEL_KEY).and_then(ParamValue::as_str)
    }

    /// Values from `other` replace ours key by key, without coercion.
    pub fn layered(&self, other: &ParamSet) -> ParamSet {
        let mut out = self.clone();
        for (k, v) in &other.0 {
            out.0.insert(k.clone(), v.clone());
        }
        out
    }

    /// Apply overrides on top of this set.
    ///
    /// Every key in `overrides` ends up in the result, coerced to the kind of
    /// the existing value when there is one. Keys without an override keep
    /// their value.
    ///
    /// # Errors
    ///
    /// Returns `DefaultsError::InvalidOverride` if an override cannot be
    /// coerced to its default's kind.
    pub fn apply(&self, overrides: &Overrides) -> Result<ParamSet, DefaultsError> {
        let mut out = self.clone();
        for (key, value) in overrides.iter() {
            let resolved = match self.get(key) {
                Some(default) => value.coerce_to(default.kind()).ok_or_else(|| {
                    DefaultsError::InvalidOverride {
                        key: key.clone(),
                        expected: default.kind(),
                        value: value.to_string(),
                    }
                })?,
                None => match value {
                    ParamValue::Text(raw) => ParamValue::infer(raw),
                    other => other.clone(),
                },
            };
            out.0.insert(key.clone(), resolved);
        }
        Ok(out)
    }

    /// Check values of well-known keys.
    ///
    /// # Errors
    ///
    /// Returns `DefaultsError::OutOfRange` for a temperature outside
    /// `0.0..=2.0` or a non-positive `max_tokens`, and
    /// `DefaultsError::InvalidOverride` if either has the wrong kind.
    pub fn validate(&self) -> Result<(), DefaultsError> {
        if let Some(value) = self.get(TEMPERATURE_KEY) {
            let t = value
                .as_f64()
                .ok_or_else(|| DefaultsError::InvalidOverride {
                    key: TEMPERATURE_KEY.to_string(),
                    expected: ParamKind::Float,
                    value: value.to_string(),
                })?;
            if !(0.0..=2.0).contains(&t) {
                return Err(DefaultsError::OutOfRange {
                    key: TEMPERATURE_KEY.to_string(),
                    reason: format!("{} is outside 0.0..=2.0", t),
                });
            }
        }

        if let Some(value) = self.get(MAX_TOKENS_KEY) {
            match value {
                ParamValue::Int(n) if *n > 0 => {}
                ParamValue::Int(n) => {
                    return Err(DefaultsError::OutOfRange {
                        key: MAX_TOKENS_KEY.to_string(),
                        reason: format!("{} must be positive", n),
                    })
                }
                other => {
                    return Err(DefaultsError::InvalidOverride {
                        key: MAX_TOKENS_KEY.to_string(),
                        expected: ParamKind::Int,
                        value: other.to_string(),
                    })
                }
            }
        }

        Ok(())
    }
}

impl FromIterator<(String, ParamValue)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Baseline parameters for every command.
///
/// Built once at startup and passed by reference; user input only ever
/// overrides it through [`Defaults::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    global: ParamSet,
    commands: BTreeMap<String, ParamSet>,
}

impl Defaults {
    /// Built-in defaults with no config applied.
    pub fn builtin() -> Self {
        let global: ParamSet = [
            (MODEL_KEY.to_string(), ParamValue::from(DEFAULT_MODEL)),
            (
                TEMPERATURE_KEY.to_string(),
                ParamValue::Float(DEFAULT_TEMPERATURE),
            ),
        ]
        .into_iter()
        .collect();

        let preset_params: ParamSet = [
            (MODEL_KEY.to_string(), ParamValue::from(PRESET_MODEL)),
            (
                TEMPERATURE_KEY.to_string(),
                ParamValue::Float(DEFAULT_TEMPERATURE),
            ),
        ]
        .into_iter()
        .collect();

        let commands = presets::BUILTIN_PRESETS
            .iter()
            .map(|p| (p.name.to_string(), preset_params.clone()))
            .collect();

        Self { global, commands }
    }

    /// Built-in defaults with the config file layered on top.
    ///
    /// # Errors
    ///
    /// Returns `DefaultsError::InvalidOverride` if a configured value does not
    /// match the type of the built-in default it replaces.
    pub fn from_config(config: &Config) -> Result<Self, DefaultsError> {
        let builtin = Self::builtin();
        let global = builtin.global.apply(&Overrides::from(config.default_params()))?;

        let mut commands = builtin.commands.clone();
        for (name, command) in config.commands() {
            let Some(params) = command.params else {
                continue;
            };
            let own = builtin.commands.get(&name).cloned().unwrap_or_default();
            let merged = global.layered(&own).apply(&Overrides::from(params))?;
            commands.insert(name, merged);
        }

        let defaults = Self { global, commands };
        log::debug!(
            "defaults: {} global keys, {} command sets",
            defaults.global.len(),
            defaults.commands.len()
        );
        Ok(defaults)
    }

    /// The global default set.
    pub fn global(&self) -> &ParamSet {
        &self.global
    }

    /// Baseline for `command`: the global set layered with the command's set.
    ///
    /// Unknown commands get the global set.
    pub fn baseline(&self, command: &str) -> ParamSet {
        match self.commands.get(command) {
            Some(own) => self.global.layered(own),
            None => {
                log::debug!("defaults: no set for '{}', using global", command);
                self.global.clone()
            }
        }
    }

    /// Resolve parameters for `command` with user overrides applied.
    ///
    /// # Errors
    ///
    /// Returns `DefaultsError::InvalidOverride` on a type mismatch.
    pub fn resolve(&self, command: &str, overrides: &Overrides) -> Result<ParamSet, DefaultsError> {
        self.baseline(command).apply(overrides)
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self::builtin()
    }
}
