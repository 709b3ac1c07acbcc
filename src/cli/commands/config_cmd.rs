//! config command - Get, set, or list configuration values
//!
//! # Keys
//!
//! - `markdown`, `format_stdin`, `user_dir`, `timeout_secs`
//! - `defaults.<param>`
//! - `commands.<name>.<param>`, plus `commands.<name>.description`,
//!   `commands.<name>.templates` (comma separated) and
//!   `commands.<name>.shell`
//! - `providers.<anthropic|openai>.<api_base|api_key_env>`

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};

use crate::cli::Context;
use crate::core::config::{CommandConfig, Config, ConfigScope, FileConfig, ProviderConfig};
use crate::defaults::{Defaults, ParamSet, ParamValue};
use crate::ui::output;

/// A parsed configuration key.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Key {
    Markdown,
    FormatStdin,
    UserDir,
    TimeoutSecs,
    Default(String),
    CommandDescription(String),
    CommandTemplates(String),
    CommandShell(String),
    CommandParam(String, String),
    ProviderBase(String),
    ProviderKeyEnv(String),
}

impl Key {
    /// Keys that a project file may not set.
    fn is_global_only(&self) -> bool {
        matches!(
            self,
            Key::UserDir | Key::ProviderBase(_) | Key::ProviderKeyEnv(_)
        )
    }

    fn parse(key: &str) -> Result<Self> {
        let parts: Vec<&str> = key.split('.').collect();
        let parsed = match parts.as_slice() {
            ["markdown"] => Key::Markdown,
            ["format_stdin"] => Key::FormatStdin,
            ["user_dir"] => Key::UserDir,
            ["timeout_secs"] => Key::TimeoutSecs,
            ["defaults", param] if !param.is_empty() => Key::Default(param.to_string()),
            ["commands", name, "description"] => Key::CommandDescription(name.to_string()),
            ["commands", name, "templates"] => Key::CommandTemplates(name.to_string()),
            ["commands", name, "shell"] => Key::CommandShell(name.to_string()),
            ["commands", name, param] if !name.is_empty() && !param.is_empty() => {
                Key::CommandParam(name.to_string(), param.to_string())
            }
            ["providers", provider, field] if matches!(*provider, "anthropic" | "openai") => {
                match *field {
                    "api_base" => Key::ProviderBase(provider.to_string()),
                    "api_key_env" => Key::ProviderKeyEnv(provider.to_string()),
                    _ => bail!("Unknown configuration key: {}", key),
                }
            }
            _ => bail!("Unknown configuration key: {}", key),
        };
        Ok(parsed)
    }
}

/// Get a configuration value.
///
/// Parameter keys report the effective value, built-in defaults included.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    let config = &ctx.config;
    let value = match Key::parse(key)? {
        Key::Markdown => Some(config.markdown().to_string()),
        Key::FormatStdin => Some(config.format_stdin().to_string()),
        Key::UserDir => Some(ctx.paths.user_dir.display().to_string()),
        Key::TimeoutSecs => Some(config.timeout_secs().to_string()),
        Key::Default(param) => ctx.defaults.global().get(&param).map(ToString::to_string),
        Key::CommandParam(name, param) => ctx
            .defaults
            .baseline(&name)
            .get(&param)
            .map(ToString::to_string),
        Key::CommandDescription(name) => ctx.presets.get(&name).map(|p| p.description.clone()),
        Key::CommandTemplates(name) => ctx.presets.get(&name).map(|p| p.templates.join(",")),
        Key::CommandShell(name) => ctx.presets.get(&name).map(|p| p.shell.to_string()),
        Key::ProviderBase(provider) => provider_config(config, &provider).api_base,
        Key::ProviderKeyEnv(provider) => provider_config(config, &provider).api_key_env,
    };

    // A key with no value exits silently.
    if let Some(value) = value {
        println!("{}", value);
    }
    Ok(())
}

/// Set a configuration value in the global or project file.
pub fn set(ctx: &Context, key: &str, value: &str, project: bool) -> Result<()> {
    let key = Key::parse(key)?;
    if project && key.is_global_only() {
        bail!(
            "'{}' can only be set in the global config (drop --project)",
            describe(&key)
        );
    }
    let scope = if project {
        ConfigScope::Project
    } else {
        ConfigScope::Global
    };

    let (mut file, _) = Config::read_scope(scope, &ctx.cwd).context("Failed to read config")?;
    apply(&mut file, &key, value)?;
    let path = Config::write_scope(scope, &ctx.cwd, &file).context("Failed to write config")?;

    output::print(
        format!("Set {} = {} in {}", describe(&key), value, path.display()),
        ctx.verbosity,
    );
    Ok(())
}

/// List effective configuration values.
pub fn list(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    println!("# Configuration");
    match config.global_config_loaded_from() {
        Some(path) => println!("# global: {}", path.display()),
        None => println!("# global: (none)"),
    }
    if let Some(path) = config.project_config_loaded_from() {
        println!("# project: {}", path.display());
    }

    println!("markdown = {}", config.markdown());
    println!("format_stdin = {}", config.format_stdin());
    println!("user_dir = {}", ctx.paths.user_dir.display());
    println!("timeout_secs = {}", config.timeout_secs());

    for (key, value) in ctx.defaults.global().iter() {
        println!("defaults.{} = {}", key, value);
    }

    for (name, command) in config.commands() {
        if let Some(params) = command.params {
            for (key, value) in params {
                println!("commands.{}.{} = {}", name, key, value);
            }
        }
    }

    for preset in ctx.presets.iter() {
        println!("commands.{}.templates = {}", preset.name, preset.templates.join(","));
    }

    for provider in ["anthropic", "openai"] {
        let settings = provider_config(config, provider);
        if let Some(base) = settings.api_base {
            println!("providers.{}.api_base = {}", provider, base);
        }
        if let Some(env) = settings.api_key_env {
            println!("providers.{}.api_key_env = {}", provider, env);
        }
    }

    Ok(())
}

fn provider_config(config: &Config, provider: &str) -> ProviderConfig {
    match provider {
        "openai" => config.openai(),
        _ => config.anthropic(),
    }
}

fn describe(key: &Key) -> String {
    match key {
        Key::Markdown => "markdown".into(),
        Key::FormatStdin => "format_stdin".into(),
        Key::UserDir => "user_dir".into(),
        Key::TimeoutSecs => "timeout_secs".into(),
        Key::Default(param) => format!("defaults.{}", param),
        Key::CommandDescription(name) => format!("commands.{}.description", name),
        Key::CommandTemplates(name) => format!("commands.{}.templates", name),
        Key::CommandShell(name) => format!("commands.{}.shell", name),
        Key::CommandParam(name, param) => format!("commands.{}.{}", name, param),
        Key::ProviderBase(provider) => format!("providers.{}.api_base", provider),
        Key::ProviderKeyEnv(provider) => format!("providers.{}.api_key_env", provider),
    }
}

/// Write `value` for `key` into a config file.
fn apply(file: &mut FileConfig, key: &Key, value: &str) -> Result<()> {
    match key {
        Key::Markdown => file.markdown = Some(parse_bool(value)?),
        Key::FormatStdin => file.format_stdin = Some(parse_bool(value)?),
        Key::UserDir => file.user_dir = Some(PathBuf::from(value)),
        Key::TimeoutSecs => {
            file.timeout_secs = Some(
                value
                    .parse()
                    .with_context(|| format!("timeout_secs must be a whole number, got '{}'", value))?,
            )
        }
        Key::Default(param) => {
            let typed = typed_value(Defaults::builtin().global(), param, value)?;
            file.defaults
                .get_or_insert_with(Default::default)
                .insert(param.clone(), typed);
        }
        Key::CommandParam(name, param) => {
            let typed = typed_value(&Defaults::builtin().baseline(name), param, value)?;
            command_entry(file, name)
                .params
                .get_or_insert_with(Default::default)
                .insert(param.clone(), typed);
        }
        Key::CommandDescription(name) => {
            command_entry(file, name).description = Some(value.to_string());
        }
        Key::CommandTemplates(name) => {
            let templates: Vec<String> = value
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            command_entry(file, name).templates = Some(templates);
        }
        Key::CommandShell(name) => {
            command_entry(file, name).shell = Some(parse_bool(value)?);
        }
        Key::ProviderBase(provider) => {
            provider_entry(file, provider).api_base = Some(value.to_string());
        }
        Key::ProviderKeyEnv(provider) => {
            provider_entry(file, provider).api_key_env = Some(value.to_string());
        }
    }
    Ok(())
}

/// Type a raw value against the built-in default for `param`, if any.
fn typed_value(
    baseline: &ParamSet,
    param: &str,
    value: &str,
) -> Result<ParamValue> {
    let raw = ParamValue::from(value);
    match baseline.get(param) {
        Some(default) => raw.coerce_to(default.kind()).with_context(|| {
            format!("'{}' must be {}, got '{}'", param, default.kind(), value)
        }),
        None => Ok(ParamValue::infer(value)),
    }
}

fn command_entry<'a>(file: &'a mut FileConfig, name: &str) -> &'a mut CommandConfig {
    file.commands
        .get_or_insert_with(Default::default)
        .entry(name.to_string())
        .or_default()
}

fn provider_entry<'a>(file: &'a mut FileConfig, provider: &str) -> &'a mut ProviderConfig {
    let providers = file.providers.get_or_insert_with(Default::default);
    let slot = match provider {
        "openai" => &mut providers.openai,
        _ => &mut providers.anthropic,
    };
    slot.get_or_insert_with(Default::default)
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => bail!("Expected true or false, got '{}'", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keys() {
        assert_eq!(Key::parse("markdown").unwrap(), Key::Markdown);
        assert_eq!(
            Key::parse("defaults.temperature").unwrap(),
            Key::Default("temperature".into())
        );
        assert_eq!(
            Key::parse("commands.chat.model").unwrap(),
            Key::CommandParam("chat".into(), "model".into())
        );
        assert_eq!(
            Key::parse("commands.review.templates").unwrap(),
            Key::CommandTemplates("review".into())
        );
        assert_eq!(
            Key::parse("providers.openai.api_base").unwrap(),
            Key::ProviderBase("openai".into())
        );
        assert!(Key::parse("nope").is_err());
        assert!(Key::parse("providers.mistral.api_base").is_err());
    }

    #[test]
    fn global_only_keys() {
        assert!(Key::parse("user_dir").unwrap().is_global_only());
        assert!(Key::parse("providers.anthropic.api_base").unwrap().is_global_only());
        assert!(Key::parse("providers.openai.api_key_env").unwrap().is_global_only());
        assert!(!Key::parse("markdown").unwrap().is_global_only());
        assert!(!Key::parse("defaults.model").unwrap().is_global_only());
    }

    #[test]
    fn apply_typed_defaults() {
        let mut file = FileConfig::default();
        apply(&mut file, &Key::Default("temperature".into()), "0.4").unwrap();
        apply(&mut file, &Key::Default("max_tokens".into()), "512").unwrap();

        let defaults = file.defaults.unwrap();
        assert_eq!(defaults["temperature"], ParamValue::Float(0.4));
        assert_eq!(defaults["max_tokens"], ParamValue::Int(512));
    }

    #[test]
    fn apply_rejects_mistyped_default() {
        let mut file = FileConfig::default();
        assert!(apply(&mut file, &Key::Default("temperature".into()), "warm").is_err());
    }

    #[test]
    fn apply_command_fields() {
        let mut file = FileConfig::default();
        apply(&mut file, &Key::CommandTemplates("review".into()), "claude, review").unwrap();
        apply(&mut file, &Key::CommandShell("review".into()), "yes").unwrap();
        apply(
            &mut file,
            &Key::CommandParam("review".into(), "temperature".into()),
            "0.2",
        )
        .unwrap();

        let review = &file.commands.unwrap()["review"];
        assert_eq!(
            review.templates.as_deref(),
            Some(&["claude".to_string(), "review".to_string()][..])
        );
        assert_eq!(review.shell, Some(true));
        assert_eq!(
            review.params.as_ref().unwrap()["temperature"],
            ParamValue::Float(0.2)
        );
    }

    #[test]
    fn apply_provider_fields() {
        let mut file = FileConfig::default();
        apply(
            &mut file,
            &Key::ProviderBase("openai".into()),
            "http://localhost:8080",
        )
        .unwrap();
        let providers = file.providers.unwrap();
        assert_eq!(
            providers.openai.unwrap().api_base.as_deref(),
            Some("http://localhost:8080")
        );
        assert!(providers.anthropic.is_none());
    }
}
