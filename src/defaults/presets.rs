//! defaults::presets
//!
//! Named convenience commands that run fixed templates as the system prompt.
//!
//! Built-in presets can be extended or replaced from the config file:
//!
//! ```toml
//! [commands.review]
//! description = "Review a diff"
//! templates = ["claude", "review"]
//! shell = true
//!
//! [commands.review.params]
//! temperature = 0.2
//! ```

use std::collections::BTreeMap;

use crate::core::config::{Config, ConfigWarning};

/// Subcommands that take parameter defaults but never templates.
pub const BUILTIN_COMMANDS: &[&str] = &["prompt", "chat", "cmd"];

/// Static description of a built-in preset.
#[derive(Debug)]
pub struct BuiltinPreset {
    pub name: &'static str,
    pub description: &'static str,
    pub templates: &'static [&'static str],
    pub shell: bool,
}

/// Presets shipped with the binary.
pub const BUILTIN_PRESETS: &[BuiltinPreset] = &[
    BuiltinPreset {
        name: "simplify",
        description: "Simplify the given text",
        templates: &["claude", "simplify"],
        shell: false,
    },
    BuiltinPreset {
        name: "zshclaude",
        description: "Ask for help with zsh",
        templates: &["zshclaude"],
        shell: false,
    },
    BuiltinPreset {
        name: "zshcmd",
        description: "Run a shell command and explain its output",
        templates: &["zshcmd"],
        shell: true,
    },
    BuiltinPreset {
        name: "pyclaude",
        description: "Ask for help with Python",
        templates: &["pyclaude"],
        shell: false,
    },
];

/// A runnable preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub name: String,
    pub description: String,
    /// Templates merged in order; the first is primary, the rest fragments.
    pub templates: Vec<String>,
    /// Run the arguments as a shell command and use its output as input.
    pub shell: bool,
}

impl From<&BuiltinPreset> for Preset {
    fn from(p: &BuiltinPreset) -> Self {
        Self {
            name: p.name.to_string(),
            description: p.description.to_string(),
            templates: p.templates.iter().map(|t| t.to_string()).collect(),
            shell: p.shell,
        }
    }
}

/// All presets known for this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presets(BTreeMap<String, Preset>);

impl Presets {
    /// Only the built-in presets.
    pub fn builtin() -> Self {
        Self(
            BUILTIN_PRESETS
                .iter()
                .map(|p| (p.name.to_string(), Preset::from(p)))
                .collect(),
        )
    }

    /// Built-in presets with config entries applied.
    ///
    /// Config entries that set `templates` create or update a preset; other
    /// fields of an existing preset are kept unless configured. Entries for
    /// [`BUILTIN_COMMANDS`] only carry parameters, so templates there are
    /// reported as warnings and ignored.
    pub fn from_config(config: &Config) -> (Self, Vec<ConfigWarning>) {
        let mut presets = Self::builtin();
        let mut warnings = Vec::new();

        for (name, command) in config.commands() {
            if BUILTIN_COMMANDS.contains(&name.as_str()) {
                if command.templates.is_some() || command.shell.is_some() {
                    warnings.push(ConfigWarning {
                        message: format!(
                            "templates and shell are ignored for built-in command '{}'",
                            name
                        ),
                        path: config.command_defined_in(&name),
                    });
                }
                continue;
            }

            match presets.0.get_mut(&name) {
                Some(existing) => {
                    if let Some(templates) = command.templates {
                        existing.templates = templates;
                    }
                    if let Some(description) = command.description {
                        existing.description = description;
                    }
                    if let Some(shell) = command.shell {
                        existing.shell = shell;
                    }
                }
                None => {
                    let Some(templates) = command.templates else {
                        // Parameter-only entry for a command we don't know.
                        continue;
                    };
                    presets.0.insert(
                        name.clone(),
                        Preset {
                            description: command
                                .description
                                .unwrap_or_else(|| format!("Run the '{}' templates", name)),
                            name,
                            templates,
                            shell: command.shell.unwrap_or(false),
                        },
                    );
                }
            }
        }

        (presets, warnings)
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.0.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }
}
