//! llmx - A wrapper CLI for prompting language models
//!
//! llmx installs an `llm` binary that sends prompts to Anthropic and OpenAI
//! models with per-command defaults, composable YAML templates, formatted
//! piped input, and markdown rendering in the terminal.
//!
//! # Architecture
//!
//! - [`cli`] - Argument parsing and command handlers
//! - [`core`] - Configuration, paths, piped input, and invocation assembly
//! - [`defaults`] - Built-in defaults, parameter resolution, and presets
//! - [`templates`] - Template loading, merging, and `{{name}}` interpolation
//! - [`llm`] - Provider clients and API key lookup
//! - [`ui`] - Output and markdown rendering
//!
//! # Resolution Order
//!
//! Parameters resolve in this order (later overrides earlier):
//!
//! 1. Built-in global defaults
//! 2. Built-in per-command defaults
//! 3. Configured global defaults
//! 4. Configured per-command defaults
//! 5. Template options
//! 6. Command-line flags

pub mod cli;
pub mod core;
pub mod defaults;
pub mod llm;
pub mod templates;
pub mod ui;
