//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Builds an invocation request from its arguments and the global options
//! 2. Resolves defaults and templates through [`crate::core::invocation`]
//! 3. Sends the request and prints the response
//!
//! # Async Calls
//!
//! Model API calls are async. Handlers stay synchronous and drive a
//! current-thread tokio runtime owned by [`invoke::Runner`].

mod chat;
mod cmd;
mod completion;
mod config_cmd;
mod invoke;
mod preset;
mod prompt;
mod templates;

pub use chat::chat;
pub use cmd::{cmd, CommandFailed};
pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use prompt::prompt;

use anyhow::{bail, Result};

use crate::cli::args::{Cli, Command, ConfigAction, TemplatesAction};
use crate::cli::Context;

/// Dispatch parsed arguments to their handler.
///
/// Bare text with no subcommand is a prompt.
pub fn dispatch(cli: Cli, ctx: &Context) -> Result<()> {
    let Cli {
        options,
        text,
        command,
        ..
    } = cli;

    if command.is_some() && !text.is_empty() {
        bail!(
            "Unexpected text before the subcommand: '{}'. Use `llm prompt ...` for prompts that start with a command name",
            text.join(" ")
        );
    }

    match command {
        None => prompt::prompt(ctx, &options, &text),
        Some(Command::Prompt { text }) => prompt::prompt(ctx, &options, &text),
        Some(Command::Chat { message }) => chat::chat(ctx, &options, &message),
        Some(Command::Cmd { command }) => cmd::cmd(ctx, &options, &command),
        Some(Command::Commands { name, args }) => match name {
            Some(name) => preset::run(ctx, &options, &name, &args),
            None => preset::list(ctx),
        },
        Some(Command::Templates { action }) => match action {
            TemplatesAction::List => templates::list(ctx),
            TemplatesAction::Show { name } => templates::show(ctx, &name),
            TemplatesAction::Create {
                name,
                content,
                force,
            } => templates::create(ctx, &name, content.as_deref(), force),
            TemplatesAction::Path => templates::path(ctx),
        },
        Some(Command::Config { action }) => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set {
                key,
                value,
                project,
            } => config_cmd::set(ctx, &key, &value, project),
            ConfigAction::List => config_cmd::list(ctx),
        },
        Some(Command::Completion { shell }) => completion::completion(shell),
    }
}
