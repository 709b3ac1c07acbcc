//! chat command - Conversation with a model
//!
//! With a terminal on stdin, runs a line-edited session that keeps the
//! conversation history. Otherwise sends one turn built like `prompt`.

use std::io::{self, IsTerminal};

use anyhow::{Context as _, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use super::invoke::{self, Runner};
use crate::cli::args::PromptOptions;
use crate::cli::Context;
use crate::core::invocation::{self, Invocation};
use crate::llm::Message;
use crate::ui::output;

const PROMPT: &str = "> ";

/// Start a chat.
pub fn chat(ctx: &Context, options: &PromptOptions, message: &[String]) -> Result<()> {
    if !io::stdin().is_terminal() {
        let piped = invoke::read_stdin()?;
        let request = invoke::request(ctx, options, "chat", message, piped);
        return invoke::run_once(ctx, options, &request);
    }

    interactive(ctx, options, message)
}

fn interactive(ctx: &Context, options: &PromptOptions, message: &[String]) -> Result<()> {
    // Template and parameter errors surface before the session starts.
    let request = invoke::request(ctx, options, "chat", message, None);
    let settings = invocation::prepare(&ctx.defaults, &ctx.store(), &request)?;

    let runner = Runner::new(ctx, &settings)?;
    let mut history: Vec<Message> = Vec::new();

    output::print(
        format!(
            "Chatting with {}. Type 'exit' or 'quit' to leave.",
            settings.model().unwrap_or("the model")
        ),
        ctx.verbosity,
    );

    if !settings.prompt.trim().is_empty() {
        turn(ctx, options, &runner, &settings, &mut history, settings.prompt.clone())?;
    }

    let mut editor = DefaultEditor::new().context("Failed to start line editor")?;
    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if matches!(line, "exit" | "quit") {
                    break;
                }
                let _ = editor.add_history_entry(line);
                turn(ctx, options, &runner, &settings, &mut history, line.to_string())?;
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        }
    }

    Ok(())
}

fn turn(
    ctx: &Context,
    options: &PromptOptions,
    runner: &Runner,
    settings: &Invocation,
    history: &mut Vec<Message>,
    text: String,
) -> Result<()> {
    history.push(Message::user(text));
    match runner.send(settings, history.clone()) {
        Ok(reply) => {
            invoke::show(ctx, options, &reply)?;
            history.push(Message::assistant(reply));
        }
        Err(e) => {
            // Drop the failed turn so the conversation can continue.
            history.pop();
            output::error(format!("{:#}", e));
        }
    }
    Ok(())
}
