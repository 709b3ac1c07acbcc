//! prompt command - Send one prompt and print the response

use anyhow::Result;
use clap::CommandFactory;

use super::invoke;
use crate::cli::args::{Cli, PromptOptions};
use crate::cli::Context;

/// Send a prompt built from text, piped input and templates.
///
/// With nothing to send, prints help instead.
pub fn prompt(ctx: &Context, options: &PromptOptions, text: &[String]) -> Result<()> {
    let piped = invoke::read_stdin()?;
    let request = invoke::request(ctx, options, "prompt", text, piped);

    if request.is_empty() {
        Cli::command().print_help()?;
        return Ok(());
    }

    invoke::run_once(ctx, options, &request)
}
