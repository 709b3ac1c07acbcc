//! commands command - Run or list preset commands

use anyhow::{bail, Result};

use super::cmd::run_shell;
use super::invoke;
use crate::cli::args::PromptOptions;
use crate::cli::Context;
use crate::core::invocation::TemplateRole;

/// List presets with their templates.
pub fn list(ctx: &Context) -> Result<()> {
    let width = ctx.presets.names().iter().map(|n| n.len()).max().unwrap_or(0);
    for preset in ctx.presets.iter() {
        let shell = if preset.shell { " [shell]" } else { "" };
        println!(
            "{:width$}  {} ({}){}",
            preset.name,
            preset.description,
            preset.templates.join(" + "),
            shell,
            width = width
        );
    }
    Ok(())
}

/// Run the preset `name`.
///
/// The preset's templates form the system prompt. Shell presets run `args`
/// first and send the command's output; others send `args` as text.
pub fn run(ctx: &Context, options: &PromptOptions, name: &str, args: &[String]) -> Result<()> {
    let Some(preset) = ctx.presets.get(name) else {
        bail!(
            "Unknown command '{}'. Available: {}",
            name,
            ctx.presets.names().join(", ")
        );
    };

    let (text, piped) = if preset.shell {
        if args.is_empty() {
            bail!("'{}' needs a shell command to run", name);
        }
        (Vec::new(), run_shell(&args.join(" "))?)
    } else {
        (args.to_vec(), invoke::read_stdin()?)
    };

    let mut request = invoke::request(ctx, options, name, &text, piped);
    request.role = TemplateRole::System;
    let mut templates = preset.templates.iter().cloned();
    request.template = templates.next();
    request.fragments = templates
        .chain(std::mem::take(&mut request.fragments))
        .collect();
    // Shell output is sent unwrapped.
    if preset.shell {
        request.format_stdin = false;
    }

    log::debug!("preset '{}' with templates {:?}", name, preset.templates);
    invoke::run_once(ctx, options, &request)
}
