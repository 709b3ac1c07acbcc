//! templates command - Manage stored templates

use std::io::{self, IsTerminal, Read};

use anyhow::{bail, Context as _, Result};

use crate::cli::Context;
use crate::ui::output;

/// List stored template names.
pub fn list(ctx: &Context) -> Result<()> {
    let store = ctx.store();
    let names = store.list()?;

    if names.is_empty() {
        output::print(
            format!("No templates in {}", store.dir().display()),
            ctx.verbosity,
        );
        return Ok(());
    }

    for name in names {
        println!("{}", name);
    }
    Ok(())
}

/// Print a stored template's file content.
pub fn show(ctx: &Context, name: &str) -> Result<()> {
    let content = ctx.store().raw(name)?;
    print!("{}", content);
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Create a template from `content`, or from stdin when omitted.
pub fn create(ctx: &Context, name: &str, content: Option<&str>, force: bool) -> Result<()> {
    let content = match content {
        Some(content) => content.to_string(),
        None => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                bail!("No template content: pass it as an argument or pipe it on stdin");
            }
            let mut buf = String::new();
            stdin
                .lock()
                .read_to_string(&mut buf)
                .context("Failed to read template from stdin")?;
            buf
        }
    };

    if content.trim().is_empty() {
        bail!("Template content is empty");
    }

    let path = ctx.store().create(name, &content, force)?;
    output::print(
        format!("Saved template '{}' to {}", name, path.display()),
        ctx.verbosity,
    );
    Ok(())
}

/// Print the template directory.
pub fn path(ctx: &Context) -> Result<()> {
    println!("{}", ctx.store().dir().display());
    Ok(())
}
