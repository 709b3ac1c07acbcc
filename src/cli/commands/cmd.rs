//! cmd command - Run a shell command and send its output to the model

use std::process::Command;

use anyhow::{Context as _, Result};
use thiserror::Error;

use super::invoke;
use crate::cli::args::PromptOptions;
use crate::cli::Context;
use crate::core::piped;

/// A shell command exited unsuccessfully.
///
/// `main` exits with the same status.
#[derive(Debug, Error)]
#[error("command exited with status {code}")]
pub struct CommandFailed {
    pub code: i32,
}

/// Run `command` and prompt with its output.
///
/// The output is sent unwrapped unless `--format-stdin` is given.
pub fn cmd(ctx: &Context, options: &PromptOptions, command: &[String]) -> Result<()> {
    let output = run_shell(&command.join(" "))?;
    let mut request = invoke::request(ctx, options, "cmd", &[], output);
    request.format_stdin = options.format_stdin_flag().unwrap_or(false);
    invoke::run_once(ctx, options, &request)
}

/// Run a command line with `sh -c` and return its trimmed stdout.
///
/// On failure the command's stderr is printed and a [`CommandFailed`]
/// carrying its exit status is returned.
pub fn run_shell(line: &str) -> Result<Option<String>> {
    log::debug!("running shell command: {}", line);

    let output = Command::new("sh")
        .arg("-c")
        .arg(line)
        .output()
        .with_context(|| format!("Failed to run '{}'", line))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        eprintln!("Command error: {}", stderr.trim_end());
        return Err(CommandFailed {
            code: output.status.code().unwrap_or(1),
        }
        .into());
    }

    Ok(piped::normalize(&String::from_utf8_lossy(&output.stdout)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout() {
        let out = run_shell("echo hello").unwrap();
        assert_eq!(out.as_deref(), Some("hello"));
    }

    #[test]
    fn empty_output_is_none() {
        assert_eq!(run_shell("true").unwrap(), None);
    }

    #[test]
    fn failure_carries_exit_code() {
        let err = run_shell("exit 3").unwrap_err();
        let failed = err.downcast_ref::<CommandFailed>().unwrap();
        assert_eq!(failed.code, 3);
    }
}
