//! cli
//!
//! Command-line interface layer for llmx.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Set up logging and load configuration once
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers assemble an invocation from
//! [`crate::core::invocation`], send it through [`crate::llm`], and print
//! the response with [`crate::ui`].

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::core::paths::LlmPaths;
use crate::defaults::{Defaults, Presets};
use crate::templates::TemplateStore;
use crate::ui::output::{self, Verbosity};

/// Environment variable controlling log filtering.
const LOG_ENV: &str = "RUST_LOG";

/// Everything a command handler needs, built once per run.
#[derive(Debug)]
pub struct Context {
    pub cwd: PathBuf,
    pub verbosity: Verbosity,
    pub config: Config,
    pub defaults: Defaults,
    pub presets: Presets,
    pub paths: LlmPaths,
}

impl Context {
    /// Store of the user's templates.
    pub fn store(&self) -> TemplateStore {
        TemplateStore::from_paths(&self.paths)
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    init_logging(verbosity);

    let ctx = build_context(verbosity)?;

    commands::dispatch(cli, &ctx)
}

fn init_logging(verbosity: Verbosity) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(verbosity.log_level());
    if let Ok(filters) = std::env::var(LOG_ENV) {
        builder.parse_filters(&filters);
    }
    builder.format_timestamp(None).format_target(false);
    // A logger may already be installed when running in-process (tests).
    let _ = builder.try_init();
}

fn build_context(verbosity: Verbosity) -> Result<Context> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;

    let loaded = Config::load(Some(&cwd)).context("Failed to load config")?;
    let config = loaded.config;

    let paths = LlmPaths::discover(config.user_dir().as_deref())
        .context("Failed to locate the llm user directory")?;
    let defaults = Defaults::from_config(&config).context("Invalid defaults in config")?;

    let (presets, preset_warnings) = Presets::from_config(&config);
    for warning in loaded.warnings.into_iter().chain(preset_warnings) {
        match warning.path {
            Some(path) => output::warn(
                format!("{} ({})", warning.message, path.display()),
                verbosity,
            ),
            None => output::warn(warning.message, verbosity),
        }
    }

    log::debug!("user dir: {}", paths.user_dir.display());

    Ok(Context {
        cwd,
        verbosity,
        config,
        defaults,
        presets,
        paths,
    })
}
