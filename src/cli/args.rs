//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `-m` / `--model`, `-o` / `--option`, `--temperature`: Parameters
//! - `-t` / `--template`, `-f` / `--fragment`, `-p` / `--param`: Templates
//! - `-s` / `--system`: System prompt (template name or text)
//! - `--format-stdin` / `--no-format-stdin`, `--tag`: Piped content
//! - `--md` / `--no-md`: Markdown rendering
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//!
//! # Default Command
//!
//! Without a subcommand, positional text is sent as a prompt, so
//! `llm "why is the sky blue"` is the same as `llm prompt "why is the sky blue"`.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::defaults::{Overrides, MODEL_KEY, TEMPERATURE_KEY};
use crate::templates::Bindings;

/// llm - Prompt language models with sane defaults, templates and markdown output
#[derive(Parser, Debug)]
#[command(name = "llm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub options: PromptOptions,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Prompt text (when no subcommand is given)
    #[arg(value_name = "TEXT")]
    pub text: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Options shared by every command that talks to a model.
#[derive(Args, Debug, Clone, Default)]
pub struct PromptOptions {
    /// Model id, e.g. anthropic/claude-3-7-sonnet-latest or openai/gpt-4o
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Model option as KEY VALUE (repeatable)
    #[arg(
        short = 'o',
        long = "option",
        global = true,
        num_args = 2,
        value_names = ["KEY", "VALUE"],
        action = clap::ArgAction::Append
    )]
    pub option: Vec<String>,

    /// Sampling temperature
    #[arg(long, global = true)]
    pub temperature: Option<String>,

    /// Template name or path
    #[arg(short, long, global = true)]
    pub template: Option<String>,

    /// Fragment template to merge into the template (repeatable)
    #[arg(short, long = "fragment", global = true, value_name = "FRAGMENT")]
    pub fragments: Vec<String>,

    /// Template variable as KEY VALUE (repeatable)
    #[arg(
        short = 'p',
        long = "param",
        global = true,
        num_args = 2,
        value_names = ["KEY", "VALUE"],
        action = clap::ArgAction::Append
    )]
    pub param: Vec<String>,

    /// System prompt: a stored template name or literal text
    #[arg(short, long, global = true)]
    pub system: Option<String>,

    /// Wrap piped input for prompting (default from config)
    #[arg(long, global = true, overrides_with = "no_format_stdin")]
    pub format_stdin: bool,

    /// Send piped input unchanged
    #[arg(long, global = true, overrides_with = "format_stdin")]
    pub no_format_stdin: bool,

    /// Render the response as markdown
    #[arg(long, global = true, overrides_with = "no_md")]
    pub md: bool,

    /// Print the raw response
    #[arg(long, global = true, overrides_with = "md")]
    pub no_md: bool,

    /// Tag naming the piped content, e.g. python_code
    #[arg(long = "tag", visible_alias = "stdin-tag", global = true)]
    pub tag: Option<String>,
}

impl PromptOptions {
    /// Explicit `--md` / `--no-md`, if given.
    pub fn markdown_flag(&self) -> Option<bool> {
        flag_pair(self.md, self.no_md)
    }

    /// Explicit `--format-stdin` / `--no-format-stdin`, if given.
    pub fn format_stdin_flag(&self) -> Option<bool> {
        flag_pair(self.format_stdin, self.no_format_stdin)
    }

    /// Parameter overrides from `-o`, `--temperature` and `-m`.
    ///
    /// Later flags win; dedicated flags win over `-o`.
    pub fn overrides(&self) -> Overrides {
        let mut overrides = Overrides::new();
        for pair in self.option.chunks(2) {
            if let [key, value] = pair {
                overrides.insert_raw(key.as_str(), value.as_str());
            }
        }
        if let Some(temperature) = &self.temperature {
            overrides.insert_raw(TEMPERATURE_KEY, temperature.as_str());
        }
        if let Some(model) = &self.model {
            overrides.insert_raw(MODEL_KEY, model.as_str());
        }
        overrides
    }

    /// Template variables from `-p`.
    pub fn params(&self) -> Bindings {
        self.param
            .chunks(2)
            .filter_map(|pair| match pair {
                [key, value] => Some((key.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }
}

fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a prompt and print the response
    #[command(
        name = "prompt",
        long_about = "Send a prompt and print the response.\n\n\
            Piped input is placed before the prompt text. With a template, the \
            input is bound to {{input}}, or appended when the template does not \
            reference it.",
        after_help = "\
EXAMPLES:
    # Ask a question
    llm prompt \"what does EPIPE mean\"

    # Explain piped code, tagged for the model
    cat main.rs | llm --tag rust_code \"explain this\"

    # Use a stored template with a variable
    llm -t review -p focus security < patch.diff"
    )]
    Prompt {
        /// Prompt text
        text: Vec<String>,
    },

    /// Hold a conversation with a model
    #[command(
        name = "chat",
        long_about = "Hold a conversation with a model.\n\n\
            When stdin is a terminal, opens an interactive session; type 'exit' \
            or 'quit' (or press Ctrl-D) to leave. Otherwise sends a single turn."
    )]
    Chat {
        /// Opening message
        message: Vec<String>,
    },

    /// Run a shell command and send its output to the model
    #[command(
        name = "cmd",
        after_help = "\
EXAMPLES:
    llm cmd git log -5 --stat
    llm -t summarize cmd 'dmesg | tail -50'"
    )]
    Cmd {
        /// Shell command to run
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Run a preset command, or list presets
    #[command(
        name = "commands",
        long_about = "Run a preset command, or list presets when no name is given.\n\n\
            Presets combine fixed templates into a system prompt and use their own \
            defaults. Presets that take a shell command run it first and send its \
            output.",
        after_help = "\
EXAMPLES:
    llm commands
    llm commands simplify \"a needlessly verbose paragraph\"
    llm commands zshcmd ls -la"
    )]
    Commands {
        /// Preset name
        name: Option<String>,

        /// Text or shell command for the preset
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Manage stored templates
    #[command(name = "templates")]
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },

    /// Get, set, or list configuration values
    #[command(
        name = "config",
        after_help = "\
KEYS:
    markdown, format_stdin, user_dir, timeout_secs
    defaults.<param>              e.g. defaults.temperature
    commands.<name>.<param>       e.g. commands.simplify.model"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell. Add the output \
            to your shell's configuration to enable tab-completion.",
        after_help = "\
EXAMPLES:
    # Bash (add to ~/.bashrc)
    llm completion bash >> ~/.bashrc

    # Zsh
    llm completion zsh > ~/.zfunc/_llm

    # Fish
    llm completion fish > ~/.config/fish/completions/llm.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Template subcommands.
#[derive(Subcommand, Debug)]
pub enum TemplatesAction {
    /// List stored templates
    List,
    /// Print a stored template
    Show {
        /// Template name
        name: String,
    },
    /// Create a template from text or stdin
    Create {
        /// Template name
        name: String,
        /// Template content (read from stdin when omitted)
        content: Option<String>,
        /// Replace an existing template
        #[arg(long)]
        force: bool,
    },
    /// Print the template directory
    Path,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
        /// Write to ./.llmx/config.toml instead of the global config
        #[arg(long)]
        project: bool,
    },
    /// List all configuration values
    List,
}

/// Supported shells for completion.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::ParamValue;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("llm").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_text_is_prompt() {
        let cli = parse(&["why", "is", "the", "sky", "blue"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.text, vec!["why", "is", "the", "sky", "blue"]);
    }

    #[test]
    fn subcommand_with_global_flags() {
        let cli = parse(&["chat", "-m", "openai/gpt-4o", "hello"]);
        assert!(matches!(cli.command, Some(Command::Chat { ref message }) if message == &["hello"]));
        assert_eq!(cli.options.model.as_deref(), Some("openai/gpt-4o"));
    }

    #[test]
    fn global_flags_before_subcommand() {
        let cli = parse(&["--no-md", "commands", "zshcmd", "echo", "hi"]);
        assert!(matches!(
            cli.command,
            Some(Command::Commands { ref name, ref args })
                if name.as_deref() == Some("zshcmd") && args == &["echo", "hi"]
        ));
        assert_eq!(cli.options.markdown_flag(), Some(false));
    }

    #[test]
    fn option_pairs() {
        let cli = parse(&["-o", "temperature", "0.5", "-o", "max_tokens", "100", "hi"]);
        let overrides = cli.options.overrides();
        assert_eq!(overrides.get("temperature"), Some(&ParamValue::from("0.5")));
        assert_eq!(overrides.get("max_tokens"), Some(&ParamValue::from("100")));
    }

    #[test]
    fn temperature_flag_wins_over_option() {
        let cli = parse(&["-o", "temperature", "0.5", "--temperature", "0.9", "hi"]);
        assert_eq!(
            cli.options.overrides().get("temperature"),
            Some(&ParamValue::from("0.9"))
        );
    }

    #[test]
    fn param_pairs() {
        let cli = parse(&["-t", "greet", "-p", "name", "Ada", "-p", "tone", "dry"]);
        let params = cli.options.params();
        assert_eq!(params["name"], "Ada");
        assert_eq!(params["tone"], "dry");
    }

    #[test]
    fn markdown_flags() {
        assert_eq!(parse(&["hi"]).options.markdown_flag(), None);
        assert_eq!(parse(&["--md", "hi"]).options.markdown_flag(), Some(true));
        assert_eq!(parse(&["--no-md", "hi"]).options.markdown_flag(), Some(false));
    }

    #[test]
    fn last_paired_flag_wins() {
        assert_eq!(parse(&["--md", "--no-md", "hi"]).options.markdown_flag(), Some(false));
        assert_eq!(parse(&["--no-md", "--md", "hi"]).options.markdown_flag(), Some(true));
        assert_eq!(
            parse(&["--format-stdin", "--no-format-stdin", "hi"])
                .options
                .format_stdin_flag(),
            Some(false)
        );
        assert_eq!(
            parse(&["--no-format-stdin", "--format-stdin", "hi"])
                .options
                .format_stdin_flag(),
            Some(true)
        );
    }

    #[test]
    fn stdin_tag_alias() {
        let cli = parse(&["--stdin-tag", "python_code", "explain"]);
        assert_eq!(cli.options.tag.as_deref(), Some("python_code"));
    }

    #[test]
    fn cmd_keeps_hyphen_args() {
        let cli = parse(&["cmd", "ls", "-la"]);
        assert!(matches!(cli.command, Some(Command::Cmd { ref command }) if command == &["ls", "-la"]));
    }

    #[test]
    fn fragments_repeat() {
        let cli = parse(&["-t", "base", "-f", "a", "-f", "b", "go"]);
        assert_eq!(cli.options.fragments, vec!["a", "b"]);
    }
}
