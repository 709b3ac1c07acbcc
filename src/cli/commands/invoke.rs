//! Shared plumbing for commands that call a model.

use anyhow::{anyhow, Context as _, Result};
use tokio::runtime::Runtime;

use crate::cli::args::PromptOptions;
use crate::cli::Context;
use crate::core::invocation::{self, Invocation, InvocationRequest, TemplateRole};
use crate::core::piped;
use crate::llm::{self, CompletionRequest, LlmClient, Message, ModelRef};
use crate::ui::output;

/// Build a request from global options and the command's input.
pub fn request(
    ctx: &Context,
    options: &PromptOptions,
    command: &str,
    text: &[String],
    piped: Option<String>,
) -> InvocationRequest {
    InvocationRequest {
        command: command.to_string(),
        template: options.template.clone(),
        fragments: options.fragments.clone(),
        system: options.system.clone(),
        role: TemplateRole::Prompt,
        text: text.join(" "),
        piped,
        stdin_tag: options.tag.clone(),
        format_stdin: options
            .format_stdin_flag()
            .unwrap_or_else(|| ctx.config.format_stdin()),
        params: options.params(),
        overrides: options.overrides(),
    }
}

/// Read piped stdin.
pub fn read_stdin() -> Result<Option<String>> {
    piped::read_piped().context("Failed to read piped input")
}

/// A model client bound to one invocation's model and a runtime to drive it.
pub struct Runner {
    runtime: Runtime,
    client: Box<dyn LlmClient>,
    model: ModelRef,
}

impl Runner {
    /// Create a runner for the invocation's model.
    pub fn new(ctx: &Context, invocation: &Invocation) -> Result<Self> {
        let model_id = invocation
            .model()
            .ok_or_else(|| anyhow!("No model configured"))?;
        let model = ModelRef::parse(model_id)?;
        let client = llm::client_for(&model, &ctx.config, &ctx.paths)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;

        Ok(Self {
            runtime,
            client,
            model,
        })
    }

    /// Send a conversation and wait for the reply.
    pub fn send(&self, invocation: &Invocation, messages: Vec<Message>) -> Result<String> {
        let request = CompletionRequest::new(
            &self.model,
            &invocation.params,
            invocation.system.clone(),
            messages,
        );
        let completion = self
            .runtime
            .block_on(self.client.complete(&request))
            .with_context(|| format!("Request to {} failed", self.model))?;
        Ok(completion.text)
    }
}

/// Build, send and print a single-turn invocation.
pub fn run_once(ctx: &Context, options: &PromptOptions, request: &InvocationRequest) -> Result<()> {
    let invocation = invocation::build(&ctx.defaults, &ctx.store(), request)?;
    let runner = Runner::new(ctx, &invocation)?;
    let reply = runner.send(&invocation, vec![Message::user(invocation.prompt.clone())])?;
    show(ctx, options, &reply)
}

/// Print a response, as markdown when enabled.
pub fn show(ctx: &Context, options: &PromptOptions, text: &str) -> Result<()> {
    let markdown = output::use_markdown(options.markdown_flag(), ctx.config.markdown());
    output::response(text, markdown).context("Failed to write response")
}
