//! core::invocation
//!
//! Assembly of one model invocation from its parts.
//!
//! # Pipeline
//!
//! 1. User input: piped content (optionally wrapped for prompting) followed
//!    by command-line text
//! 2. Templates: the primary template and fragments are merged
//! 3. Parameters: command defaults, then template options, then CLI
//!    overrides
//! 4. Rendering: placeholders are bound from template defaults, `-p` params
//!    and `input`
//!
//! The result is an [`Invocation`] holding everything the model client
//! needs.

use thiserror::Error;

use super::piped;
use crate::defaults::{Defaults, DefaultsError, Overrides, ParamSet};
use crate::templates::interpolate::{self, Bindings};
use crate::templates::{merge, Template, TemplateError, TemplateSource, TemplateStore};

/// Binding that carries the user's input into templates.
pub const INPUT_VAR: &str = "input";

/// Errors from building an invocation.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Defaults(#[from] DefaultsError),

    /// Nothing to send to the model.
    #[error("nothing to send: provide text, pipe input, or use a template")]
    EmptyPrompt,
}

/// How merged template text is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateRole {
    /// Template prompt wraps the input; template system is the system prompt.
    #[default]
    Prompt,
    /// The whole template becomes the system prompt; input is the prompt.
    System,
}

/// Everything the user supplied for one invocation.
#[derive(Debug, Clone, Default)]
pub struct InvocationRequest {
    /// Command whose defaults apply.
    pub command: String,
    /// Primary template reference.
    pub template: Option<String>,
    /// Fragment template references, in order.
    pub fragments: Vec<String>,
    /// `-s` value: a stored template name or literal text.
    pub system: Option<String>,
    pub role: TemplateRole,
    /// Command-line text.
    pub text: String,
    /// Piped stdin content, already normalized.
    pub piped: Option<String>,
    /// Tag for wrapping piped content.
    pub stdin_tag: Option<String>,
    /// Whether piped content is wrapped.
    pub format_stdin: bool,
    /// `-p` template variables.
    pub params: Bindings,
    /// Parameter overrides from the command line.
    pub overrides: Overrides,
}

/// A fully assembled model invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub params: ParamSet,
    pub system: Option<String>,
    pub prompt: String,
}

impl Invocation {
    /// Model id from the resolved parameters.
    pub fn model(&self) -> Option<&str> {
        self.params.model()
    }
}

impl InvocationRequest {
    /// Combined user input: piped content first, then text.
    pub fn input(&self) -> String {
        let piped = self.piped.as_deref().map(|content| {
            if self.format_stdin {
                piped::format_piped_content(content, self.stdin_tag.as_deref())
            } else {
                content.to_string()
            }
        });
        piped::combine_input(piped.as_deref(), self.text.trim())
    }

    /// Whether the request carries anything at all.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
            && self.piped.is_none()
            && self.template.is_none()
            && self.fragments.is_empty()
    }
}

/// Build an invocation.
///
/// # Errors
///
/// - `InvocationError::Template` if a template cannot be found, merged or
///   rendered
/// - `InvocationError::Defaults` if an override has the wrong type or a
///   resolved value is out of range
/// - `InvocationError::EmptyPrompt` if the final prompt is empty
pub fn build(
    defaults: &Defaults,
    store: &TemplateStore,
    request: &InvocationRequest,
) -> Result<Invocation, InvocationError> {
    let invocation = prepare(defaults, store, request)?;
    if invocation.prompt.trim().is_empty() {
        return Err(InvocationError::EmptyPrompt);
    }
    Ok(invocation)
}

/// Build an invocation that may have an empty prompt.
///
/// Used to resolve parameters and the system prompt for a session that
/// has no opening message.
pub fn prepare(
    defaults: &Defaults,
    store: &TemplateStore,
    request: &InvocationRequest,
) -> Result<Invocation, InvocationError> {
    let input = request.input();

    let primary = match request.template.as_deref() {
        Some(reference) => store.resolve(reference)?,
        None => empty_template(),
    };
    let fragments = request
        .fragments
        .iter()
        .map(|reference| store.resolve(reference))
        .collect::<Result<Vec<_>, _>>()?;
    let merged = merge(&primary, &fragments)?;

    let mut overrides = merged.options.clone();
    overrides.extend(&request.overrides);
    let params = defaults.resolve(&request.command, &overrides)?;
    params.validate()?;

    let mut bindings = request.params.clone();
    bindings.insert(INPUT_VAR.to_string(), input.clone());
    let rendered = merged.render(&bindings)?;

    let system_override = request
        .system
        .as_deref()
        .map(|s| resolve_system(store, s))
        .transpose()?;

    let (system, prompt) = match request.role {
        TemplateRole::Prompt => {
            let prompt = match merged.prompt.as_deref() {
                Some(raw) => {
                    let text = rendered.prompt.unwrap_or_default();
                    if interpolate::references(raw, INPUT_VAR) || input.is_empty() {
                        text
                    } else if text.is_empty() {
                        input
                    } else {
                        format!("{}\n\n{}", text, input)
                    }
                }
                None => input,
            };
            (system_override.or(rendered.system), prompt)
        }
        TemplateRole::System => {
            let body = [rendered.system, rendered.prompt]
                .into_iter()
                .flatten()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n");
            let system = system_override.or((!body.is_empty()).then_some(body));
            (system, input)
        }
    };

    log::debug!(
        "invocation: command={} templates={:?} prompt={}",
        request.command,
        merged.sources,
        piped::shorten(&prompt, piped::SHORTEN_MAX)
    );

    Ok(Invocation {
        params,
        system,
        prompt,
    })
}

/// Resolve a `-s` value: a stored template's body, or the literal text.
fn resolve_system(store: &TemplateStore, value: &str) -> Result<String, TemplateError> {
    if store.contains(value) {
        let template = store.resolve(value)?;
        return Ok(template.body().unwrap_or_default().to_string());
    }
    Ok(value.to_string())
}

fn empty_template() -> Template {
    Template {
        name: "(none)".to_string(),
        source: TemplateSource::Inline,
        system: None,
        prompt: None,
        defaults: Bindings::new(),
        options: Overrides::new(),
    }
}
