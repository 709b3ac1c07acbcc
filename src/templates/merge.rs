//! templates::merge
//!
//! Folding fragment templates into a primary template.
//!
//! # Order
//!
//! The primary template comes first. Each fragment then, in order:
//! 1. fills every `{{> name}}` slot named after it, in the field holding
//!    the slot, using its own text for that field (or its body when it has
//!    none), and
//! 2. has its remaining text appended to the matching field after a blank
//!    line.
//!
//! Variable defaults and options are unioned in the same order, so the last
//! template that defines a key wins.

use super::interpolate::{self, Bindings};
use super::template::Template;
use super::TemplateError;
use crate::defaults::Overrides;

/// Result of merging a primary template with its fragments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedTemplate {
    pub system: Option<String>,
    pub prompt: Option<String>,
    /// Variable defaults from every template, last definition wins.
    pub bindings: Bindings,
    /// Parameter options from every template, last definition wins.
    pub options: Overrides,
    /// Names of the merged templates, primary first.
    pub sources: Vec<String>,
}

/// Interpolated system and prompt text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedTemplate {
    pub system: Option<String>,
    pub prompt: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    System,
    Prompt,
}

/// Merge `fragments` into `primary`.
///
/// # Errors
///
/// Returns `TemplateError::UnfilledSlot` if a `{{> name}}` slot is left
/// after all fragments are applied.
pub fn merge(primary: &Template, fragments: &[Template]) -> Result<MergedTemplate, TemplateError> {
    let mut merged = MergedTemplate {
        system: primary.system.clone(),
        prompt: primary.prompt.clone(),
        bindings: primary.defaults.clone(),
        options: primary.options.clone(),
        sources: vec![primary.name.clone()],
    };

    for fragment in fragments {
        merged.apply(fragment);
    }

    for text in [&merged.system, &merged.prompt].into_iter().flatten() {
        if let Some(slot) = interpolate::slots(text).into_iter().next() {
            return Err(TemplateError::UnfilledSlot(slot));
        }
    }

    log::debug!("merged templates: {}", merged.sources.join(" + "));
    Ok(merged)
}

impl MergedTemplate {
    fn apply(&mut self, fragment: &Template) {
        let mut consumed_system = false;
        let mut consumed_prompt = false;

        for field in [Field::System, Field::Prompt] {
            let (own, slot_field) = match field {
                Field::System => (fragment.system.as_deref(), &mut self.system),
                Field::Prompt => (fragment.prompt.as_deref(), &mut self.prompt),
            };
            let Some(text) = slot_field.as_deref() else {
                continue;
            };

            let (content, from) = match own {
                Some(content) => (content, field),
                None => match fragment.body() {
                    Some(body) if fragment.prompt.is_some() => (body, Field::Prompt),
                    Some(body) => (body, Field::System),
                    None => continue,
                },
            };

            if let Some(filled) = interpolate::fill_slot(text, &fragment.name, content) {
                *slot_field = Some(filled);
                match from {
                    Field::System => consumed_system = true,
                    Field::Prompt => consumed_prompt = true,
                }
            }
        }

        if !consumed_system {
            append(&mut self.system, fragment.system.as_deref());
        }
        if !consumed_prompt {
            append(&mut self.prompt, fragment.prompt.as_deref());
        }

        for (key, value) in &fragment.defaults {
            self.bindings.insert(key.clone(), value.clone());
        }
        self.options.extend(&fragment.options);
        self.sources.push(fragment.name.clone());
    }

    /// Interpolate both fields.
    ///
    /// `extra` bindings take precedence over template defaults.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::MissingVariables` listing every placeholder
    /// left unbound in either field.
    pub fn render(&self, extra: &Bindings) -> Result<RenderedTemplate, TemplateError> {
        let mut bindings = self.bindings.clone();
        bindings.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));

        let mut unbound = Vec::new();
        for text in [&self.system, &self.prompt].into_iter().flatten() {
            for name in interpolate::missing(text, &bindings) {
                if !unbound.contains(&name) {
                    unbound.push(name);
                }
            }
        }
        if !unbound.is_empty() {
            return Err(TemplateError::MissingVariables(unbound));
        }

        Ok(RenderedTemplate {
            system: self
                .system
                .as_deref()
                .map(|t| interpolate::interpolate(t, &bindings))
                .transpose()?,
            prompt: self
                .prompt
                .as_deref()
                .map(|t| interpolate::interpolate(t, &bindings))
                .transpose()?,
        })
    }
}

fn append(field: &mut Option<String>, text: Option<&str>) {
    let Some(text) = text else {
        return;
    };
    match field {
        Some(existing) if !existing.is_empty() => {
            existing.push_str("\n\n");
            existing.push_str(text);
        }
        _ => *field = Some(text.to_string()),
    }
}
