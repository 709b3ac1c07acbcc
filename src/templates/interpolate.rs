//! templates::interpolate
//!
//! Placeholder discovery and substitution.
//!
//! A placeholder is `{{name}}`, optionally padded with whitespace inside the
//! braces. Substitution is a single pass: text produced by a binding is never
//! scanned for further placeholders.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::TemplateError;

/// Variable bindings: placeholder name to value.
pub type Bindings = BTreeMap<String, String>;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder pattern is valid")
});

static SLOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{>\s*([A-Za-z0-9_.\-]+)\s*\}\}").expect("slot pattern is valid")
});

/// Placeholder names in order of first appearance, without duplicates.
pub fn placeholders(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in PLACEHOLDER.captures_iter(text) {
        let name = &caps[1];
        if !seen.iter().any(|s: &String| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

/// Whether `text` references the placeholder `name`.
pub fn references(text: &str, name: &str) -> bool {
    PLACEHOLDER
        .captures_iter(text)
        .any(|caps| &caps[1] == name)
}

/// Placeholder names in `text` that `bindings` does not cover.
pub fn missing(text: &str, bindings: &Bindings) -> Vec<String> {
    placeholders(text)
        .into_iter()
        .filter(|name| !bindings.contains_key(name))
        .collect()
}

/// Substitute every placeholder in `text`.
///
/// # Errors
///
/// Returns `TemplateError::MissingVariables` naming every unbound
/// placeholder, in order of first appearance.
pub fn interpolate(text: &str, bindings: &Bindings) -> Result<String, TemplateError> {
    let unbound = missing(text, bindings);
    if !unbound.is_empty() {
        return Err(TemplateError::MissingVariables(unbound));
    }

    Ok(PLACEHOLDER
        .replace_all(text, |caps: &Captures| bindings[&caps[1]].clone())
        .into_owned())
}

/// Fragment slot names (`{{> name}}`) in order of appearance.
pub fn slots(text: &str) -> Vec<String> {
    SLOT.captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Replace every `{{> name}}` slot with `content`.
///
/// Returns `None` when `text` has no slot for `name`.
pub fn fill_slot(text: &str, name: &str, content: &str) -> Option<String> {
    if !slots(text).iter().any(|s| s == name) {
        return None;
    }
    Some(
        SLOT.replace_all(text, |caps: &Captures| {
            if &caps[1] == name {
                content.to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(pairs: &[(&str, &str)]) -> Bindings {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn interpolates_all_placeholders() {
        let out = interpolate(
            "Hello {{name}}, rate={{temp}}",
            &bind(&[("name", "Ada"), ("temp", "0.7")]),
        )
        .unwrap();
        assert_eq!(out, "Hello Ada, rate=0.7");
    }

    #[test]
    fn reports_missing_variable() {
        let err = interpolate("Hello {{name}}, rate={{temp}}", &bind(&[("name", "Ada")]))
            .unwrap_err();
        assert_eq!(err, TemplateError::MissingVariables(vec!["temp".to_string()]));
    }

    #[test]
    fn missing_reported_once_in_order() {
        let err = interpolate("{{b}} {{a}} {{b}}", &Bindings::new()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingVariables(vec!["b".to_string(), "a".to_string()])
        );
    }

    #[test]
    fn whitespace_inside_braces() {
        let out = interpolate("{{ name }}!", &bind(&[("name", "Ada")])).unwrap();
        assert_eq!(out, "Ada!");
    }

    #[test]
    fn values_are_not_rescanned() {
        let out = interpolate("{{a}}", &bind(&[("a", "{{b}}")])).unwrap();
        assert_eq!(out, "{{b}}");
    }

    #[test]
    fn non_identifiers_are_left_alone() {
        let text = "{{1abc}} {{a-b}} {single}";
        assert!(placeholders(text).is_empty());
        assert_eq!(interpolate(text, &Bindings::new()).unwrap(), text);
    }

    #[test]
    fn extra_bindings_are_ignored() {
        let out = interpolate("plain", &bind(&[("unused", "x")])).unwrap();
        assert_eq!(out, "plain");
    }

    #[test]
    fn references_input() {
        assert!(references("Review: {{ input }}", "input"));
        assert!(!references("Review: {{inputs}}", "input"));
    }

    #[test]
    fn slots_are_not_placeholders() {
        assert!(placeholders("{{> style}}").is_empty());
        assert_eq!(slots("a {{> style}} b {{>tone}}"), vec!["style", "tone"]);
    }

    #[test]
    fn fill_named_slot_only() {
        let out = fill_slot("{{> a}} and {{> b}} and {{> a}}", "a", "X").unwrap();
        assert_eq!(out, "X and {{> b}} and X");
        assert_eq!(fill_slot("no slots", "a", "X"), None);
    }
}
