//! core::piped
//!
//! Reading and reshaping content piped on stdin.
//!
//! Piped content is wrapped in a short lead-in so the model can tell the
//! material apart from the question asked about it:
//!
//! ```
//! use llmx::core::piped::format_piped_content;
//!
//! assert_eq!(
//!     format_piped_content("fn main() {}", Some("rust_code")),
//!     "Given the following rust code:\n\n<RustCode>\nfn main() {}\n</RustCode>\n\n"
//! );
//! ```

use std::io::{self, IsTerminal, Read};

/// Default limit for [`shorten`].
pub const SHORTEN_MAX: usize = 310;

/// Read piped stdin, if stdin is not a terminal.
///
/// Content is trimmed; empty content counts as no content.
pub fn read_piped() -> io::Result<Option<String>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut content = String::new();
    stdin.lock().read_to_string(&mut content)?;
    Ok(normalize(&content))
}

/// Trim piped content, mapping blank content to `None`.
pub fn normalize(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Wrap piped content for prompting.
///
/// With a tag such as `python_code`, the content is enclosed in an XML-like
/// `<PythonCode>` element and introduced as "python code".
pub fn format_piped_content(content: &str, tag: Option<&str>) -> String {
    if content.is_empty() {
        return String::new();
    }

    match tag.filter(|t| !t.trim().is_empty()) {
        Some(tag) => {
            let display = tag.replace('_', " ");
            let xml_tag: String = display.split_whitespace().map(title_case).collect();
            format!(
                "Given the following {}:\n\n<{}>\n{}\n</{}>\n\n",
                display, xml_tag, content, xml_tag
            )
        }
        None => format!("Given the following:\n\n{}\n---\n", content),
    }
}

/// Upper-case the first character, lower-case the rest.
fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Join piped content and command-line text into one user input.
///
/// Piped content comes first, separated from the text by a newline.
pub fn combine_input(piped: Option<&str>, text: &str) -> String {
    match (piped, text.is_empty()) {
        (Some(p), true) => p.to_string(),
        (Some(p), false) => format!("{}\n{}", p, text),
        (None, _) => text.to_string(),
    }
}

/// Shorten a string for log output.
///
/// Keeps up to 200 leading and 100 trailing characters of strings longer
/// than `max_len`.
pub fn shorten(s: &str, max_len: usize) -> String {
    let len = s.chars().count();
    if len <= max_len {
        return s.to_string();
    }

    let prefix_len = 200.min((max_len * 2 / 3).saturating_sub(5));
    let suffix_len = 100.min((max_len / 3).saturating_sub(5));

    let prefix: String = s.chars().take(prefix_len).collect();
    let suffix: String = s.chars().skip(len - suffix_len).collect();

    if s.contains('\n') {
        format!("{}\n...\n{}", prefix, suffix)
    } else {
        format!("{} ... {}", prefix, suffix)
    }
}
