//! ui::markdown
//!
//! Terminal rendering of markdown responses.
//!
//! `tui-markdown` parses the markdown (with syntax highlighting for fenced
//! code) into styled ratatui lines; this module writes those lines as ANSI
//! text through `crossterm` styles.

use std::io::{self, Write};

use crossterm::style::{Attribute, Attributes, Color as TermColor, ContentStyle};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Text;

/// Render markdown to an ANSI-styled string.
pub fn render(markdown: &str) -> String {
    let text: Text = tui_markdown::from_str(markdown);
    let mut out = String::new();

    for line in &text.lines {
        let line_style = text.style.patch(line.style);
        for span in &line.spans {
            let style = to_content_style(line_style.patch(span.style));
            if style == ContentStyle::default() {
                out.push_str(&span.content);
            } else {
                out.push_str(&style.apply(span.content.as_ref()).to_string());
            }
        }
        out.push('\n');
    }

    out
}

/// Render markdown and write it to stdout.
pub fn print(markdown: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(render(markdown).as_bytes())?;
    stdout.flush()
}

fn to_content_style(style: Style) -> ContentStyle {
    let mut attributes = Attributes::default();
    let modifiers = style.add_modifier - style.sub_modifier;
    for (modifier, attribute) in [
        (Modifier::BOLD, Attribute::Bold),
        (Modifier::DIM, Attribute::Dim),
        (Modifier::ITALIC, Attribute::Italic),
        (Modifier::UNDERLINED, Attribute::Underlined),
        (Modifier::SLOW_BLINK, Attribute::SlowBlink),
        (Modifier::RAPID_BLINK, Attribute::RapidBlink),
        (Modifier::REVERSED, Attribute::Reverse),
        (Modifier::HIDDEN, Attribute::Hidden),
        (Modifier::CROSSED_OUT, Attribute::CrossedOut),
    ] {
        if modifiers.contains(modifier) {
            attributes.set(attribute);
        }
    }

    let mut content = ContentStyle::new();
    content.foreground_color = style.fg.and_then(to_term_color);
    content.background_color = style.bg.and_then(to_term_color);
    content.attributes = attributes;
    content
}

fn to_term_color(color: Color) -> Option<TermColor> {
    Some(match color {
        Color::Reset => return None,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::Gray => TermColor::Grey,
        Color::DarkGray => TermColor::DarkGrey,
        Color::LightRed => TermColor::Red,
        Color::LightGreen => TermColor::Green,
        Color::LightYellow => TermColor::Yellow,
        Color::LightBlue => TermColor::Blue,
        Color::LightMagenta => TermColor::Magenta,
        Color::LightCyan => TermColor::Cyan,
        Color::White => TermColor::White,
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
        Color::Indexed(i) => TermColor::AnsiValue(i),
    })
}
