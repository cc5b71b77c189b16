use core_types::EditorTheme;
use pulldown_cmark::{Event, Options, Parser, html};
use serde::Serialize;

pub const EDITOR_LANGUAGE: &str = "markdown";

/// Shown in the preview pane while the note body is empty.
pub const EMPTY_PREVIEW: &str = "Start typing Markdown in the editor to see a live preview.";

/// What the editor widget is given.
#[derive(Debug, Clone, Serialize, Eq, PartialEq)]
pub struct EditorProps {
    pub value: String,
    pub language: &'static str,
    pub theme: &'static str,
}

impl EditorProps {
    pub fn new(value: impl Into<String>, theme: EditorTheme) -> Self {
        Self {
            value: value.into(),
            language: EDITOR_LANGUAGE,
            theme: theme.editor_name(),
        }
    }
}

/// What the preview widget is given.
#[derive(Debug, Clone, Serialize, Eq, PartialEq)]
pub struct PreviewProps {
    pub markdown: String,
}

impl PreviewProps {
    pub fn is_empty(&self) -> bool {
        self.markdown.is_empty()
    }

    pub fn render_html(&self) -> String {
        if self.is_empty() {
            return format!("<p>{EMPTY_PREVIEW}</p>\n");
        }
        render_markdown(&self.markdown)
    }

    pub fn render_text(&self) -> String {
        if self.is_empty() {
            return EMPTY_PREVIEW.to_string();
        }
        render_plain_text(&self.markdown)
    }
}

fn gfm_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, gfm_options());
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

/// Markdown reduced to its text, one line per block, for terminal display.
pub fn render_plain_text(markdown: &str) -> String {
    let mut output = String::new();
    for event in Parser::new_ext(markdown, gfm_options()) {
        match event {
            Event::Text(text) | Event::Code(text) => output.push_str(&text),
            Event::SoftBreak | Event::HardBreak => output.push('\n'),
            Event::TaskListMarker(done) => output.push_str(if done { "[x] " } else { "[ ] " }),
            Event::End(_) if !output.ends_with('\n') && !output.is_empty() => output.push('\n'),
            _ => {}
        }
    }
    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_props_carry_theme_name() {
        let props = EditorProps::new("# hi", EditorTheme::Dark);
        assert_eq!(props.language, "markdown");
        assert_eq!(props.theme, "vs-dark");
        assert_eq!(EditorProps::new("", EditorTheme::Light).theme, "light");
    }

    #[test]
    fn renders_gfm_extensions() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done\n");
        assert!(html.contains("<table>"), "{html}");
        assert!(html.contains("<del>gone</del>"), "{html}");
        assert!(html.contains("checkbox"), "{html}");
    }

    #[test]
    fn renders_headings() {
        let props = PreviewProps {
            markdown: "# Title\n\nBody".into(),
        };
        assert_eq!(props.render_html(), "<h1>Title</h1>\n<p>Body</p>\n");
    }

    #[test]
    fn empty_note_shows_placeholder() {
        let props = PreviewProps {
            markdown: String::new(),
        };
        assert_eq!(props.render_text(), EMPTY_PREVIEW);
        assert_eq!(props.render_html(), format!("<p>{EMPTY_PREVIEW}</p>\n"));

        let blank = PreviewProps {
            markdown: "  \n".into(),
        };
        assert_eq!(blank.render_text(), "");
    }

    #[test]
    fn plain_text_keeps_block_text() {
        let text = render_plain_text("# Groceries\n\n- milk\n- `eggs`\n");
        assert_eq!(text, "Groceries\nmilk\neggs");
    }
}
