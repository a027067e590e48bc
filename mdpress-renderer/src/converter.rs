//! Markdown → title + HTML conversion.
//!
//! The first line of a document is its title; everything after it is the
//! body and goes through pulldown-cmark unchanged.

use pulldown_cmark::{html, Options, Parser};

/// Title used when the first line has nothing left after stripping `#`.
pub const UNTITLED: &str = "Untitled";

/// A converted document, ready to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub html: String,
}

/// Markdown converter configuration.
#[derive(Debug, Clone)]
pub struct Converter {
    gfm: bool,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    /// Create a converter with GitHub Flavored Markdown enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Enable or disable tables, strikethrough, task lists and footnotes.
    #[must_use]
    pub fn gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.gfm {
            options.insert(Options::ENABLE_TABLES);
            options.insert(Options::ENABLE_STRIKETHROUGH);
            options.insert(Options::ENABLE_TASKLISTS);
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        options
    }

    /// Split `markdown` into title and body, rendering the body to HTML.
    pub fn convert(&self, markdown: &str) -> Document {
        let markdown = markdown.strip_prefix('\u{feff}').unwrap_or(markdown);
        let (first, rest) = match markdown.split_once('\n') {
            Some((first, rest)) => (first, rest),
            None => (markdown, ""),
        };

        let candidate = first.trim().trim_start_matches('#').trim();
        let title = if candidate.is_empty() {
            UNTITLED.to_owned()
        } else {
            candidate.to_owned()
        };

        let parser = Parser::new_ext(rest, self.parser_options());
        let mut html_out = String::with_capacity(rest.len() * 3 / 2);
        html::push_html(&mut html_out, parser);

        Document {
            title,
            html: html_out,
        }
    }
}

/// Convert with the default [`Converter`].
pub fn convert(markdown: &str) -> Document {
    Converter::new().convert(markdown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_line_becomes_title() {
        let doc = convert("# Title\nBody");
        assert_eq!(doc.title, "Title");
        assert!(doc.html.contains("<p>Body</p>"), "{}", doc.html);
    }

    #[test]
    fn empty_input_is_untitled() {
        let doc = convert("");
        assert_eq!(doc.title, UNTITLED);
        assert!(doc.html.is_empty());
    }

    #[test]
    fn bare_hashes_are_untitled() {
        assert_eq!(convert("###   \nText").title, UNTITLED);
    }

    #[test]
    fn plain_first_line_is_title() {
        let doc = convert("Release notes\n\n- one\n- two\n");
        assert_eq!(doc.title, "Release notes");
        assert!(doc.html.contains("<li>one</li>"));
        assert!(!doc.html.contains("Release notes"));
    }

    #[test]
    fn crlf_title_is_trimmed() {
        let doc = convert("## Setup \r\nStep one\r\n");
        assert_eq!(doc.title, "Setup");
        assert!(doc.html.contains("Step one"));
    }

    #[test]
    fn gfm_tables_render_when_enabled() {
        let md = "T\n| a | b |\n|---|---|\n| 1 | 2 |\n";
        assert!(Converter::new().convert(md).html.contains("<table>"));
        assert!(!Converter::new().gfm(false).convert(md).html.contains("<table>"));
    }
}
