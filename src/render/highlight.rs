//! Best-effort syntax highlighting.
//!
//! Wraps syntect with a guessed-language lookup. Any failure falls back
//! to unhighlighted lines; highlighting problems are never surfaced to
//! the caller.

use serde::{Deserialize, Serialize};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use thiserror::Error;

const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Internal highlighting failure, always recovered by falling back to a
/// plain rendering of the same text.
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("Highlighting failed: {reason}")]
    Failed { reason: String },
}

/// A foreground-colored span within one line, in byte offsets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HighlightSpan {
    /// Start byte offset within the line.
    pub start: usize,
    /// End byte offset within the line (exclusive).
    pub end: usize,
    /// Foreground color as `#rrggbb`.
    pub foreground: String,
}

/// Syntax highlighter over the bundled syntax and theme sets.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    /// Load the default syntax definitions and theme.
    pub fn new() -> Self {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        let mut themes = ThemeSet::load_defaults();
        let theme = themes.themes.remove(DEFAULT_THEME).unwrap_or_default();
        Self { syntaxes, theme }
    }

    /// Highlight lines for the language guessed from `extension`.
    ///
    /// On any failure the affected render degrades to plain text: every
    /// line gets an empty span list.
    pub fn highlight_lines(&self, lines: &[&str], extension: Option<&str>) -> Vec<Vec<HighlightSpan>> {
        match self.try_highlight(lines, extension) {
            Ok(spans) => spans,
            Err(e) => {
                tracing::debug!(error = %e, "highlighting failed, falling back to plain text");
                vec![Vec::new(); lines.len()]
            }
        }
    }

    fn try_highlight(
        &self,
        lines: &[&str],
        extension: Option<&str>,
    ) -> Result<Vec<Vec<HighlightSpan>>, HighlightError> {
        let syntax = extension
            .and_then(|ext| self.syntaxes.find_syntax_by_extension(ext))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());

        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        let mut result = Vec::with_capacity(lines.len());

        for line in lines {
            let ranges = highlighter
                .highlight_line(line, &self.syntaxes)
                .map_err(|e| HighlightError::Failed {
                    reason: e.to_string(),
                })?;

            let mut offset = 0usize;
            let mut spans = Vec::with_capacity(ranges.len());
            for (style, segment) in ranges {
                let start = offset;
                offset += segment.len();
                if segment.is_empty() {
                    continue;
                }
                let fg = style.foreground;
                spans.push(HighlightSpan {
                    start,
                    end: offset,
                    foreground: format!("#{:02x}{:02x}{:02x}", fg.r, fg.g, fg.b),
                });
            }
            result.push(spans);
        }

        Ok(result)
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}
