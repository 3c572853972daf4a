//! Paginated Text Renderer
//!
//! Produces line-windowed views of decoded text with best-effort syntax
//! highlighting, and a row-windowed table projection for CSV display
//! names. Window expansion/collapse follows a fixed chunk policy and is
//! idempotent at its bounds.

mod highlight;
mod table;

pub use highlight::{HighlightError, HighlightSpan, Highlighter};
pub use table::TableView;

use serde::{Deserialize, Serialize};

use crate::classify::extension_of;
use crate::core::config::PreviewConfig;

/// The currently visible slice of a larger line/row collection.
///
/// Invariant: `0 < visible <= max(total, initial)`; expansion adds a
/// fixed chunk capped at `total`, collapse resets to the initial size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderWindow {
    visible: usize,
    total: usize,
}

impl RenderWindow {
    /// Create a window over `total` items showing at most the initial
    /// window size.
    pub fn new(total: usize, initial: usize) -> Self {
        Self {
            visible: total.min(initial).max(1),
            total,
        }
    }

    /// Currently visible item count.
    pub fn visible(&self) -> usize {
        self.visible
    }

    /// Total item count.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether more items remain beyond the visible slice.
    pub fn has_more(&self) -> bool {
        self.visible < self.total
    }

    /// Show `chunk` more items, capped at the total. A no-op at the
    /// upper bound.
    pub fn expand(&mut self, chunk: usize) {
        self.visible = self.visible.saturating_add(chunk).min(self.total).max(self.visible);
    }

    /// Reset to the initial window size. A no-op when already collapsed.
    pub fn collapse(&mut self, initial: usize) {
        self.visible = self.total.min(initial).max(1);
    }
}

/// One rendered text line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderedLine {
    /// 1-based line number.
    pub number: usize,
    /// Raw line text.
    pub text: String,
    /// Highlight spans; empty when highlighting was unavailable.
    pub spans: Vec<HighlightSpan>,
}

/// Line-windowed view of plain/code text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextView {
    /// The visible lines, numbered from 1.
    pub lines: Vec<RenderedLine>,
    /// Total lines in the payload.
    pub total_lines: usize,
    /// Lines currently visible.
    pub visible_lines: usize,
}

/// Rendered text content: plain lines or the tabular projection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RenderedText {
    Plain(TextView),
    Table(TableView),
}

/// Renders decoded text payloads into windowed views.
pub struct TextRenderer {
    highlighter: Highlighter,
}

impl TextRenderer {
    /// Create a renderer with the default syntax/theme sets.
    pub fn new() -> Self {
        Self {
            highlighter: Highlighter::new(),
        }
    }

    /// Whether this display name selects the tabular projection.
    ///
    /// Text vs. tabular is a rendering decision made from the display
    /// name, not a content-kind distinction.
    pub fn is_tabular(display_name: Option<&str>) -> bool {
        display_name
            .and_then(extension_of)
            .map(|ext| ext == "csv")
            .unwrap_or(false)
    }

    /// Window sized for this payload under the given configuration.
    pub fn window_for(
        &self,
        text: &str,
        display_name: Option<&str>,
        config: &PreviewConfig,
    ) -> RenderWindow {
        let total = if Self::is_tabular(display_name) {
            table::data_row_count(text)
        } else {
            text.lines().count()
        };
        RenderWindow::new(total, config.initial_window)
    }

    /// Render the visible slice of a text payload.
    pub fn render(
        &self,
        text: &str,
        display_name: Option<&str>,
        window: &RenderWindow,
    ) -> RenderedText {
        if Self::is_tabular(display_name) {
            return RenderedText::Table(table::parse(text, window));
        }
        RenderedText::Plain(self.render_lines(text, display_name, window))
    }

    fn render_lines(
        &self,
        text: &str,
        display_name: Option<&str>,
        window: &RenderWindow,
    ) -> TextView {
        let all_lines: Vec<&str> = text.lines().collect();
        let total_lines = all_lines.len();
        let visible_lines = window.visible().min(total_lines);
        let visible = &all_lines[..visible_lines];

        let extension = display_name.and_then(extension_of);
        let spans = self
            .highlighter
            .highlight_lines(visible, extension.as_deref());

        let lines = visible
            .iter()
            .zip(spans)
            .enumerate()
            .map(|(idx, (line, spans))| RenderedLine {
                number: idx + 1,
                text: (*line).to_string(),
                spans,
            })
            .collect();

        TextView {
            lines,
            total_lines,
            visible_lines,
        }
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}
