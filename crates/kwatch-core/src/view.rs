use chrono::{DateTime, Utc};

use kwatch_types::{CellStyle, RenderedCell, RowStatus};

use crate::keymap;
use crate::state::TableState;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Display-level styling, resolved to colors by the theme at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Plain,
    Ok,
    Warning,
    Error,
    DeletedRow,
    Subdued,
    ErrorLabel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub style: TextStyle,
}

impl TextSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        TextSpan {
            text: text.into(),
            style: TextStyle::Plain,
        }
    }

    fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        TextSpan {
            text: text.into(),
            style,
        }
    }
}

pub type Line = Vec<TextSpan>;

/// One fully-derived frame: styled lines plus the alt-screen signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub lines: Vec<Line>,
    pub altscreen: bool,
}

impl Frame {
    /// Plain-text rendition, one string per line. Test helper.
    pub fn plain_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| line.iter().map(|span| span.text.as_str()).collect())
            .collect()
    }
}

fn cell_style(style: CellStyle) -> TextStyle {
    match style {
        CellStyle::Ok => TextStyle::Ok,
        CellStyle::Warning => TextStyle::Warning,
        CellStyle::Error => TextStyle::Error,
        CellStyle::Subdued => TextStyle::Subdued,
    }
}

fn row_override(status: RowStatus) -> Option<TextStyle> {
    match status {
        RowStatus::Error => Some(TextStyle::Error),
        RowStatus::Deleted => Some(TextStyle::DeletedRow),
        RowStatus::Default | RowStatus::Warning => None,
    }
}

impl TableState {
    /// Build the frame for the current state. Pure given `now`; rendered
    /// cells come from the per-row cache.
    pub fn view(&mut self, now: DateTime<Utc>) -> Frame {
        let altscreen = self.fullscreen_needed();

        if self.show_help {
            return Frame {
                lines: help_lines(),
                altscreen,
            };
        }

        let mut lines: Vec<Line> = Vec::new();

        if self.row_count() == 0 {
            if self.show_spinner {
                lines.push(vec![TextSpan::plain(self.spinner_char())]);
            } else {
                lines.push(vec![TextSpan::plain("No resources found")]);
            }
            if let Some(line) = self.error_line() {
                lines.push(line);
            }
            return Frame { lines, altscreen };
        }

        if self.visible_count() == 0 {
            if self.filter.enabled {
                lines.push(self.filter_line());
            } else {
                lines.push(vec![TextSpan::plain("No resources visible")]);
            }
            if let Some(line) = self.error_line() {
                lines.push(line);
            }
            return Frame { lines, altscreen };
        }

        if self.viewport_height() > 1 {
            if self.filter.enabled {
                lines.push(self.filter_line());
            } else {
                lines.push(self.header_line());
            }
        }

        let page = self.current_page(now);
        let page_len = page.len();
        let widths = self.column_widths().to_vec();
        for (status, cells) in page {
            lines.push(self.row_line(status, &cells, &widths));
        }

        let mut status_line = self.status_line();
        if self.paginator_visible() {
            for _ in page_len..self.paginator.per_page {
                lines.push(Vec::new());
            }
            let mut page_line = vec![TextSpan::styled(
                format!(
                    "PAGE: {}/{}",
                    self.paginator.page + 1,
                    self.paginator.total_pages
                ),
                TextStyle::Subdued,
            )];
            if let Some(status) = status_line.take() {
                page_line.push(TextSpan::plain("  "));
                page_line.extend(status);
            }
            lines.push(page_line);
        }
        if let Some(status) = status_line {
            lines.push(status);
        }

        Frame { lines, altscreen }
    }

    fn spinner_char(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    /// Spinner (while reconnecting) and advisory error, combined into one
    /// status line below the table.
    fn status_line(&self) -> Option<Line> {
        let mut spans = Vec::new();
        if self.show_spinner {
            spans.push(TextSpan::plain(format!("{} ", self.spinner_char())));
        }
        if let Some(line) = self.error_line() {
            spans.extend(line);
        }
        if spans.is_empty() {
            None
        } else {
            Some(spans)
        }
    }

    fn error_line(&self) -> Option<Line> {
        self.err.as_ref().map(|err| {
            vec![
                TextSpan::styled("ERROR:", TextStyle::ErrorLabel),
                TextSpan::plain(format!(" {err}")),
            ]
        })
    }

    fn filter_line(&self) -> Line {
        let mut line = vec![TextSpan::plain("> "), TextSpan::plain(self.filter.text())];
        if let Some(ghost) = self.filter.ghost() {
            line.push(TextSpan::styled(ghost, TextStyle::Subdued));
        }
        line
    }

    fn header_line(&self) -> Line {
        let widths = self.column_widths();
        let mut line = Vec::new();
        for (i, header) in self.headers().iter().enumerate() {
            if i > 0 {
                let prev_width = self.headers()[i - 1].chars().count();
                line.push(TextSpan::plain(self.spacing(i - 1, prev_width, widths)));
            }
            line.push(TextSpan::plain(header.clone()));
        }
        line
    }

    fn row_line(&self, status: RowStatus, cells: &[RenderedCell], widths: &[usize]) -> Line {
        let override_style = row_override(status);
        let mut line = Vec::new();
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                line.push(TextSpan::plain(self.spacing(i - 1, cells[i - 1].width(), widths)));
            }
            for span in &cell.spans {
                let style = override_style
                    .or(span.style.map(cell_style))
                    .unwrap_or(TextStyle::Plain);
                line.push(TextSpan::styled(span.text.clone(), style));
            }
        }
        line
    }

    fn spacing(&self, col: usize, rendered_width: usize, widths: &[usize]) -> String {
        let column_width = widths.get(col).copied().unwrap_or(rendered_width);
        let pad = self.cell_spacing + column_width.saturating_sub(rendered_width);
        " ".repeat(pad)
    }
}

fn help_lines() -> Vec<Line> {
    let mut lines = Vec::new();
    let sections: &[&[keymap::Binding]] = &[keymap::NAVIGATION, keymap::TOGGLES, keymap::GENERAL];
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            lines.push(Vec::new());
        }
        for binding in section.iter() {
            lines.push(vec![
                TextSpan::styled(format!("{:<12}", binding.keys), TextStyle::Subdued),
                TextSpan::plain(binding.action),
            ]);
        }
    }
    lines
}
