use chrono::{DateTime, Utc};

use crate::duration::format_duration;

/// Semantic cell styling. Resolved to concrete colors by the theme at draw
/// time so that rendering stays pure and renderer-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    Ok,
    Warning,
    Error,
    Subdued,
}

/// A typed cell value. The set is closed on purpose: the renderer's dispatch
/// must stay exhaustive.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Plain text, passed through untouched.
    Text(String),
    /// Inner value rendered first, then tagged with a style. Inner spans
    /// that already carry a style keep it.
    Styled(CellStyle, Box<CellValue>),
    /// Multi-valued cell, e.g. a comma list of statuses. Each member is
    /// rendered independently and joined with the delimiter.
    Joined {
        delimiter: String,
        values: Vec<CellValue>,
    },
    /// An instant rendered as a compact age relative to `now` ("3h12m").
    Since(DateTime<Utc>),
    /// A value decorated with how long ago its anchor was: "5 (3m12s ago)".
    /// The anchor is absolute so the decoration keeps counting between
    /// refreshes.
    Ago {
        value: String,
        anchor: DateTime<Utc>,
    },
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn styled(style: CellStyle, inner: CellValue) -> Self {
        CellValue::Styled(style, Box::new(inner))
    }
}

/// One styled fragment of a rendered cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub style: Option<CellStyle>,
}

impl Span {
    fn plain(text: String) -> Self {
        Span { text, style: None }
    }
}

/// Render a cell value into styled spans. Pure given a fixed `now`; callers
/// re-run this on a tick because `Since`/`Ago` depend on wall-clock time.
pub fn render_cell(value: &CellValue, now: DateTime<Utc>) -> Vec<Span> {
    match value {
        CellValue::Text(s) => vec![Span::plain(s.clone())],
        CellValue::Styled(style, inner) => render_cell(inner, now)
            .into_iter()
            .map(|mut span| {
                span.style.get_or_insert(*style);
                span
            })
            .collect(),
        CellValue::Joined { delimiter, values } => {
            let mut spans = Vec::new();
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::plain(delimiter.clone()));
                }
                spans.extend(render_cell(value, now));
            }
            spans
        }
        CellValue::Since(instant) => vec![Span::plain(format_duration(
            now.signed_duration_since(*instant),
        ))],
        CellValue::Ago { value, anchor } => {
            let ago = format_duration(now.signed_duration_since(*anchor));
            vec![Span::plain(format!("{value} ({ago} ago)"))]
        }
    }
}
