use chrono::{DateTime, Utc};

use crate::cell::{render_cell, CellValue, Span};

/// Row-level status, set from the watch lifecycle. Independent from cell
/// styling: a Default row can still contain Error-styled cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowStatus {
    #[default]
    Default,
    Error,
    Warning,
    Deleted,
}

/// A rendered cell: styled spans plus the concatenated plain text used for
/// width computation and substring filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedCell {
    pub spans: Vec<Span>,
    pub text: String,
}

impl RenderedCell {
    pub fn width(&self) -> usize {
        self.text.chars().count()
    }
}

/// One table row, keyed by the server-assigned unique id of the underlying
/// resource. Upserts replace the row with the same id in place.
#[derive(Debug, Clone, Default)]
pub struct Row {
    pub id: String,
    pub fields: Vec<CellValue>,
    pub status: RowStatus,
    /// Ordering key. Empty means "fall back to the first field's text".
    pub sort_key: String,
    /// Seed for filter-text autocompletion, typically the resource name.
    pub suggestion: String,
    /// Set when the delete event is observed; drives hide-deleted expiry.
    pub deleted_at: Option<DateTime<Utc>>,

    rendered: Vec<RenderedCell>,
}

impl Row {
    pub fn new(id: impl Into<String>) -> Self {
        Row {
            id: id.into(),
            ..Row::default()
        }
    }

    /// The value the table sorts on.
    pub fn sort_value(&self) -> &str {
        if !self.sort_key.is_empty() {
            return &self.sort_key;
        }
        match self.fields.first() {
            Some(CellValue::Text(s)) => s,
            _ => "",
        }
    }

    /// Rendered fields, re-rendering lazily when the cache is stale. The
    /// cache is only known-stale when the field count changed; time-dependent
    /// refreshes go through [`Row::re_render`] on the tick.
    pub fn rendered_fields(&mut self, now: DateTime<Utc>) -> &[RenderedCell] {
        if self.rendered.len() != self.fields.len() {
            self.re_render(now);
        }
        &self.rendered
    }

    /// Unconditionally re-render every cell against `now`.
    pub fn re_render(&mut self, now: DateTime<Utc>) {
        self.rendered = self
            .fields
            .iter()
            .map(|field| {
                let spans = render_cell(field, now);
                let text = spans.iter().map(|s| s.text.as_str()).collect();
                RenderedCell { spans, text }
            })
            .collect();
    }

    /// True when any rendered field contains `needle` (case-sensitive).
    pub fn matches_filter(&mut self, needle: &str, now: DateTime<Utc>) -> bool {
        self.rendered_fields(now)
            .iter()
            .any(|cell| cell.text.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellStyle;
    use chrono::Duration;

    fn row_with_fields(fields: Vec<CellValue>) -> Row {
        Row {
            id: "uid-1".to_string(),
            fields,
            ..Row::default()
        }
    }

    #[test]
    fn sort_value_prefers_sort_key() {
        let mut row = row_with_fields(vec![CellValue::text("zzz")]);
        row.sort_key = "aaa".to_string();
        assert_eq!(row.sort_value(), "aaa");
    }

    #[test]
    fn sort_value_falls_back_to_first_text_field() {
        let row = row_with_fields(vec![CellValue::text("pod-1")]);
        assert_eq!(row.sort_value(), "pod-1");

        let row = row_with_fields(vec![CellValue::Since(Utc::now())]);
        assert_eq!(row.sort_value(), "");
    }

    #[test]
    fn rendered_fields_cache_tracks_field_count() {
        let now = Utc::now();
        let mut row = row_with_fields(vec![CellValue::text("a")]);
        assert_eq!(row.rendered_fields(now).len(), 1);

        row.fields.push(CellValue::text("b"));
        let rendered = row.rendered_fields(now);
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[1].text, "b");
    }

    #[test]
    fn re_render_refreshes_time_dependent_cells() {
        let start = Utc::now();
        let mut row = row_with_fields(vec![CellValue::Since(start)]);
        assert_eq!(row.rendered_fields(start)[0].text, "0s");

        row.re_render(start + Duration::seconds(30));
        assert_eq!(row.rendered_fields(start)[0].text, "30s");
    }

    #[test]
    fn filter_matches_rendered_text() {
        let now = Utc::now();
        let mut row = row_with_fields(vec![
            CellValue::text("pod-1"),
            CellValue::styled(CellStyle::Ok, CellValue::text("Running")),
        ]);
        assert!(row.matches_filter("Run", now));
        assert!(row.matches_filter("pod", now));
        assert!(!row.matches_filter("run", now));
    }
}
