use chrono::{DateTime, Duration, Utc};

use kwatch_types::{prefix_splits, Row, RowStatus};

use crate::command::{Key, Msg, TableCommand};
use crate::filter::FilterInput;
use crate::paginator::Paginator;

/// Outcome of one update step for the foreground loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub redraw: bool,
    pub quit: bool,
}

impl UpdateResult {
    fn redraw() -> Self {
        UpdateResult {
            redraw: true,
            quit: false,
        }
    }

    fn none() -> Self {
        UpdateResult::default()
    }
}

/// The table state machine. Owns the full row set, derives the
/// filtered/sorted/paginated view and answers every UI event. Single
/// writer: only the foreground loop calls [`TableState::update`].
#[derive(Debug)]
pub struct TableState {
    pub cell_spacing: usize,
    hide_deleted: bool,
    hide_deleted_expiry: Option<Duration>,

    headers: Vec<String>,
    rows: Vec<Row>,
    /// Indices into `rows`, in display order.
    filtered: Vec<usize>,
    column_widths: Vec<usize>,

    pub(crate) filter: FilterInput,
    pub(crate) paginator: Paginator,
    pub(crate) err: Option<String>,
    pub(crate) show_spinner: bool,
    pub(crate) spinner_frame: usize,
    pub(crate) show_help: bool,

    max_height: usize,
    fullscreen_override: bool,
}

impl Default for TableState {
    fn default() -> Self {
        TableState {
            cell_spacing: 3,
            hide_deleted: false,
            hide_deleted_expiry: None,
            headers: Vec::new(),
            rows: Vec::new(),
            filtered: Vec::new(),
            column_widths: Vec::new(),
            filter: FilterInput::default(),
            paginator: Paginator::default(),
            err: None,
            show_spinner: false,
            spinner_frame: 0,
            show_help: false,
            max_height: 30,
            fullscreen_override: false,
        }
    }
}

impl TableState {
    pub fn new(hide_deleted: bool, hide_deleted_expiry: Option<Duration>) -> Self {
        TableState {
            hide_deleted,
            hide_deleted_expiry,
            ..TableState::default()
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn visible_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn error(&self) -> Option<&str> {
        self.err.as_deref()
    }

    pub(crate) fn column_widths(&self) -> &[usize] {
        &self.column_widths
    }

    /// Ids of the visible rows in display order. Test/introspection helper.
    pub fn visible_ids(&self) -> Vec<&str> {
        self.filtered
            .iter()
            .map(|&i| self.rows[i].id.as_str())
            .collect()
    }

    pub fn row(&self, id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Derived alt-screen signal: recomputed after every mutation, never
    /// stored. Idempotent by construction.
    pub fn fullscreen_needed(&self) -> bool {
        self.fullscreen_override || self.window_too_short()
    }

    fn window_too_short(&self) -> bool {
        let mut height = self.filtered.len() + 1; // +1 for header
        if self.err.is_some() {
            height += 1;
        }
        height > self.max_height
    }

    pub(crate) fn viewport_height(&self) -> usize {
        self.max_height
    }

    pub(crate) fn paginator_visible(&self) -> bool {
        if self.max_height <= 2 {
            return false;
        }
        self.window_too_short()
    }

    pub fn update(&mut self, msg: Msg, now: DateTime<Utc>) -> UpdateResult {
        match msg {
            Msg::Command(cmd) => self.apply_command(cmd, now),
            Msg::Key(key) => self.handle_key(key, now),
            // Columns size themselves to their content; only the height
            // affects the derivation.
            Msg::Resize { width: _, height } => {
                self.max_height = height;
                self.update_pagination();
                self.update_widths(now);
                UpdateResult::redraw()
            }
            Msg::Tick(tick_now) => {
                for row in &mut self.rows {
                    row.re_render(tick_now);
                }
                // Rendered text lengths changed and deleted rows may have
                // crossed their expiry, so the whole pipeline re-derives.
                self.update_filtered(tick_now);
                self.update_pagination();
                self.update_widths(tick_now);
                UpdateResult::redraw()
            }
            Msg::SpinnerTick => {
                if self.show_spinner {
                    self.spinner_frame = self.spinner_frame.wrapping_add(1);
                    UpdateResult::redraw()
                } else {
                    UpdateResult::none()
                }
            }
        }
    }

    fn apply_command(&mut self, cmd: TableCommand, now: DateTime<Utc>) -> UpdateResult {
        match cmd {
            TableCommand::SetHeaders(headers) => {
                self.headers = headers;
                self.update_widths(now);
            }
            TableCommand::UpsertRow(row) => {
                match self.rows.iter_mut().find(|r| r.id == row.id) {
                    Some(existing) => *existing = row,
                    None => self.rows.push(row),
                }
                self.show_spinner = false;
                self.derive(now);
            }
            TableCommand::SetRows(rows) => {
                self.rows = rows;
                if !self.rows.is_empty() {
                    self.show_spinner = false;
                }
                self.derive(now);
            }
            TableCommand::Clear => {
                self.rows.clear();
                self.derive(now);
            }
            TableCommand::SetError(err) => {
                self.err = Some(err);
                // Error and spinner are mutually exclusive on screen.
                self.show_spinner = false;
            }
            TableCommand::ClearError => self.err = None,
            TableCommand::StartSpinner => self.show_spinner = true,
            TableCommand::StopSpinner => self.show_spinner = false,
        }
        UpdateResult::redraw()
    }

    /// Re-sort and re-derive everything that depends on the row set.
    fn derive(&mut self, now: DateTime<Utc>) {
        self.sort_rows();
        self.update_filtered(now);
        self.update_pagination();
        self.update_widths(now);
    }

    fn sort_rows(&mut self) {
        // Stable: rows sharing a sort key keep their insertion order, so
        // re-sorting on every mutation never makes equal-key rows jitter.
        self.rows.sort_by(|a, b| a.sort_value().cmp(b.sort_value()));
    }

    fn handle_key(&mut self, key: Key, now: DateTime<Utc>) -> UpdateResult {
        if key == Key::CtrlC {
            return UpdateResult {
                redraw: false,
                quit: true,
            };
        }

        if self.filter.enabled && self.handle_filter_key(key, now) {
            return UpdateResult::redraw();
        }

        match key {
            Key::Left | Key::PageUp | Key::Char('h') => {
                self.paginator.prev_page();
                self.update_widths(now);
            }
            Key::Right | Key::PageDown | Key::Char('l') => {
                self.paginator.next_page();
                self.update_widths(now);
            }
            Key::Home | Key::Char('g') => {
                self.paginator.first_page();
                self.update_widths(now);
            }
            Key::End | Key::Char('G') => {
                self.paginator.last_page();
                self.update_widths(now);
            }
            Key::Char('d') => {
                self.hide_deleted = !self.hide_deleted;
                self.update_filtered(now);
                self.update_pagination();
                self.update_widths(now);
            }
            Key::Char('f') => {
                self.fullscreen_override = !self.fullscreen_override;
            }
            Key::Char('/') => self.toggle_filter_input(now),
            Key::Char('?') => self.show_help = !self.show_help,
            Key::Esc if self.show_help => self.show_help = false,
            _ => return UpdateResult::none(),
        }
        UpdateResult::redraw()
    }

    /// Keys consumed by the filter input while it is enabled. Returns false
    /// for keys that fall through to the normal bindings.
    fn handle_filter_key(&mut self, key: Key, now: DateTime<Utc>) -> bool {
        match key {
            Key::Char('/') => return false,
            Key::Char(c) => self.filter.push(c),
            Key::Backspace => self.filter.backspace(),
            Key::Tab => self.filter.accept_suggestion(),
            Key::Esc => {
                self.filter.enabled = false;
                self.filter.clear();
            }
            Key::Enter => self.filter.enabled = false,
            _ => return false,
        }
        self.update_filtered(now);
        self.update_pagination();
        self.update_widths(now);
        true
    }

    fn toggle_filter_input(&mut self, now: DateTime<Utc>) {
        self.filter.enabled = !self.filter.enabled;
        self.update_filtered(now);
        self.update_pagination();
        self.update_widths(now);
    }

    fn update_filtered(&mut self, now: DateTime<Utc>) {
        let filter_text = self.filter.active_text().to_string();
        let mut filtered = Vec::new();
        for i in 0..self.rows.len() {
            if !filter_text.is_empty() && !self.rows[i].matches_filter(&filter_text, now) {
                continue;
            }
            if !self.deleted_visible(&self.rows[i], now) {
                continue;
            }
            filtered.push(i);
        }
        self.filtered = filtered;
        self.update_suggestions();
    }

    /// Visibility of deleted rows. The manual toggle is authoritative when
    /// on; when off, the configured expiry hides each deleted row once its
    /// deletion age passes the window.
    fn deleted_visible(&self, row: &Row, now: DateTime<Utc>) -> bool {
        if row.status != RowStatus::Deleted {
            return true;
        }
        if self.hide_deleted {
            return false;
        }
        match (self.hide_deleted_expiry, row.deleted_at) {
            (Some(expiry), Some(deleted_at)) => now.signed_duration_since(deleted_at) < expiry,
            _ => true,
        }
    }

    fn update_suggestions(&mut self) {
        let mut suggestions: Vec<String> = Vec::new();
        for &i in &self.filtered {
            for split in prefix_splits(&self.rows[i].suggestion, '-') {
                if !suggestions.contains(&split) {
                    suggestions.push(split);
                }
            }
        }
        self.filter.set_suggestions(suggestions);
    }

    fn update_pagination(&mut self) {
        // 1 line for the header, 1 for the paginator.
        self.paginator.per_page = self.max_height.saturating_sub(2).max(1);
        self.paginator.set_total_items(self.filtered.len());
    }

    fn update_widths(&mut self, now: DateTime<Utc>) {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        let (start, end) = self.paginator.slice_bounds(self.filtered.len());
        let page: Vec<usize> = self.filtered[start..end].to_vec();
        for i in page {
            for (col, cell) in self.rows[i].rendered_fields(now).iter().enumerate() {
                if col < widths.len() {
                    widths[col] = widths[col].max(cell.width());
                } else {
                    widths.push(cell.width());
                }
            }
        }
        self.column_widths = widths;
    }

    /// The rows of the current page, rendered. Exposed for view building.
    pub(crate) fn current_page(&mut self, now: DateTime<Utc>) -> Vec<(RowStatus, Vec<kwatch_types::RenderedCell>)> {
        let (start, end) = self.paginator.slice_bounds(self.filtered.len());
        let page: Vec<usize> = self.filtered[start..end].to_vec();
        page.into_iter()
            .map(|i| {
                let status = self.rows[i].status;
                let cells = self.rows[i].rendered_fields(now).to_vec();
                (status, cells)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kwatch_types::CellValue;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn row(id: &str, name: &str, status: &str) -> Row {
        let mut row = Row::new(id);
        row.fields = vec![CellValue::text(name), CellValue::text(status)];
        row.sort_key = name.to_string();
        row.suggestion = name.to_string();
        row
    }

    fn state_with_rows(rows: Vec<Row>) -> TableState {
        let mut state = TableState::default();
        state.update(
            Msg::Command(TableCommand::SetHeaders(vec![
                "NAME".to_string(),
                "STATUS".to_string(),
            ])),
            now(),
        );
        state.update(Msg::Command(TableCommand::SetRows(rows)), now());
        state
    }

    #[test]
    fn upsert_is_idempotent() {
        let mut state = state_with_rows(vec![row("a", "pod-a", "Running")]);
        let before = state.visible_ids().join(",");

        state.update(
            Msg::Command(TableCommand::UpsertRow(row("a", "pod-a", "Running"))),
            now(),
        );
        assert_eq!(state.row_count(), 1);
        assert_eq!(state.visible_ids().join(","), before);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut state = state_with_rows(vec![
            row("a", "pod-a", "Pending"),
            row("b", "pod-b", "Running"),
        ]);
        state.update(
            Msg::Command(TableCommand::UpsertRow(row("a", "pod-a", "Running"))),
            now(),
        );
        assert_eq!(state.row_count(), 2);
        let updated = state.row("a").unwrap();
        assert_eq!(updated.fields[1], CellValue::text("Running"));
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut a = row("a", "same", "Running");
        let mut b = row("b", "same", "Running");
        let mut c = row("c", "same", "Running");
        a.sort_key = "same".into();
        b.sort_key = "same".into();
        c.sort_key = "same".into();

        let mut state = state_with_rows(vec![a, b, c]);
        assert_eq!(state.visible_ids(), vec!["a", "b", "c"]);

        // Mutations must not reorder equal-key rows.
        state.update(
            Msg::Command(TableCommand::UpsertRow(row("b", "same", "Pending"))),
            now(),
        );
        state.update(
            Msg::Command(TableCommand::UpsertRow(row("d", "aaa", "Running"))),
            now(),
        );
        assert_eq!(state.visible_ids(), vec!["d", "a", "b", "c"]);
    }

    #[test]
    fn rows_sort_by_sort_key() {
        let state = state_with_rows(vec![
            row("z", "zeta", "Running"),
            row("a", "alpha", "Running"),
            row("m", "mid", "Running"),
        ]);
        assert_eq!(state.visible_ids(), vec!["a", "m", "z"]);
    }

    #[test]
    fn filter_matches_any_rendered_field() {
        let mut state = state_with_rows(vec![
            row("a", "pod-a", "Running"),
            row("b", "pod-b", "CrashLoopBackOff"),
        ]);
        state.update(Msg::Key(Key::Char('/')), now());
        for c in "Crash".chars() {
            state.update(Msg::Key(Key::Char(c)), now());
        }
        assert_eq!(state.visible_ids(), vec!["b"]);

        // Disabling the filter input clears the filter.
        state.update(Msg::Key(Key::Esc), now());
        assert_eq!(state.visible_count(), 2);
    }

    #[test]
    fn filter_is_case_sensitive() {
        let mut state = state_with_rows(vec![row("a", "pod-a", "Running")]);
        state.update(Msg::Key(Key::Char('/')), now());
        for c in "running".chars() {
            state.update(Msg::Key(Key::Char(c)), now());
        }
        assert_eq!(state.visible_count(), 0);
    }

    #[test]
    fn deleted_rows_visible_until_toggled() {
        let mut deleted = row("a", "pod-a", "Deleted");
        deleted.status = RowStatus::Deleted;
        let mut state = state_with_rows(vec![deleted, row("b", "pod-b", "Running")]);
        assert_eq!(state.visible_count(), 2);

        state.update(Msg::Key(Key::Char('d')), now());
        assert_eq!(state.visible_ids(), vec!["b"]);

        state.update(Msg::Key(Key::Char('d')), now());
        assert_eq!(state.visible_count(), 2);
    }

    #[test]
    fn deleted_rows_expire_when_toggle_is_off() {
        let mut state = TableState::new(false, Some(Duration::seconds(30)));
        let t0 = now();
        let mut deleted = row("a", "pod-a", "Deleted");
        deleted.status = RowStatus::Deleted;
        deleted.deleted_at = Some(t0);
        state.update(Msg::Command(TableCommand::SetRows(vec![deleted])), t0);
        assert_eq!(state.visible_count(), 1);

        state.update(Msg::Tick(t0 + Duration::seconds(31)), t0 + Duration::seconds(31));
        assert_eq!(state.visible_count(), 0);
    }

    #[test]
    fn pagination_stays_in_bounds_after_mutations() {
        let rows: Vec<Row> = (0..50)
            .map(|i| row(&format!("id-{i}"), &format!("pod-{i:02}"), "Running"))
            .collect();
        let mut state = state_with_rows(rows);
        state.update(
            Msg::Resize {
                width: 80,
                height: 12,
            },
            now(),
        );
        state.update(Msg::Key(Key::End), now());
        let last = state.paginator.page;
        assert_eq!(last, state.paginator.total_pages - 1);

        // Shrink the visible set: the page index clamps down.
        state.update(Msg::Key(Key::Char('/')), now());
        for c in "pod-00".chars() {
            state.update(Msg::Key(Key::Char(c)), now());
        }
        assert!(state.paginator.page <= state.paginator.total_pages - 1);
        assert_eq!(state.visible_count(), 1);
    }

    #[test]
    fn fullscreen_follows_row_count_and_override() {
        let mut state = state_with_rows(
            (0..5)
                .map(|i| row(&format!("id-{i}"), &format!("pod-{i}"), "Running"))
                .collect(),
        );
        state.update(
            Msg::Resize {
                width: 80,
                height: 30,
            },
            now(),
        );
        assert!(!state.fullscreen_needed());

        state.update(
            Msg::Resize {
                width: 80,
                height: 4,
            },
            now(),
        );
        assert!(state.fullscreen_needed());

        state.update(
            Msg::Resize {
                width: 80,
                height: 30,
            },
            now(),
        );
        assert!(!state.fullscreen_needed());

        state.update(Msg::Key(Key::Char('f')), now());
        assert!(state.fullscreen_needed());
        state.update(Msg::Key(Key::Char('f')), now());
        assert!(!state.fullscreen_needed());
    }

    #[test]
    fn spinner_stops_on_first_content_or_error() {
        let mut state = TableState::default();
        state.update(Msg::Command(TableCommand::StartSpinner), now());
        assert!(state.show_spinner);

        state.update(
            Msg::Command(TableCommand::UpsertRow(row("a", "pod-a", "Running"))),
            now(),
        );
        assert!(!state.show_spinner);

        state.update(Msg::Command(TableCommand::StartSpinner), now());
        state.update(
            Msg::Command(TableCommand::SetError("boom".to_string())),
            now(),
        );
        assert!(!state.show_spinner);
        assert_eq!(state.error(), Some("boom"));
    }

    #[test]
    fn clear_empties_rows_without_stopping_spinner() {
        let mut state = state_with_rows(vec![row("a", "pod-a", "Running")]);
        state.update(Msg::Command(TableCommand::StartSpinner), now());
        state.update(Msg::Command(TableCommand::Clear), now());
        assert_eq!(state.row_count(), 0);
        assert!(state.show_spinner);
    }

    #[test]
    fn suggestions_come_from_visible_rows() {
        let mut state = state_with_rows(vec![
        row("a", "thing-operator-675ffd4bbb-jfsfn", "Running"),
        ]);
        state.update(Msg::Key(Key::Char('/')), now());
        for c in "thing-op".chars() {
            state.update(Msg::Key(Key::Char(c)), now());
        }
        assert_eq!(state.filter.suggestion(), Some("thing-operator"));
        state.update(Msg::Key(Key::Tab), now());
        assert_eq!(state.filter.text(), "thing-operator");
    }

    #[test]
    fn ctrl_c_quits() {
        let mut state = TableState::default();
        let result = state.update(Msg::Key(Key::CtrlC), now());
        assert!(result.quit);
    }
}
