use chrono::{DateTime, Utc};
use kwatch_types::Row;

/// Cross-thread command language: everything background tasks may ask of
/// the table. Background tasks never touch [`crate::TableState`] directly;
/// they send these over the UI channel and the foreground loop applies them.
#[derive(Debug, Clone)]
pub enum TableCommand {
    /// Replace the header row; triggers a width recompute.
    SetHeaders(Vec<String>),
    /// Upsert by row id, then re-derive the whole view.
    UpsertRow(Row),
    /// Bulk replace, used for the initial snapshot of a watch.
    SetRows(Vec<Row>),
    /// Drop every row; used when a restart needs a clean slate.
    Clear,
    /// Advisory error shown on the status line. Does not halt rendering.
    SetError(String),
    ClearError,
    StartSpinner,
    StopSpinner,
}

/// Decoded terminal keys, kept renderer-agnostic so the state machine can
/// be driven from tests without a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    CtrlC,
}

/// Input to [`crate::TableState::update`]. Key presses, resizes, periodic
/// ticks and background commands all serialize into this one type.
#[derive(Debug, Clone)]
pub enum Msg {
    Command(TableCommand),
    Key(Key),
    Resize { width: usize, height: usize },
    /// 1s cadence; re-renders time-dependent cells against `now`.
    Tick(DateTime<Utc>),
    /// Fast cadence; advances the spinner frame while it is showing.
    SpinnerTick,
}
