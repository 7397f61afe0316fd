use crate::cell::CellStyle;
use crate::row::RowStatus;

/// Concrete colors for the semantic styles, resolved once at startup and
/// passed explicitly into the renderer. Colors are ANSI palette indices so
/// the output respects the user's terminal scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// When false every lookup resolves to "no color" (NO_COLOR, pipes).
    pub enabled: bool,
    pub ok: u8,
    pub warning: u8,
    pub error: u8,
    /// Bright variant used for the `ERROR:` status-line label.
    pub error_label: u8,
    pub deleted: u8,
    pub subdued: u8,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            enabled: true,
            ok: 2,
            warning: 3,
            error: 1,
            error_label: 9,
            deleted: 8,
            subdued: 8,
        }
    }
}

impl Theme {
    pub fn disabled() -> Self {
        Theme {
            enabled: false,
            ..Theme::default()
        }
    }

    pub fn cell_color(&self, style: CellStyle) -> Option<u8> {
        if !self.enabled {
            return None;
        }
        Some(match style {
            CellStyle::Ok => self.ok,
            CellStyle::Warning => self.warning,
            CellStyle::Error => self.error,
            CellStyle::Subdued => self.subdued,
        })
    }

    /// Row-level color override. Error and Deleted rows are painted whole;
    /// other rows defer to their per-cell styles.
    pub fn row_color(&self, status: RowStatus) -> Option<u8> {
        if !self.enabled {
            return None;
        }
        match status {
            RowStatus::Error => Some(self.error),
            RowStatus::Deleted => Some(self.deleted),
            RowStatus::Default | RowStatus::Warning => None,
        }
    }
}
