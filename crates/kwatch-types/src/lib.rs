pub mod cell;
pub mod duration;
pub mod fraction;
pub mod row;
pub mod status;
pub mod theme;
mod util;

pub use cell::{render_cell, CellStyle, CellValue, Span};
pub use duration::{format_duration, parse_human_duration};
pub use fraction::Fraction;
pub use row::{RenderedCell, Row, RowStatus};
pub use status::{classify, status_cell, StatusLevel};
pub use theme::Theme;
pub use util::prefix_splits;
