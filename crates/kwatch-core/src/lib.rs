pub mod command;
pub mod filter;
pub mod keymap;
pub mod paginator;
pub mod state;
pub mod view;

pub use command::{Key, Msg, TableCommand};
pub use state::{TableState, UpdateResult};
pub use view::{Frame, Line, TextSpan, TextStyle};
