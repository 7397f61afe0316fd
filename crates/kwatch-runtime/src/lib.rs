pub mod client;
pub mod controller;
pub mod decoder;
pub mod error;
pub mod event;
pub mod options;
pub mod token;
pub mod translate;
pub mod watcher;

pub use client::{InitialSnapshot, ResourceClient, ResourceMeta, ResourceQuery};
pub use controller::WatchController;
pub use decoder::{decode_table, ColumnDefinition, TabularRow, TabularUpdate};
pub use error::{Error, Result};
pub use event::{Lifecycle, RawEvent, StreamMessage, WatchStream};
pub use options::{OptionalDuration, Options};
pub use token::CancelToken;
pub use translate::Translator;
pub use watcher::KubeconfigWatcher;
