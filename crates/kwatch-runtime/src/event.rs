use std::sync::mpsc::Receiver;

/// Lifecycle tag of a watch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Added,
    Modified,
    Deleted,
    Error,
    Bookmark,
}

/// One raw server-pushed event: a lifecycle tag plus the undecoded tabular
/// payload.
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub lifecycle: Lifecycle,
    pub payload: serde_json::Value,
}

/// Items delivered on a watch stream. After an `Error` the stream ends;
/// a disconnected receiver means the stream closed without one.
#[derive(Debug, Clone)]
pub enum StreamMessage {
    Event(RawEvent),
    Error(String),
}

/// A live event stream handed out by a [`crate::ResourceClient`]. Dropping
/// the stream (its guard) tears down whatever feeds the receiver.
pub struct WatchStream {
    rx: Receiver<StreamMessage>,
    _guard: Box<dyn Send>,
}

impl WatchStream {
    pub fn new(rx: Receiver<StreamMessage>, guard: Box<dyn Send>) -> Self {
        WatchStream { rx, _guard: guard }
    }

    pub fn receiver(&self) -> &Receiver<StreamMessage> {
        &self.rx
    }
}
