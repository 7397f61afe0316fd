use std::fmt;

/// Result type for kwatch-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer. The split matters:
/// `Config` errors are fatal and reported before the UI starts, everything
/// else is advisory and retried by the watch loop.
#[derive(Debug)]
pub enum Error {
    /// Invalid or unresolvable configuration (output format, namespace)
    Config(String),

    /// Cluster client failure (connection, discovery, request)
    Client(String),

    /// Payload did not decode as a recognized tabular update
    Decode(String),

    /// The live event stream failed or closed unexpectedly
    Stream(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "{}", msg),
            Error::Client(msg) => write!(f, "{}", msg),
            Error::Decode(msg) => write!(f, "decode: {}", msg),
            Error::Stream(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// True for errors that abort startup instead of being retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}
