//! Unified error types.

/// Failure raised by application code further down the handler chain.
///
/// Handlers may return `Result<T, E>` for any `E` convertible into
/// [`anyhow::Error`]; the error travels up through [`Next::run`](crate::Next::run)
/// until a middleware such as [`RequestLogger`](crate::RequestLogger) turns it
/// into a response.
pub type HandlerError = anyhow::Error;

/// The error type returned by macrus's fallible operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: binding to a port, accepting a connection, or
/// installing the log subscriber.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("log subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),

    #[error("unknown log format `{0}` (expected `text` or `json`)")]
    Format(String),
}
