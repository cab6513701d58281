//! Per-request structured logging.
//!
//! [`RequestLogger`] emits two events for every request that passes through
//! it:
//!
//! | event | level | fields |
//! |---|---|---|
//! | `started handling request` | INFO | `request`, `method`, `remote`, `request_id`¹ |
//! | `completed handling request` | WARN on 404, INFO otherwise | the above + `status`, `text_status`, `took` |
//!
//! ¹ only when the request carries a non-empty `X-Request-ID` header.
//!
//! A downstream failure is answered here with `500 Internal Server Error` and
//! the error text as body; the layer above always sees a successful outcome.
//!
//! ```rust,no_run
//! use macrus::{Method, Request, RequestLogger, Response, Router, Server};
//!
//! # async fn run() -> Result<(), macrus::Error> {
//! let app = Router::new()
//!     .layer(RequestLogger::new())
//!     .on(Method::GET, "/ping", |_req: Request| async { Response::text("pong") });
//!
//! Server::bind("0.0.0.0:3000").serve(app).await
//! # }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use http::StatusCode;
use tracing::Level;

use crate::entry::LogEntry;
use crate::error::HandlerError;
use crate::handler::BoxFuture;
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;
use crate::sink::{LogSink, TracingSink};

/// Name used when none is given.
pub const DEFAULT_NAME: &str = "macrus";

const STARTED: &str = "started handling request";
const COMPLETED: &str = "completed handling request";

/// Middleware that logs the start and completion of every request.
#[derive(Clone)]
pub struct RequestLogger {
    name: String,
    sink: Arc<dyn LogSink>,
}

impl RequestLogger {
    /// Named `"macrus"`, logging to the current default `tracing` dispatcher.
    pub fn new() -> Self {
        Self::with_name(DEFAULT_NAME)
    }

    /// Logs to the current default `tracing` dispatcher.
    ///
    /// The dispatcher is captured here, not looked up per request.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self::with_name_and_sink(name, Arc::new(TracingSink::current()))
    }

    pub fn with_name_and_sink(name: impl Into<String>, sink: Arc<dyn LogSink>) -> Self {
        Self { name: name.into(), sink }
    }

    pub fn name(&self) -> &str { &self.name }
}

impl Default for RequestLogger {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for RequestLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLogger").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Middleware for RequestLogger {
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        let sink = Arc::clone(&self.sink);

        Box::pin(async move {
            let start = Instant::now();
            let entry = LogEntry::from_request(&req);
            sink.emit(Level::INFO, STARTED, &entry);

            let response = next.run(req).await.unwrap_or_else(|err| recover(&err));

            let status = response.status_code();
            let entry = entry.completed(status, start.elapsed());
            sink.emit(completion_level(status), COMPLETED, &entry);

            Ok(response)
        })
    }

    fn name(&self) -> &str { &self.name }
}

/// The response sent in place of a failed downstream outcome.
///
/// Always `500 Internal Server Error`, whatever status the failing handler
/// may have chosen, with the error's message as a plain-text body.
pub fn recover(err: &HandlerError) -> Response {
    Response::error(err.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
}

/// Level of the completion event: WARN for 404, INFO for everything else.
pub fn completion_level(status: StatusCode) -> Level {
    if status == StatusCode::NOT_FOUND { Level::WARN } else { Level::INFO }
}
