//! # macrus
//!
//! Structured request logging for services built on a minimal hyper
//! framework. Two log lines per request. Nothing more.
//!
//! ## What it logs
//!
//! [`RequestLogger`] wraps the rest of the handler chain and emits, through
//! `tracing`:
//!
//! - `started handling request` — `request` (path), `method`, `remote`, and
//!   `request_id` when the client sent a non-empty `X-Request-ID`
//! - `completed handling request` — the same fields plus `status`,
//!   `text_status` and `took`; WARN for 404, INFO for everything else
//!
//! A handler error never escapes the logger: the client gets
//! `500 Internal Server Error` with the error text, and the completion line
//! records the 500.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use macrus::{HandlerError, Method, Request, RequestLogger, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), macrus::Error> {
//!     macrus::logging::init(&macrus::logging::LoggingConfig::from_env()?)?;
//!
//!     let app = Router::new()
//!         .layer(RequestLogger::new())
//!         .on(Method::GET,  "/ping",   ping)
//!         .on(Method::POST, "/submit", submit);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await
//! }
//!
//! async fn ping(_req: Request) -> Response {
//!     Response::text("pong")
//! }
//!
//! async fn submit(req: Request) -> Result<Response, HandlerError> {
//!     if req.body().is_empty() {
//!         anyhow::bail!("empty submission");
//!     }
//!     Ok(Response::text("stored"))
//! }
//! ```

mod entry;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;
mod sink;

pub mod logging;
pub mod middleware;

pub use entry::{Completion, LogEntry, REQUEST_ID_HEADER};
pub use error::{Error, HandlerError};
pub use handler::{BoxFuture, Handler, IntoOutcome, Outcome};
pub use http::{Method, StatusCode};
pub use middleware::request_logger::{completion_level, recover, DEFAULT_NAME};
pub use middleware::{Middleware, Next, RequestLogger};
pub use request::Request;
pub use response::{status_text, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use sink::{LogSink, TracingSink};
