//! Minimal macrus example — request logging around a few endpoints.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!   MACRUS_LOG_FORMAT=json cargo run --example basic
//!
//! Try:
//!   curl -H 'X-Request-ID: abc123' http://localhost:3000/ping   # INFO, 200
//!   curl http://localhost:3000/missing                          # WARN, 404
//!   curl -X POST http://localhost:3000/submit                   # INFO, 500 "empty submission"
//!   curl -X POST -d 'hello' http://localhost:3000/submit        # INFO, 201

use std::time::Duration;

use macrus::logging::{self, LoggingConfig};
use macrus::{HandlerError, Method, Request, RequestLogger, Response, Router, Server, StatusCode};

#[tokio::main]
async fn main() -> Result<(), macrus::Error> {
    logging::init(&LoggingConfig::from_env()?)?;

    let app = Router::new()
        .layer(RequestLogger::with_name("demo"))
        .on(Method::GET,  "/ping",       ping)
        .on(Method::GET,  "/slow/{ms}",  slow)
        .on(Method::POST, "/submit",     submit);

    Server::bind("0.0.0.0:3000").serve(app).await
}

// GET /ping
async fn ping(_req: Request) -> Response {
    Response::text("pong")
}

// GET /slow/:ms — watch `took` grow.
async fn slow(req: Request) -> Response {
    let ms = req.param("ms").and_then(|ms| ms.parse().ok()).unwrap_or(100);
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Response::text(format!("slept {ms}ms"))
}

// POST /submit — an empty body fails; the logger answers 500 with the message.
async fn submit(req: Request) -> Result<Response, HandlerError> {
    if req.body().is_empty() {
        anyhow::bail!("empty submission");
    }
    Ok(Response::builder()
        .status(StatusCode::CREATED)
        .text(format!("stored {} bytes", req.body().len())))
}
