//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The router needs to hold handlers of *different* types in a single
//! `HashMap<Method, Tree>`, so each one is hidden behind a trait object
//! (`dyn ErasedHandler`) and stored uniformly:
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.on(Method::GET, "/", hello)
//! hello.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                       ← stored as BoxedHandler
//!        ↓
//! handler.call(req)  at request time               ← one vtable dispatch
//!        ↓
//! Box::pin(async { hello(req).await.into_outcome() })
//! ```
//!
//! Handlers resolve to an [`Outcome`] rather than a bare [`Response`] so that
//! failures can travel back up the middleware chain as values.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::StatusCode;

use crate::error::HandlerError;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// What a handler, or the rest of a middleware chain, produced.
pub type Outcome = Result<Response, HandlerError>;

/// A heap-allocated, type-erased future that resolves to an [`Outcome`].
///
/// `Send + 'static` lets tokio move the future across worker threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Outcome> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── IntoOutcome ───────────────────────────────────────────────────────────────

/// Conversion of a handler's return value into an [`Outcome`].
///
/// Implemented for every [`IntoResponse`] type the crate ships and for
/// `Result<T, E>` where `T: IntoResponse` and `E` converts into
/// [`HandlerError`]. Custom response types can be returned as
/// `Ok::<_, HandlerError>(value)`.
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for Response {
    fn into_outcome(self) -> Outcome { Ok(self) }
}

impl IntoOutcome for StatusCode {
    fn into_outcome(self) -> Outcome { Ok(self.into_response()) }
}

impl IntoOutcome for String {
    fn into_outcome(self) -> Outcome { Ok(self.into_response()) }
}

impl IntoOutcome for &'static str {
    fn into_outcome(self) -> Outcome { Ok(self.into_response()) }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoResponse,
    E: Into<HandlerError>,
{
    fn into_outcome(self) -> Outcome {
        self.map(IntoResponse::into_response).map_err(Into::into)
    }
}

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is satisfied for any `async fn`
/// (or closure returning a future) with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoOutcome
/// ```
///
/// The trait is sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Newtype bridging a concrete handler `F` to [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_outcome() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_errors_become_handler_errors() {
        let failed: Result<Response, std::io::Error> =
            Err(std::io::Error::other("disk full"));
        let err = failed.into_outcome().unwrap_err();
        assert_eq!(err.to_string(), "disk full");

        let ok: Result<&'static str, HandlerError> = Ok("fine");
        assert_eq!(ok.into_outcome().unwrap().body(), b"fine");
    }

    #[test]
    fn bare_status_is_a_successful_outcome() {
        let res = StatusCode::NOT_FOUND.into_outcome().unwrap();
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert!(res.body().is_empty());
    }
}
