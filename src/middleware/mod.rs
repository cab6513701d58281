//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: structured request logging, request-id handling,
//! and authentication-header inspection.
//!
//! A middleware receives the [`Request`] and a [`Next`] continuation. Calling
//! [`Next::run`] hands the request to the rest of the stack (further
//! middleware, then the router) and yields its [`Outcome`]. Whatever the
//! middleware returns becomes the outcome seen by the layer above it.
//!
//! ```rust
//! use macrus::middleware::{Middleware, Next};
//! use macrus::{BoxFuture, Request, StatusCode};
//!
//! /// Hides which resources exist from unauthenticated clients.
//! struct Conceal;
//!
//! impl Middleware for Conceal {
//!     fn handle(&self, req: Request, next: Next) -> BoxFuture {
//!         let anonymous = req.header("authorization").is_none();
//!         Box::pin(async move {
//!             let mut res = next.run(req).await?;
//!             if anonymous && res.status_code() == StatusCode::FORBIDDEN {
//!                 res.set_status(StatusCode::NOT_FOUND);
//!             }
//!             Ok(res)
//!         })
//!     }
//! }
//! ```

use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, Outcome};
use crate::request::Request;

pub mod request_logger;

pub use request_logger::RequestLogger;

/// A request/response interceptor composed around the router.
pub trait Middleware: Send + Sync + 'static {
    /// Handles one request. Implementations call `next.run(req)` at most once.
    fn handle(&self, req: Request, next: Next) -> BoxFuture;

    /// Identifier used in registration diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

pub(crate) type BoxedMiddleware = Arc<dyn Middleware>;

/// The remainder of the handler chain below the current middleware.
pub struct Next {
    stack: Arc<[BoxedMiddleware]>,
    position: usize,
    endpoint: BoxedHandler,
}

impl Next {
    pub(crate) fn new(stack: Arc<[BoxedMiddleware]>, endpoint: BoxedHandler) -> Self {
        Self { stack, position: 0, endpoint }
    }

    /// Runs the rest of the chain to completion.
    pub async fn run(self, req: Request) -> Outcome {
        let current = self.stack.get(self.position).cloned();
        match current {
            Some(middleware) => {
                let next = Next { position: self.position + 1, ..self };
                middleware.handle(req, next).await
            }
            None => self.endpoint.call(req).await,
        }
    }
}
