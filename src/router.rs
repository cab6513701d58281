//! Radix-tree request router and middleware stack.
//!
//! One tree per HTTP method, O(path-length) lookup. Middleware registered
//! with [`Router::layer`] wraps every request, including the ones that match
//! no route, so logging and similar layers see the 404 too.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;
use tracing::{debug, error};

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::middleware::{BoxedMiddleware, Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Every builder method returns `self` so registrations chain naturally.
pub struct Router {
    routes: Routes,
    middleware: Vec<BoxedMiddleware>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Routes::default(), middleware: Vec::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them:
    ///
    /// ```rust
    /// # use macrus::{Method, Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/users/{id}", get_user)
    ///     .on(Method::POST, "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route pattern or conflicts with one
    /// already registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes.trees
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Wrap the router in `middleware`. The first layer registered is the
    /// outermost: it sees the request first and the response last.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        debug!(middleware = middleware.name(), position = self.middleware.len(), "middleware registered");
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub(crate) fn into_dispatcher(self) -> Dispatcher {
        Dispatcher {
            stack: self.middleware.into(),
            endpoint: Arc::new(self.routes),
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

// ── Route table ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct Routes {
    trees: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Routes {
    fn lookup(&self, method: &Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.trees.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

/// The innermost link of the chain: route lookup, or 404.
impl ErasedHandler for Routes {
    fn call(&self, mut req: Request) -> BoxFuture {
        match self.lookup(&req.method, &req.path) {
            Some((handler, params)) => {
                req.params = params;
                handler.call(req)
            }
            None => Box::pin(async { Ok(Response::status(StatusCode::NOT_FOUND)) }),
        }
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// A finished router: the middleware stack frozen around the route table.
pub(crate) struct Dispatcher {
    stack: Arc<[BoxedMiddleware]>,
    endpoint: BoxedHandler,
}

impl Dispatcher {
    /// Runs one request through every layer and the route table.
    ///
    /// An error that no middleware absorbed is logged and answered with 500.
    pub(crate) async fn dispatch(&self, req: Request) -> Response {
        let next = Next::new(Arc::clone(&self.stack), Arc::clone(&self.endpoint));
        match next.run(req).await {
            Ok(res) => res,
            Err(e) => {
                error!("unhandled handler error: {e:#}");
                Response::status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use bytes::Bytes;
    use http::HeaderMap;

    use super::*;
    use crate::handler::Outcome;

    fn request(method: Method, path: &str) -> Request {
        Request::new(method, path, HeaderMap::new(), Bytes::new(), "127.0.0.1:9000".parse().unwrap())
    }

    async fn get_user(req: Request) -> Response {
        Response::text(format!("user {}", req.param("id").unwrap_or("?")))
    }

    async fn explode(_req: Request) -> Outcome {
        Err(anyhow!("boom"))
    }

    /// Appends its tag to the `x-trail` response header on the way out.
    struct Trail(&'static str);

    impl Middleware for Trail {
        fn handle(&self, req: Request, next: Next) -> BoxFuture {
            let tag = self.0;
            Box::pin(async move {
                let mut res = next.run(req).await?;
                let trail = match res.header("x-trail") {
                    Some(t) => format!("{t},{tag}"),
                    None => tag.to_owned(),
                };
                res.headers.retain(|(k, _)| k != "x-trail");
                res.headers.push(("x-trail".to_owned(), trail));
                Ok(res)
            })
        }
    }

    #[tokio::test]
    async fn routes_by_method_and_extracts_params() {
        let app = Router::new().on(Method::GET, "/users/{id}", get_user).into_dispatcher();

        let res = app.dispatch(request(Method::GET, "/users/42")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"user 42");

        let res = app.dispatch(request(Method::DELETE, "/users/42")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn first_layer_is_outermost() {
        let app = Router::new()
            .layer(Trail("outer"))
            .layer(Trail("inner"))
            .on(Method::GET, "/users/{id}", get_user)
            .into_dispatcher();

        let res = app.dispatch(request(Method::GET, "/users/1")).await;
        assert_eq!(res.header("x-trail"), Some("inner,outer"));

        let res = app.dispatch(request(Method::GET, "/nowhere")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(res.header("x-trail"), Some("inner,outer"));
    }

    #[tokio::test]
    async fn unabsorbed_error_is_a_bare_500() {
        let app = Router::new().on(Method::GET, "/boom", explode).into_dispatcher();

        let res = app.dispatch(request(Method::GET, "/boom")).await;
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(res.body().is_empty());
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_route_panics() {
        let _ = Router::new()
            .on(Method::GET, "/users/{id}", get_user)
            .on(Method::GET, "/users/{name}", get_user);
    }
}
