//! Route table keyed by HTTP method and pattern.
//!
//! The [`Router`] owns one [`Node`] tree per HTTP method plus the handlers
//! registered for every `(method, pattern)` pair. Resolving a request walks the
//! tree of its method and maps the matched pattern back to its handlers.

use crate::context::{Context, PathParams};
use crate::error::RegistrationError;
use crate::handler::{handler_fn, Handler, Next};
use crate::tree::{split_path, Node, PARAM_MARKER, WILDCARD_MARKER};
use http::{Method, StatusCode};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use tracing::debug;

/// Body of the built-in not found response.
pub const NOT_FOUND_BODY: &str = "nano/1.0 not found";

/// Routes of a single HTTP method.
#[derive(Default)]
struct MethodRoutes {
    root: Node,
    handlers: HashMap<String, Vec<Box<dyn Handler>>>,
}

/// Main router structure that resolves requests to handlers.
#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, MethodRoutes>,
    default_handler: Option<Box<dyn Handler>>,
    not_found_handler: OnceCell<Box<dyn Handler>>,
}

/// Result of resolving a request path.
#[derive(Debug)]
pub struct RouteMatch<'router> {
    node: &'router Node,
    params: PathParams,
    handlers: &'router [Box<dyn Handler>],
}

impl Router {
    /// A router without routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handlers` for `method` and `pattern`.
    ///
    /// Registering the same method and pattern again replaces the handlers.
    pub fn add_route(&mut self, method: Method, pattern: &str, handlers: Vec<Box<dyn Handler>>) {
        debug!(%method, pattern, handlers = handlers.len(), "register route");

        let routes = self.routes.entry(method).or_default();
        routes.root.insert(pattern, &split_path(pattern), 0);
        routes.handlers.insert(pattern.to_owned(), handlers);
    }

    /// Resolves `path` against the routes of `method`.
    ///
    /// `path` is matched as given, callers pass the percent-decoded path of
    /// [`Context::path`].
    pub fn find_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let routes = self.routes.get(method)?;
        let segments = split_path(path);

        let node = routes.root.find(&segments, 0)?;
        let pattern = node.pattern()?;
        let params = extract_params(pattern, &segments);
        let handlers = routes.handlers.get(pattern).map(Vec::as_slice).unwrap_or_default();

        Some(RouteMatch { node, params, handlers })
    }

    /// Returns the handlers registered for `method` and `pattern`.
    pub fn handlers(&self, method: &Method, pattern: &str) -> Option<&[Box<dyn Handler>]> {
        self.routes.get(method)?.handlers.get(pattern).map(Vec::as_slice)
    }

    /// Number of registered `(method, pattern)` pairs.
    pub fn len(&self) -> usize {
        self.routes.values().map(|routes| routes.handlers.len()).sum()
    }

    /// True when no route is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sets the handler serving requests no route matches.
    ///
    /// It can be set once, a second call fails and keeps the first handler.
    pub fn set_default_handler(&mut self, handler: Box<dyn Handler>) -> Result<(), RegistrationError> {
        if self.default_handler.is_some() {
            return Err(RegistrationError::DefaultHandlerExists);
        }

        self.default_handler = Some(handler);
        Ok(())
    }

    /// Whether a custom default handler was set.
    pub fn has_default_handler(&self) -> bool {
        self.default_handler.is_some()
    }

    /// Resolves the route of `ctx`, appends its handlers (or the fallback
    /// handler) to `chain` and runs the chain.
    pub async fn handle<'r>(&'r self, ctx: &mut Context, mut chain: Vec<&'r dyn Handler>) {
        match self.find_route(ctx.method(), ctx.path()) {
            Some(route_match) => {
                chain.extend(route_match.handlers.iter().map(|handler| &**handler));
                ctx.set_params(route_match.params);
            }
            None => {
                debug!(method = %ctx.method(), path = ctx.path(), "no route matched, serve default handler");
                chain.push(self.fallback_handler());
            }
        }

        Next::new(&chain).run(ctx).await;
    }

    fn fallback_handler(&self) -> &dyn Handler {
        match &self.default_handler {
            Some(handler) => handler.as_ref(),
            None => self.not_found_handler.get_or_init(not_found_handler).as_ref(),
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.len())
            .field("default_handler", &self.default_handler.is_some())
            .finish_non_exhaustive()
    }
}

impl<'router> RouteMatch<'router> {
    /// The terminal node of the matched route.
    pub fn node(&self) -> &'router Node {
        self.node
    }

    /// The pattern the route was registered with.
    pub fn pattern(&self) -> &'router str {
        self.node.pattern().unwrap_or_default()
    }

    /// Parameters bound by the pattern.
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Handlers registered for the route.
    pub fn handlers(&self) -> &'router [Box<dyn Handler>] {
        self.handlers
    }
}

/// Binds the parameters of `pattern` to the values of the request `segments`.
///
/// `:name` takes the segment at the same position, `*name` takes every
/// remaining segment joined with `/`. A bare `*` binds nothing.
fn extract_params(pattern: &str, segments: &[&str]) -> PathParams {
    let mut params = PathParams::empty();

    for (index, part) in split_path(pattern).into_iter().enumerate() {
        if let Some(name) = part.strip_prefix(PARAM_MARKER) {
            if let Some(value) = segments.get(index) {
                params.insert(name, *value);
            }
        } else if let Some(name) = part.strip_prefix(WILDCARD_MARKER)
            && !name.is_empty()
        {
            params.insert(name, segments.get(index..).unwrap_or_default().join("/"));
        }
    }

    params
}

fn not_found_handler() -> Box<dyn Handler> {
    Box::new(handler_fn(|ctx| ctx.string(StatusCode::NOT_FOUND, NOT_FOUND_BODY)))
}

#[cfg(test)]
mod tests {
    use super::{Router, NOT_FOUND_BODY};
    use crate::error::RegistrationError;
    use crate::handler::{handler_fn, Handler};
    use crate::{handlers, Context};
    use bytes::Bytes;
    use http::{Method, Request, StatusCode};
    use http_body_util::Empty;

    fn empty_handler() -> Box<dyn Handler> {
        Box::new(handler_fn(|_ctx| {}))
    }

    fn context(method: Method, uri: &str) -> Context {
        Context::new(Request::builder().method(method).uri(uri).body(Empty::<Bytes>::new()).unwrap())
    }

    async fn serve(router: &Router, method: Method, uri: &str) -> Context {
        let mut ctx = context(method, uri);
        router.handle(&mut ctx, Vec::new()).await;
        ctx
    }

    #[test]
    fn test_new_router_is_empty() {
        let router = Router::new();

        assert!(router.is_empty());
        assert!(!router.has_default_handler());
    }

    #[test]
    fn test_add_route() {
        let mut router = Router::new();

        router.add_route(Method::GET, "/", vec![empty_handler()]);
        router.add_route(Method::GET, "/about", vec![empty_handler()]);
        router.add_route(Method::GET, "/downloads/*", vec![empty_handler()]);
        router.add_route(Method::POST, "/articles/:id", vec![empty_handler()]);

        assert_eq!(router.len(), 4);
        assert!(router.handlers(&Method::GET, "/downloads/*").is_some());
        assert!(router.handlers(&Method::POST, "/articles/:id").is_some());
        assert!(router.handlers(&Method::PUT, "/articles/:id").is_none());

        router.add_route(Method::GET, "/", vec![empty_handler(), empty_handler()]);

        assert_eq!(router.len(), 4);
        assert_eq!(router.handlers(&Method::GET, "/").map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_find_route() {
        let cases: &[(&str, &str, &[(&str, &str)])] = &[
            ("/", "/", &[]),
            ("/users/:id", "users/1", &[("id", "1")]),
            ("/users/:id/about", "users/1/about", &[("id", "1")]),
            ("/users/:id/about/:section", "users/1/about/jobs", &[("id", "1"), ("section", "jobs")]),
            ("/products/:id", "/products/1/", &[("id", "1")]),
            ("/files/*path", "/files/a/b/c.txt", &[("path", "a/b/c.txt")]),
            ("/hello/:name", "/hello/world", &[("name", "world")]),
        ];

        let mut router = Router::new();
        for (pattern, path, params) in cases {
            router.add_route(Method::GET, pattern, vec![empty_handler()]);

            let route_match = router.find_route(&Method::GET, path).expect("route should be found");
            assert_eq!(route_match.pattern(), *pattern);
            assert_eq!(route_match.handlers().len(), 1);
            assert_eq!(route_match.params().len(), params.len(), "params of {path}");
            for (name, value) in *params {
                assert_eq!(route_match.params().get(name), Some(*value), "param {name} of {path}");
            }
        }
    }

    #[test]
    fn test_find_route_misses() {
        let mut router = Router::new();
        router.add_route(Method::GET, "/hello/:name", vec![empty_handler()]);
        router.add_route(Method::GET, "/files/*", vec![empty_handler()]);

        assert!(router.find_route(&Method::POST, "/hello/foo").is_none());
        assert!(router.find_route(&Method::GET, "/hello").is_none());
        assert!(router.find_route(&Method::GET, "/unregistered").is_none());

        // a nameless wildcard matches but binds nothing
        let route_match = router.find_route(&Method::GET, "/files/a/b").unwrap();
        assert!(route_match.params().is_empty());
    }

    #[test]
    fn test_default_handler_set_once() {
        let mut router = Router::new();

        assert!(router.set_default_handler(empty_handler()).is_ok());
        assert!(matches!(router.set_default_handler(empty_handler()), Err(RegistrationError::DefaultHandlerExists)));
        assert!(router.has_default_handler());
    }

    #[tokio::test]
    async fn test_handle() {
        let mut router = Router::new();
        router.add_route(
            Method::GET,
            "/hello/:name",
            handlers![handler_fn(|ctx| {
                let name = ctx.param("name").unwrap_or_default().to_owned();
                ctx.string(StatusCode::OK, format!("hello {name}"));
            })],
        );
        router.add_route(
            Method::GET,
            "/d/*path",
            handlers![handler_fn(|ctx| {
                let path = ctx.param("path").unwrap_or_default().to_owned();
                ctx.string(StatusCode::OK, format!("downloading {path}"));
            })],
        );

        let cases = [
            (Method::GET, "/unregistered/path", StatusCode::NOT_FOUND, NOT_FOUND_BODY),
            (Method::POST, "/hello/foo", StatusCode::NOT_FOUND, NOT_FOUND_BODY),
            (Method::GET, "/hello/foo", StatusCode::OK, "hello foo"),
            (Method::GET, "/d/static/app.js", StatusCode::OK, "downloading static/app.js"),
            (Method::GET, "/hello/john%20doe", StatusCode::OK, "hello john doe"),
            (Method::GET, "/d/my%20files/a%2Bb.txt", StatusCode::OK, "downloading my files/a+b.txt"),
        ];

        for (method, uri, status, body) in cases {
            let ctx = serve(&router, method, uri).await;
            assert_eq!(ctx.response_status(), status, "{uri}");
            assert_eq!(ctx.response_body(), body.as_bytes(), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_handle_with_custom_default_handler() {
        let mut router = Router::new();
        router
            .set_default_handler(Box::new(handler_fn(|ctx| ctx.string(StatusCode::OK, "it's works"))))
            .unwrap();

        let ctx = serve(&router, Method::GET, "/").await;

        assert_eq!(ctx.response_status(), StatusCode::OK);
        assert_eq!(ctx.response_body(), b"it's works");
    }

    #[tokio::test]
    async fn test_handle_runs_route_handlers_in_order() {
        let mut router = Router::new();
        let pass = || {
            crate::middleware_fn(|ctx, next| {
                Box::pin(async move {
                    ctx.write(b"-");
                    next.run(ctx).await;
                })
            })
        };
        router.add_route(
            Method::GET,
            "/",
            handlers![pass(), pass(), pass(), handler_fn(|ctx| ctx.write(b"ok")), handler_fn(|ctx| ctx.write(b"never"))],
        );

        let ctx = serve(&router, Method::GET, "/").await;

        assert_eq!(ctx.response_body(), b"---ok");
    }
}
