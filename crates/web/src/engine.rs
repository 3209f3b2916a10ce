//! The application value: routes, groups and their middlewares.
//!
//! An [`Engine`] is built first, by registering routes through it or through
//! one of its [`RouterGroup`]s, and served afterwards. Serving only needs
//! `&Engine`, so a built engine is shared through an `Arc` by the server.
//!
//! ```
//! use http::StatusCode;
//! use nano_web::{handler_fn, Engine};
//!
//! let mut engine = Engine::new();
//! engine.get("/", handler_fn(|ctx| ctx.string(StatusCode::OK, "hello")));
//!
//! let mut api = engine.group("/api");
//! api.get("/users/:id", handler_fn(|ctx| {
//!     let id = ctx.param("id").unwrap_or_default().to_owned();
//!     ctx.string(StatusCode::OK, id);
//! }));
//! ```

use crate::body::ResponseBody;
use crate::context::Context;
use crate::error::{BoxError, RegistrationError};
use crate::fs::StaticFiles;
use crate::handler::Handler;
use crate::router::Router;
use bytes::Bytes;
use http::{Method, Request, Response};
use http_body::Body as HttpBody;
use std::path::PathBuf;
use tracing::debug;

/// Prefix and middlewares of one group.
struct GroupData {
    prefix: String,
    middlewares: Vec<Box<dyn Handler>>,
}

/// Routes, groups and the fallback handler of an application.
pub struct Engine {
    router: Router,
    groups: Vec<GroupData>,
}

/// A set of routes sharing a path prefix and middlewares.
///
/// A group borrows its engine mutably, it only exists while routes are
/// registered.
pub struct RouterGroup<'e> {
    engine: &'e mut Engine,
    index: usize,
}

macro_rules! method_routes {
    ($($name:ident => $method:ident),* $(,)?) => {
        $(
            #[doc = concat!("Registers a `", stringify!($method), "` route.")]
            pub fn $name(&mut self, pattern: &str, handler: impl Handler + 'static) -> &mut Self {
                self.route(Method::$method, pattern, vec![Box::new(handler)])
            }
        )*
    };
}

impl Engine {
    /// An engine with no routes and only the root group.
    pub fn new() -> Self {
        Self { router: Router::new(), groups: vec![GroupData { prefix: String::new(), middlewares: Vec::new() }] }
    }

    /// The group every route of the engine belongs to, its prefix is empty.
    pub fn root(&mut self) -> RouterGroup<'_> {
        RouterGroup { engine: self, index: 0 }
    }

    /// Creates a group whose prefix is `prefix`.
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        self.add_group(prefix.to_owned())
    }

    /// Adds a middleware applied to every request.
    pub fn use_middleware(&mut self, middleware: impl Handler + 'static) -> &mut Self {
        self.root().use_middleware(middleware);
        self
    }

    /// Registers `handlers` for `method` and `pattern`, run in order.
    pub fn route(&mut self, method: Method, pattern: &str, handlers: Vec<Box<dyn Handler>>) -> &mut Self {
        self.root().route(method, pattern, handlers);
        self
    }

    method_routes! {
        get => GET,
        post => POST,
        put => PUT,
        delete => DELETE,
        patch => PATCH,
        head => HEAD,
        options => OPTIONS,
    }

    /// Serves the files below `root_dir` under `base_url`.
    pub fn static_files(&mut self, base_url: &str, root_dir: impl Into<PathBuf>) -> &mut Self {
        self.root().static_files(base_url, root_dir);
        self
    }

    /// Sets the handler answering requests no route matches.
    ///
    /// # Errors
    /// Returns [`RegistrationError::DefaultHandlerExists`] if a default handler
    /// has already been set, the first one stays active.
    pub fn default_handler(&mut self, handler: impl Handler + 'static) -> Result<(), RegistrationError> {
        self.router.set_default_handler(Box::new(handler))
    }

    /// The routes registered so far.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Serves one request and returns its response.
    ///
    /// Group middlewares and routes are selected with the percent-decoded path.
    pub async fn handle<B>(&self, request: Request<B>) -> Response<ResponseBody>
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let mut ctx = Context::new(request);
        let chain = self.middlewares(ctx.path());

        self.router.handle(&mut ctx, chain).await;

        ctx.into_response()
    }

    /// Middlewares of every group whose prefix starts `path`, in group
    /// creation order.
    fn middlewares(&self, path: &str) -> Vec<&dyn Handler> {
        self.groups
            .iter()
            .filter(|group| path.starts_with(&group.prefix))
            .flat_map(|group| group.middlewares.iter().map(|middleware| &**middleware))
            .collect()
    }

    fn add_group(&mut self, prefix: String) -> RouterGroup<'_> {
        debug!(%prefix, "create group");
        self.groups.push(GroupData { prefix, middlewares: Vec::new() });
        let index = self.groups.len() - 1;
        RouterGroup { engine: self, index }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefixes = self.groups.iter().map(|group| group.prefix.as_str()).collect::<Vec<_>>();
        f.debug_struct("Engine").field("router", &self.router).field("groups", &prefixes).finish()
    }
}

impl RouterGroup<'_> {
    /// Full prefix of the group, parents included.
    pub fn prefix(&self) -> &str {
        &self.engine.groups[self.index].prefix
    }

    /// Creates a nested group, its prefix is appended to this group's prefix.
    ///
    /// Nesting does not inherit middlewares by itself: a request runs the
    /// middlewares of every group whose prefix matches its path.
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        let prefix = format!("{}{prefix}", self.prefix());
        self.engine.add_group(prefix)
    }

    pub fn use_middleware(&mut self, middleware: impl Handler + 'static) -> &mut Self {
        self.engine.groups[self.index].middlewares.push(Box::new(middleware));
        self
    }

    /// Registers `handlers` for `method` and `pattern` below this group's
    /// prefix.
    pub fn route(&mut self, method: Method, pattern: &str, handlers: Vec<Box<dyn Handler>>) -> &mut Self {
        let pattern = format!("{}{pattern}", self.prefix());
        self.engine.router.add_route(method, &pattern, handlers);
        self
    }

    method_routes! {
        get => GET,
        post => POST,
        put => PUT,
        delete => DELETE,
        patch => PATCH,
        head => HEAD,
        options => OPTIONS,
    }

    /// Serves the files below `root_dir` under `<prefix><base_url>/`.
    pub fn static_files(&mut self, base_url: &str, root_dir: impl Into<PathBuf>) -> &mut Self {
        let pattern = format!("{}/*{}", base_url.trim_end_matches('/'), StaticFiles::PARAM);
        self.get(&pattern, StaticFiles::new(root_dir))
    }
}

impl std::fmt::Debug for RouterGroup<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterGroup")
            .field("prefix", &self.prefix())
            .field("middlewares", &self.engine.groups[self.index].middlewares.len())
            .finish()
    }
}
