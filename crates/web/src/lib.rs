//! A tiny HTTP router with middleware chaining.
//!
//! Routes are stored in a segment tree per HTTP method and may contain named
//! parameters (`/users/:id`) and a trailing wildcard (`/files/*path`). Every
//! request runs an ordered chain of [`Handler`]s: the middlewares of every
//! group whose prefix matches the request path, then the handlers of the
//! matched route, or a single fallback handler when nothing matched.
//!
//! ```no_run
//! use http::StatusCode;
//! use nano_web::middleware::{logger, recovery};
//! use nano_web::{handler_fn, Engine, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut engine = Engine::new();
//!     engine.use_middleware(recovery()).use_middleware(logger());
//!     engine.get("/hello/:name", handler_fn(|ctx| {
//!         let name = ctx.param("name").unwrap_or_default().to_owned();
//!         ctx.string(StatusCode::OK, format!("hello {name}"));
//!     }));
//!
//!     let server = Server::builder().engine(engine).address("127.0.0.1:8080").build().unwrap();
//!     server.start().await.unwrap();
//! }
//! ```

mod bind;
mod body;
mod context;
mod engine;
mod error;
mod handler;
mod server;

pub mod fs;
pub mod middleware;
pub mod router;
pub mod tree;

pub use bind::BindingError;
pub use body::ResponseBody;
pub use context::Context;
pub use context::PathParams;
pub use context::INTERNAL_SERVER_ERROR_BODY;
pub use engine::Engine;
pub use engine::RouterGroup;
pub use error::BodyError;
pub use error::BoxError;
pub use error::RegistrationError;
pub use error::ServerBuildError;
pub use error::ServerError;
pub use handler::handler_fn;
pub use handler::middleware_fn;
pub use handler::Handler;
pub use handler::HandlerFn;
pub use handler::MiddlewareFn;
pub use handler::Next;
pub use router::Router;
pub use server::serve;
pub use server::Server;
pub use server::ServerBuilder;
