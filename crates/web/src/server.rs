//! HTTP/1.1 server serving an [`Engine`].
//!
//! ```no_run
//! use http::StatusCode;
//! use nano_web::{handler_fn, Engine, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut engine = Engine::new();
//!     engine.get("/", handler_fn(|ctx| ctx.string(StatusCode::OK, "hello world")));
//!
//!     let server = Server::builder().engine(engine).address("127.0.0.1:8080").build().unwrap();
//!     server.start().await.unwrap();
//! }
//! ```

use crate::engine::Engine;
use crate::error::{ServerBuildError, ServerError};
use http::Request;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug)]
pub struct ServerBuilder {
    engine: Option<Arc<Engine>>,
    address: Option<io::Result<Vec<SocketAddr>>>,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { engine: None, address: None }
    }

    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    /// Sets the engine to serve, registration must be complete at this point.
    pub fn engine(mut self, engine: impl Into<Arc<Engine>>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let engine = self.engine.ok_or(ServerBuildError::MissingEngine)?;
        let address = self.address.ok_or(ServerBuildError::MissingAddress)??;
        Ok(Server { engine, address })
    }
}

#[derive(Debug)]
pub struct Server {
    engine: Arc<Engine>,
    address: Vec<SocketAddr>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn address(&self) -> &[SocketAddr] {
        &self.address
    }

    /// Binds the configured address and serves connections until the process
    /// stops.
    ///
    /// Installs a `FmtSubscriber` at `INFO` unless a global subscriber exists.
    pub async fn start(self) -> Result<(), ServerError> {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            debug!(cause = %e, "global subscriber already set");
        }

        info!("start listening at {:?}", self.address);
        let tcp_listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return Err(ServerError::Bind { source: e });
            }
        };

        serve(self.engine, tcp_listener).await;
        Ok(())
    }
}

/// Accepts connections from `tcp_listener` and serves each one on its own task.
pub async fn serve(engine: Arc<Engine>, tcp_listener: TcpListener) {
    loop {
        let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
            Ok(stream_and_addr) => stream_and_addr,
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                continue;
            }
        };

        let engine = Arc::clone(&engine);

        tokio::spawn(async move {
            let service = service_fn(move |request: Request<Incoming>| {
                let engine = Arc::clone(&engine);
                async move { Ok::<_, Infallible>(engine.handle(request).await) }
            });

            match http1::Builder::new().serve_connection(TokioIo::new(tcp_stream), service).await {
                Ok(()) => debug!(%remote_addr, "finished process, connection shutdown"),
                Err(e) => warn!(cause = %e, %remote_addr, "service has error, connection shutdown"),
            }
        });
    }
}
