use http::StatusCode;
use nano_web::middleware::{logger, recovery};
use nano_web::{handler_fn, Engine, Server};
use tracing::error;

// curl -v http://127.0.0.1:3000/hello/nano
#[tokio::main]
async fn main() {
    let mut engine = Engine::new();
    engine.use_middleware(recovery()).use_middleware(logger());

    engine.get("/", handler_fn(|ctx| ctx.string(StatusCode::OK, "hello world")));
    engine.get(
        "/hello/:name",
        handler_fn(|ctx| {
            let name = ctx.param("name").unwrap_or_default().to_owned();
            ctx.string(StatusCode::OK, format!("hello {name}"));
        }),
    );

    if let Err(e) = engine.default_handler(handler_fn(|ctx| ctx.string(StatusCode::NOT_FOUND, "404 not found"))) {
        error!(cause = %e, "register default handler error");
    }

    Server::builder().engine(engine).address("127.0.0.1:3000").build().unwrap().start().await.unwrap();
}
