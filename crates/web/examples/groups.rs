use http::StatusCode;
use nano_web::middleware::{logger, recovery};
use nano_web::{handler_fn, middleware_fn, Engine, Server};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug)]
struct Product {
    name: String,
    stock: u32,
}

// curl -v http://127.0.0.1:8080/api/v1/products/1
// curl -v -d "name=pen&stock=3" http://127.0.0.1:8080/api/v1/products
// curl -v -H 'Content-Type: application/json' -d '{"name":"pen","stock":3}' http://127.0.0.1:8080/api/v1/products
// curl -v http://127.0.0.1:8080/admin/users
#[tokio::main]
async fn main() {
    let mut engine = Engine::new();
    engine.use_middleware(recovery()).use_middleware(logger());

    let mut api = engine.group("/api");
    api.use_middleware(middleware_fn(|ctx, next| {
        Box::pin(async move {
            if let Err(e) = ctx.set_header("X-Powered-By", "nano") {
                tracing::warn!(cause = %e, "set header error");
            }
            next.run(ctx).await;
        })
    }));

    let mut v1 = api.group("/v1");
    v1.get(
        "/products/:id",
        handler_fn(|ctx| {
            let id = ctx.param("id").unwrap_or_default().to_owned();
            ctx.json(StatusCode::OK, &serde_json::json!({ "id": id, "name": "pen" }));
        }),
    );
    v1.post(
        "/products",
        middleware_fn(|ctx, _next| {
            Box::pin(async move {
                match ctx.bind::<Product>().await {
                    Ok(product) => ctx.json(StatusCode::CREATED, &product),
                    Err(e) => e.respond(ctx),
                }
            })
        }),
    );

    let mut admin = engine.group("/admin");
    admin.use_middleware(middleware_fn(|ctx, next| {
        Box::pin(async move {
            if ctx.header("Authorization").is_some() {
                next.run(ctx).await;
            } else {
                ctx.string(StatusCode::UNAUTHORIZED, "unauthorized");
            }
        })
    }));
    admin.get("/users", handler_fn(|ctx| ctx.json(StatusCode::OK, &["admin"])));

    Server::builder().engine(engine).address("127.0.0.1:8080").build().unwrap().start().await.unwrap();
}
