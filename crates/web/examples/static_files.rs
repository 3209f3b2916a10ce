use nano_web::middleware::logger;
use nano_web::{Engine, Server};

// curl -v http://127.0.0.1:8080/assets/Cargo.toml
#[tokio::main]
async fn main() {
    let mut engine = Engine::new();
    engine.use_middleware(logger());
    engine.static_files("/assets", env!("CARGO_MANIFEST_DIR"));

    Server::builder().engine(engine).address("127.0.0.1:8080").build().unwrap().start().await.unwrap();
}
