use std::sync::Arc;

use privacy_server::{shutdown_signal, ServerBuilder};

#[tokio::main]
async fn main() -> Result<(), privacy_core::error::BoxError> {
    dotenv::dotenv().ok();
    structured_logger::Builder::with_level(
        &std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
    )
    .init();

    let port = std::env::var("PRIVACY_PORT").unwrap_or_else(|_| "8787".to_string());
    let addr = format!("0.0.0.0:{port}");

    let backend: Arc<dyn object_store::ObjectStore> = match std::env::var("PRIVACY_STORE_PATH") {
        Ok(path) => Arc::new(object_store::local::LocalFileSystem::new_with_prefix(path)?),
        Err(_) => Arc::new(object_store::memory::InMemory::new()),
    };

    ServerBuilder::new()
        .with_addr(addr)
        .with_backend(backend)
        .serve(shutdown_signal())
        .await
}
