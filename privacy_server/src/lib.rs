use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use object_store::ObjectStore;
use structured_logger::unix_ms;

pub mod auth;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;

pub use state::AppState;

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builder for the privacy-layer HTTP service.
pub struct ServerBuilder {
    app_name: String,
    app_version: String,
    addr: String,
    backend: Option<Arc<dyn ObjectStore>>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        ServerBuilder {
            app_name: APP_NAME.to_string(),
            app_version: APP_VERSION.to_string(),
            addr: "0.0.0.0:8787".to_string(),
            backend: None,
        }
    }

    pub fn with_app_name(mut self, app_name: String) -> Self {
        self.app_name = app_name;
        self
    }

    pub fn with_addr(mut self, addr: String) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_backend(mut self, backend: Arc<dyn ObjectStore>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub async fn serve(
        self,
        signal: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), privacy_core::error::BoxError> {
        let backend = self
            .backend
            .unwrap_or_else(|| Arc::new(object_store::memory::InMemory::new()));
        let state = AppState::new(backend);
        let app = routes::router(state);

        let addr: SocketAddr = self.addr.parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::warn!(
            "{}@{} listening on {:?} at {}",
            self.app_name,
            self.app_version,
            addr,
            unix_ms()
        );

        axum::serve(listener, app).with_graceful_shutdown(signal).await?;
        Ok(())
    }
}

pub async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    log::warn!("received termination signal, starting graceful shutdown");
}
