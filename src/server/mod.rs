//! Server module
//!
//! Listener construction, the accept loop, and per-connection serving.

pub mod connection;
pub mod listener;

pub use listener::create_listener;

use crate::config::Config;
use crate::logger;
use crate::store::AssetStore;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Process-wide immutable state shared by every connection.
pub struct AppState {
    pub config: Config,
    pub store: AssetStore,
}

impl AppState {
    pub const fn new(config: Config, store: AssetStore) -> Self {
        Self { config, store }
    }
}

/// Accept connections until the process is terminated.
///
/// Accept errors are transient (per-connection) and logged; they never stop
/// the loop.
pub async fn run(listener: TcpListener, state: Arc<AppState>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                connection::spawn_connection(stream, peer_addr, Arc::clone(&state));
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}
