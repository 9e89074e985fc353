//! Process entry point
//!
//! Builds the configuration and the embedded asset store, binds the
//! listener, and runs the accept loop. Any failure before the listener is
//! serving terminates the process with a diagnostic and a non-zero exit
//! code.

use rust_embed::RustEmbed;
use static_bundle_server::config::Config;
use static_bundle_server::error::StartupError;
use static_bundle_server::logger;
use static_bundle_server::server::{self, AppState};
use static_bundle_server::store::AssetStore;
use std::sync::Arc;

/// Site files embedded into the binary at build time. The store is rooted
/// at `static` so the packaging directory never appears in URLs.
#[derive(RustEmbed)]
#[folder = "assets/"]
struct Bundle;

fn main() {
    if let Err(e) = run() {
        eprintln!("fatal: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), StartupError> {
    let cfg = Config::load()?;

    // The store must be fully populated before the listener starts
    let store = AssetStore::from_embedded::<Bundle>()?.rooted("static")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(serve(cfg, store))
}

async fn serve(cfg: Config, store: AssetStore) -> Result<(), StartupError> {
    let addr = cfg.socket_addr()?;
    let listener =
        server::create_listener(addr).map_err(|source| StartupError::Bind { addr, source })?;

    let state = Arc::new(AppState::new(cfg, store));
    logger::log_server_start(&addr, state.store.len());

    server::run(listener, state).await;
    Ok(())
}
