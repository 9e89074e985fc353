//! Startup error taxonomy
//!
//! Only construction-time failures are fatal; everything that happens after
//! the listener is bound is converted to an HTTP status code inside the
//! handler and never surfaces here.

use crate::store::StoreError;
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("asset bundle error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to start runtime: {0}")]
    Runtime(#[from] io::Error),
}
