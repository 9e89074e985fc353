//! Embedded static asset server library
//!
//! Serves a site bundled into the binary at build time. The modules split
//! along the same lines as the runtime flow: configuration, the read-only
//! asset store, the HTTP protocol helpers, the request handler, and the
//! connection-serving layer.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod store;
