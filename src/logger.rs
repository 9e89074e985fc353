//! Logger module
//!
//! Timestamped stdout/stderr logging: a startup banner, a Common Log
//! Format style access line per request, and warning/error lines for
//! abnormal conditions.

use chrono::Local;
use std::net::SocketAddr;

fn timestamp() -> String {
    Local::now().format("%d/%b/%Y:%H:%M:%S %z").to_string()
}

pub fn log_server_start(addr: &SocketAddr, asset_count: usize) {
    println!("======================================");
    println!("Static asset server started");
    println!("Listening on: http://{addr}");
    println!("Serving {asset_count} embedded assets");
    println!("======================================");
}

/// One line per completed request, gated by `logging.access_log`.
pub fn log_access(method: &str, path: &str, status: u16, body_bytes: usize) {
    println!("[{}] \"{method} {path}\" {status} {body_bytes}", timestamp());
}

pub fn log_warning(message: &str) {
    eprintln!("[{}] [WARN] {message}", timestamp());
}

pub fn log_error(message: &str) {
    eprintln!("[{}] [ERROR] {message}", timestamp());
}

/// Connection-level failures, including clients that disconnect
/// mid-response. Best-effort only; nothing is retried.
pub fn log_connection_error(peer: &SocketAddr, err: &impl std::fmt::Debug) {
    eprintln!(
        "[{}] [ERROR] connection from {peer} failed: {err:?}",
        timestamp()
    );
}
