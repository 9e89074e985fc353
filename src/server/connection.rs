// Connection handling module
// Serves a single TCP connection with hyper's HTTP/1.1 stack

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;

use crate::handler;
use crate::logger;
use crate::server::AppState;

/// Serve one connection in its own task.
///
/// Keep-alive is left on so clients can reuse the connection. Errors here
/// include clients that disconnect mid-response; they are logged and
/// dropped, never propagated. The task holds only an `Arc` to the shared
/// read-only state, so no cleanup is needed on abort.
pub fn spawn_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let service = service_fn(move |req| {
            let state = Arc::clone(&state);
            async move { handler::handle_request(req, state).await }
        });

        let conn = http1::Builder::new().keep_alive(true).serve_connection(io, service);

        if let Err(err) = conn.await {
            logger::log_connection_error(&peer_addr, &err);
        }
    });
}
