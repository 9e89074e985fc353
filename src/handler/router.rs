//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, header
//! extraction, dispatch to the static handler, and access logging. Lookup
//! failures never leave this layer as errors; every request produces a
//! response.

use crate::handler::static_files;
use crate::http;
use crate::logger;
use crate::server::AppState;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

/// Request context encapsulating the information needed to serve an asset.
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub range_header: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let is_head = method == Method::HEAD;

    let response = match check_http_method(&method) {
        Some(resp) => resp,
        None => {
            let ctx = RequestContext {
                path: &path,
                is_head,
                if_none_match: header_string(&req, "if-none-match"),
                if_modified_since: header_string(&req, "if-modified-since"),
                range_header: header_string(&req, "range"),
            };
            static_files::serve(&ctx, &state.store)
        }
    };

    if state.config.logging.access_log {
        logger::log_access(
            method.as_str(),
            &path,
            response.status().as_u16(),
            body_bytes_sent(&response, is_head),
        );
    }

    Ok(response)
}

/// Only GET and HEAD carry static-serving semantics; OPTIONS is answered
/// with the method list and everything else is rejected.
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

fn header_string(req: &Request<hyper::body::Incoming>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Body bytes actually sent, for the access log. HEAD responses carry a
/// Content-Length but no body.
fn body_bytes_sent(response: &Response<Full<Bytes>>, is_head: bool) -> usize {
    if is_head {
        return 0;
    }
    response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}
