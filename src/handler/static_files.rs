//! Static file serving module
//!
//! Normalizes request paths, resolves them against the asset store (with
//! directory -> index.html fallback), and assembles the response including
//! conditional-request and Range handling.

use crate::handler::router::RequestContext;
use crate::http::{self, cache, response, RangeOutcome};
use crate::logger;
use crate::store::{Asset, AssetStore};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

const INDEX_FILE: &str = "index.html";

/// Why a path failed normalization.
#[derive(Debug, PartialEq, Eq)]
enum PathError {
    /// Malformed percent escape or a decoded control byte; 400.
    BadEscape,
    /// A `..` segment would escape the store root; 404.
    Traversal,
}

/// Outcome of resolving a request path against the store.
pub enum Resolution<'a> {
    Found(&'a Asset),
    NotFound,
    BadRequest,
    TraversalRejected,
}

/// Serve a request path from the store.
pub fn serve(ctx: &RequestContext<'_>, store: &AssetStore) -> Response<Full<Bytes>> {
    let asset = match resolve(store, ctx.path) {
        Resolution::Found(asset) => asset,
        Resolution::NotFound => return http::build_404_response(),
        Resolution::BadRequest => return http::build_400_response(),
        Resolution::TraversalRejected => {
            // Possible abuse signal, worth a log line
            logger::log_warning(&format!("Path traversal attempt blocked: {}", ctx.path));
            return http::build_404_response();
        }
    };

    // If-None-Match takes precedence over If-Modified-Since when both are
    // present (RFC 9110 §13.1.3).
    let not_modified = if ctx.if_none_match.is_some() {
        cache::etag_matches(ctx.if_none_match.as_deref(), &asset.etag)
    } else {
        cache::not_modified_since(ctx.if_modified_since.as_deref(), asset.modtime)
    };
    if not_modified {
        return http::build_304_response(&asset.etag);
    }

    let last_modified = cache::http_date(asset.modtime);

    match http::parse_range_header(ctx.range_header.as_deref(), asset.size) {
        RangeOutcome::Satisfiable(range) => {
            let start = range.start;
            let end = range.end_position(asset.size);
            response::build_partial_response(
                asset.content.slice(start..=end),
                &asset.content_type,
                &asset.etag,
                &last_modified,
                start,
                end,
                asset.size,
                ctx.is_head,
            )
        }
        RangeOutcome::Unsatisfiable => http::build_416_response(asset.size),
        RangeOutcome::Ignored => response::build_asset_response(
            asset.content.clone(),
            &asset.content_type,
            &asset.etag,
            &last_modified,
            ctx.is_head,
        ),
    }
}

/// Resolve a raw URL path to an asset.
///
/// Resolution order: exact asset, then `index.html` when the path names a
/// directory (empty, trailing slash, or a known directory prefix).
pub fn resolve<'a>(store: &'a AssetStore, raw_path: &str) -> Resolution<'a> {
    let normalized = match normalize_path(raw_path) {
        Ok(path) => path,
        Err(PathError::BadEscape) => return Resolution::BadRequest,
        Err(PathError::Traversal) => return Resolution::TraversalRejected,
    };

    let is_dir_request = normalized.is_empty() || normalized.ends_with('/');
    let file_path = normalized.trim_end_matches('/');

    if !is_dir_request {
        if let Some(asset) = store.open(file_path) {
            return Resolution::Found(asset);
        }
    }

    if is_dir_request || store.is_dir(file_path) {
        let index_path = if file_path.is_empty() {
            INDEX_FILE.to_string()
        } else {
            format!("{file_path}/{INDEX_FILE}")
        };
        if let Some(asset) = store.open(&index_path) {
            return Resolution::Found(asset);
        }
    }

    Resolution::NotFound
}

/// Normalize a URL path into a store key.
///
/// Percent-decodes, drops empty and `.` segments, and resolves `..` against
/// a segment stack. Fails closed: a `..` that would pop past the root is a
/// traversal, a malformed escape or decoded NUL is a bad request. A
/// trailing slash is preserved to signal directory intent.
fn normalize_path(raw: &str) -> Result<String, PathError> {
    let decoded = percent_decode(raw).ok_or(PathError::BadEscape)?;
    if decoded.contains('\0') {
        return Err(PathError::BadEscape);
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(PathError::Traversal);
                }
            }
            other => segments.push(other),
        }
    }

    let mut normalized = segments.join("/");
    if decoded.ends_with('/') && !normalized.is_empty() {
        normalized.push('/');
    }
    Ok(normalized)
}

/// Decode percent escapes. Returns `None` for truncated or non-hex escapes
/// and for sequences that do not decode to valid UTF-8.
fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = hex_value(*bytes.get(i + 1)?)?;
            let lo = hex_value(*bytes.get(i + 2)?)?;
            out.push((hi << 4) | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).ok()
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use http_body_util::BodyExt;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn asset(body: &'static str, content_type: &str, etag: &str) -> Asset {
        Asset {
            content: Bytes::from_static(body.as_bytes()),
            size: body.len(),
            modtime: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            content_type: content_type.to_string(),
            etag: format!("\"{etag}\""),
        }
    }

    fn test_store() -> AssetStore {
        let mut assets = HashMap::new();
        assets.insert(
            "index.html".to_string(),
            asset("Hello world\n", "text/html", "home"),
        );
        assets.insert(
            "css/app.css".to_string(),
            asset("body { margin: 0 }", "text/css", "css"),
        );
        assets.insert(
            "app.js".to_string(),
            asset("console.log('hi')", "application/javascript", "js"),
        );
        assets.insert(
            "docs/index.html".to_string(),
            asset("docs home", "text/html", "docs"),
        );
        AssetStore::from_assets(assets)
    }

    fn get(path: &str) -> RequestContext<'_> {
        RequestContext {
            path,
            is_head: false,
            if_none_match: None,
            if_modified_since: None,
            range_header: None,
        }
    }

    async fn body_of(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/").unwrap(), "");
        assert_eq!(normalize_path("/css/app.css").unwrap(), "css/app.css");
        assert_eq!(normalize_path("/a/../css/app.css").unwrap(), "css/app.css");
        assert_eq!(normalize_path("/docs/").unwrap(), "docs/");
        assert_eq!(normalize_path("//a///b/./c").unwrap(), "a/b/c");
        assert_eq!(normalize_path("/caf%C3%A9.html").unwrap(), "café.html");
    }

    #[test]
    fn test_normalize_rejects_traversal() {
        assert_eq!(normalize_path("/../x").unwrap_err(), PathError::Traversal);
        assert_eq!(
            normalize_path("/../../etc/passwd").unwrap_err(),
            PathError::Traversal
        );
        // Encoded dots decode before segmentation, so they cannot escape
        assert_eq!(
            normalize_path("/%2e%2e/secret").unwrap_err(),
            PathError::Traversal
        );
    }

    #[test]
    fn test_normalize_rejects_bad_escapes() {
        assert_eq!(normalize_path("/%zz").unwrap_err(), PathError::BadEscape);
        assert_eq!(normalize_path("/a%0").unwrap_err(), PathError::BadEscape);
        assert_eq!(normalize_path("/a%00b").unwrap_err(), PathError::BadEscape);
    }

    #[tokio::test]
    async fn test_serves_root_index() {
        let store = test_store();
        let resp = serve(&get("/"), &store);
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Type"], "text/html");
        assert_eq!(resp.headers()["Content-Length"], "12");
        assert_eq!(body_of(resp).await.as_ref(), b"Hello world\n");
    }

    #[tokio::test]
    async fn test_serves_nested_asset() {
        let store = test_store();
        let resp = serve(&get("/css/app.css"), &store);
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Type"], "text/css");
        assert_eq!(body_of(resp).await.as_ref(), b"body { margin: 0 }");
    }

    #[tokio::test]
    async fn test_missing_asset_is_404() {
        let store = test_store();
        let resp = serve(&get("/missing.png"), &store);
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_directory_serves_index_with_and_without_slash() {
        let store = test_store();
        let with_slash = serve(&get("/docs/"), &store);
        assert_eq!(with_slash.status(), 200);
        assert_eq!(body_of(with_slash).await.as_ref(), b"docs home");

        let without_slash = serve(&get("/docs"), &store);
        assert_eq!(without_slash.status(), 200);

        // A directory without an index file is a miss
        let css_dir = serve(&get("/css/"), &store);
        assert_eq!(css_dir.status(), 404);
    }

    #[tokio::test]
    async fn test_traversal_never_escapes() {
        let store = test_store();
        assert_eq!(serve(&get("/../../etc/passwd"), &store).status(), 404);
        assert_eq!(serve(&get("/%2e%2e/%2e%2e/etc/passwd"), &store).status(), 404);
        // In-bundle after collapsing is fine
        assert_eq!(serve(&get("/docs/../app.js"), &store).status(), 200);
    }

    #[tokio::test]
    async fn test_malformed_escape_is_400() {
        let store = test_store();
        assert_eq!(serve(&get("/%zz"), &store).status(), 400);
    }

    #[tokio::test]
    async fn test_head_same_headers_empty_body() {
        let store = test_store();
        let get_resp = serve(&get("/app.js"), &store);

        let mut ctx = get("/app.js");
        ctx.is_head = true;
        let head_resp = serve(&ctx, &store);

        assert_eq!(head_resp.status(), get_resp.status());
        assert_eq!(
            head_resp.headers()["Content-Length"],
            get_resp.headers()["Content-Length"]
        );
        assert_eq!(head_resp.headers()["ETag"], get_resp.headers()["ETag"]);
        assert!(body_of(head_resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_etag_conditional_hits_304() {
        let store = test_store();
        let mut ctx = get("/index.html");
        ctx.if_none_match = Some("\"home\"".to_string());

        let resp = serve(&ctx, &store);
        assert_eq!(resp.status(), 304);
        assert_eq!(resp.headers()["ETag"], "\"home\"");
        assert!(body_of(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_if_modified_since_conditional() {
        let store = test_store();

        let mut ctx = get("/index.html");
        ctx.if_modified_since = Some("Wed, 01 May 2024 12:00:00 GMT".to_string());
        assert_eq!(serve(&ctx, &store).status(), 304);

        let mut ctx = get("/index.html");
        ctx.if_modified_since = Some("Tue, 30 Apr 2024 12:00:00 GMT".to_string());
        assert_eq!(serve(&ctx, &store).status(), 200);
    }

    #[tokio::test]
    async fn test_if_none_match_takes_precedence() {
        let store = test_store();
        let mut ctx = get("/index.html");
        ctx.if_none_match = Some("\"stale\"".to_string());
        ctx.if_modified_since = Some("Wed, 01 May 2024 12:00:00 GMT".to_string());

        // ETag mismatch wins over a not-newer timestamp
        assert_eq!(serve(&ctx, &store).status(), 200);
    }

    #[tokio::test]
    async fn test_range_request() {
        let store = test_store();
        let mut ctx = get("/index.html");
        ctx.range_header = Some("bytes=0-4".to_string());

        let resp = serve(&ctx, &store);
        assert_eq!(resp.status(), 206);
        assert_eq!(resp.headers()["Content-Range"], "bytes 0-4/12");
        assert_eq!(body_of(resp).await.as_ref(), b"Hello");
    }

    #[tokio::test]
    async fn test_range_not_satisfiable() {
        let store = test_store();
        let mut ctx = get("/index.html");
        ctx.range_header = Some("bytes=12-".to_string());

        let resp = serve(&ctx, &store);
        assert_eq!(resp.status(), 416);
        assert_eq!(resp.headers()["Content-Range"], "bytes */12");
    }

    #[tokio::test]
    async fn test_concurrent_requests_do_not_interleave() {
        let mut assets = HashMap::new();
        for i in 0..16 {
            let body: &'static str = Box::leak(format!("payload-{i}").repeat(64).into_boxed_str());
            assets.insert(
                format!("f{i}.txt"),
                Asset {
                    size: body.len(),
                    content: Bytes::from_static(body.as_bytes()),
                    modtime: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
                    content_type: "text/plain".to_string(),
                    etag: format!("\"f{i}\""),
                },
            );
        }
        let store = Arc::new(AssetStore::from_assets(assets));

        let mut tasks = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                let path = format!("/f{i}.txt");
                let resp = serve(&get(&path), &store);
                assert_eq!(resp.status(), 200);
                let body = body_of(resp).await;
                assert_eq!(body.as_ref(), format!("payload-{i}").repeat(64).as_bytes());
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
    }
}
