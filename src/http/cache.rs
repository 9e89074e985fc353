//! Conditional request validation
//!
//! `ETag` / `If-None-Match` and `Last-Modified` / `If-Modified-Since`
//! checks. Timestamps are compared at second granularity because the
//! HTTP-date format carries no sub-second precision.

use chrono::{DateTime, Utc};

/// Check whether the client's `If-None-Match` header matches the asset's
/// `ETag`. Comma-separated lists and the `*` wildcard are honored.
pub fn etag_matches(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etags| {
        client_etags
            .split(',')
            .any(|candidate| candidate.trim() == etag || candidate.trim() == "*")
    })
}

/// Check whether the asset is unchanged relative to an `If-Modified-Since`
/// timestamp. An unparsable header is ignored and the full response is sent.
pub fn not_modified_since(if_modified_since: Option<&str>, modtime: DateTime<Utc>) -> bool {
    let Some(header) = if_modified_since else {
        return false;
    };
    let Ok(since) = DateTime::parse_from_rfc2822(header) else {
        return false;
    };
    modtime.timestamp() <= since.timestamp()
}

/// Format a timestamp as an HTTP-date for the `Last-Modified` header.
pub fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
