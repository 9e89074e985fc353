//! Range header parsing
//!
//! Single-range `bytes=` parsing per RFC 7233. Multi-range and non-byte
//! units are ignored rather than rejected, falling back to a full response.

/// An inclusive byte range within an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    /// Inclusive end position; `None` means until the end of the asset.
    pub end: Option<usize>,
}

impl ByteRange {
    /// Resolve the inclusive end position against the asset size.
    #[inline]
    pub fn end_position(&self, size: usize) -> usize {
        self.end.unwrap_or_else(|| size.saturating_sub(1))
    }
}

/// Outcome of parsing a `Range` header against a known asset size.
#[derive(Debug)]
pub enum RangeOutcome {
    /// A satisfiable range; respond with 206 Partial Content.
    Satisfiable(ByteRange),
    /// Syntactically valid but outside the asset; respond with 416.
    Unsatisfiable,
    /// No header, or a form we do not serve; respond with the full asset.
    Ignored,
}

/// Parse a `Range` header value.
///
/// Supported forms: `bytes=start-end`, `bytes=start-`, `bytes=-suffix`.
pub fn parse_range_header(range_header: Option<&str>, size: usize) -> RangeOutcome {
    let Some(spec) = range_header.and_then(|h| h.strip_prefix("bytes=")) else {
        return RangeOutcome::Ignored;
    };

    // Single range only
    if spec.contains(',') {
        return RangeOutcome::Ignored;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeOutcome::Ignored;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    // Suffix form: "-500" is the last 500 bytes
    if start_str.is_empty() {
        let Ok(suffix) = end_str.parse::<usize>() else {
            return RangeOutcome::Ignored;
        };
        if suffix == 0 || size == 0 {
            return RangeOutcome::Unsatisfiable;
        }
        return RangeOutcome::Satisfiable(ByteRange {
            start: size.saturating_sub(suffix),
            end: Some(size - 1),
        });
    }

    let Ok(start) = start_str.parse::<usize>() else {
        return RangeOutcome::Ignored;
    };
    if start >= size {
        return RangeOutcome::Unsatisfiable;
    }

    let end = if end_str.is_empty() {
        None
    } else {
        match end_str.parse::<usize>() {
            // Clamp to the last byte; an end beyond the asset is still valid
            Ok(end) if end >= start => Some(end.min(size - 1)),
            Ok(_) => return RangeOutcome::Unsatisfiable,
            Err(_) => return RangeOutcome::Ignored,
        }
    };

    RangeOutcome::Satisfiable(ByteRange { start, end })
}
