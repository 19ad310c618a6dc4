use std::path::Path;

pub const CHUNK_SIZE: usize = 8192;

/// Inclusive byte range resolved against a file length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// How a `Range` header applies to a file of known length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    /// No usable range: serve the whole file.
    Full,
    Partial(ByteRange),
    /// Well-formed but starts past the end; answered with 416.
    Unsatisfiable,
}

/// Parses a single-range `Range` header (`bytes=a-b`, `bytes=a-`, `bytes=-n`).
/// Malformed and multi-range headers are ignored.
pub fn parse_byte_range(header: &str, total: u64) -> RangeRequest {
    let Some(spec) = header.trim().strip_prefix("bytes=") else {
        return RangeRequest::Full;
    };
    if spec.contains(',') {
        return RangeRequest::Full;
    }
    let Some((start, end)) = spec.split_once('-') else {
        return RangeRequest::Full;
    };

    match (start.trim(), end.trim()) {
        ("", suffix) => match suffix.parse::<u64>() {
            Ok(0) => RangeRequest::Unsatisfiable,
            Ok(_) if total == 0 => RangeRequest::Unsatisfiable,
            Ok(n) => RangeRequest::Partial(ByteRange {
                start: total.saturating_sub(n),
                end: total - 1,
            }),
            Err(_) => RangeRequest::Full,
        },
        (start, end) => {
            let Ok(start) = start.parse::<u64>() else {
                return RangeRequest::Full;
            };
            let end = if end.is_empty() {
                None
            } else {
                match end.parse::<u64>() {
                    Ok(end) if end >= start => Some(end),
                    _ => return RangeRequest::Full,
                }
            };
            if start >= total {
                return RangeRequest::Unsatisfiable;
            }
            let end = end.map_or(total - 1, |end| end.min(total - 1));
            RangeRequest::Partial(ByteRange { start, end })
        }
    }
}

pub fn content_type_for(filename: &str) -> String {
    mime_guess::from_path(Path::new(filename))
        .first_or_octet_stream()
        .to_string()
}
