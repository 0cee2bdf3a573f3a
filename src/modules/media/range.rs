//! `Range` header parsing for single byte ranges.

/// Outcome of interpreting a `Range` header against a file of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    /// No usable range: serve the whole file.
    Full,
    /// Inclusive byte range, already clamped to the file.
    Partial { start: u64, end: u64 },
    /// Well-formed but outside the file.
    Unsatisfiable,
}

impl RangeRequest {
    /// Interprets a raw `Range` header value.
    ///
    /// Supported forms are `bytes=<start>-<end>`, `bytes=<start>-` and
    /// `bytes=-<suffix>`. Anything that does not parse (other units, several
    /// ranges, non-numeric bounds) yields [`RangeRequest::Full`].
    pub fn parse(header: Option<&str>, file_size: u64) -> Self {
        let Some(ranges) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
            return RangeRequest::Full;
        };

        let Some((start, end)) = ranges.split_once('-') else {
            return RangeRequest::Full;
        };
        let (start, end) = (start.trim(), end.trim());

        if end.contains(',') || end.contains('-') {
            return RangeRequest::Full;
        }

        match (start.is_empty(), end.is_empty()) {
            (true, true) => RangeRequest::Full,
            // bytes=-500: the last 500 bytes
            (true, false) => {
                let Ok(suffix) = end.parse::<u64>() else {
                    return RangeRequest::Full;
                };
                if suffix == 0 || file_size == 0 {
                    return RangeRequest::Unsatisfiable;
                }
                RangeRequest::Partial {
                    start: file_size.saturating_sub(suffix),
                    end: file_size - 1,
                }
            }
            (false, _) => {
                let Ok(start) = start.parse::<u64>() else {
                    return RangeRequest::Full;
                };
                let end = if end.is_empty() {
                    None
                } else {
                    match end.parse::<u64>() {
                        Ok(end) => Some(end),
                        Err(_) => return RangeRequest::Full,
                    }
                };

                if start >= file_size {
                    return RangeRequest::Unsatisfiable;
                }
                let last = file_size - 1;
                let end = end.map_or(last, |e| e.min(last));
                if start > end {
                    return RangeRequest::Unsatisfiable;
                }
                RangeRequest::Partial { start, end }
            }
        }
    }
}
