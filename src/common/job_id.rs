use std::fmt;

use uuid::Uuid;

pub const ASSET_EXTENSION: &str = "mp4";

/// Per-request token naming the temporary and public files of one conversion.
///
/// Backed by a UUIDv7: a millisecond timestamp followed by random bits, so ids
/// sort by creation time and stay unique when requests share a clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self, ASSET_EXTENSION)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_simple())
    }
}

/// Whether `name` looks like a file the conversion pipeline could have produced.
///
/// Only a bare `<stem>.mp4` with an ASCII alphanumeric stem (plus `-`/`_`)
/// qualifies, which keeps requests from escaping the public directory.
pub fn is_asset_file_name(name: &str) -> bool {
    let Some(stem) = name
        .strip_suffix(ASSET_EXTENSION)
        .and_then(|rest| rest.strip_suffix('.'))
    else {
        return false;
    };

    !stem.is_empty()
        && stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
