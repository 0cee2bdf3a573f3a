use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::warn;

pub enum EnvKey {
    ServerPort,
    TempDir,
    PublicDir,
    FfmpegPath,
    DownloadTimeoutSecs,
    TranscodeTimeoutSecs,
    PublicBaseUrl,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "PORT",
            EnvKey::TempDir => "TEMP_DIR",
            EnvKey::PublicDir => "PUBLIC_DIR",
            EnvKey::FfmpegPath => "FFMPEG_PATH",
            EnvKey::DownloadTimeoutSecs => "DOWNLOAD_TIMEOUT_SECS",
            EnvKey::TranscodeTimeoutSecs => "TRANSCODE_TIMEOUT_SECS",
            EnvKey::PublicBaseUrl => "PUBLIC_BASE_URL",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

/// Like [`get`], but treats an empty value as unset.
pub fn get_optional(key: EnvKey) -> Option<String> {
    get(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    get_optional(key).unwrap_or_else(|| default.to_string())
}

/// Reads and parses `key`, falling back to `default` when unset or invalid.
pub fn get_parsed<T: FromStr + Display>(key: EnvKey, default: T) -> T {
    let name = key.as_str();
    parse_or(name, get_optional(key).as_deref(), default)
}

fn parse_or<T: FromStr + Display>(name: &str, raw: Option<&str>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!("Ignoring invalid {}={:?}, using {}", name, raw, default);
            default
        }
    }
}
