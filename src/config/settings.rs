use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use crate::config::env::{self, EnvKey};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TEMP_DIR: &str = "./temp";
pub const DEFAULT_PUBLIC_DIR: &str = "./public";
pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_TRANSCODE_TIMEOUT_SECS: u64 = 600;

/// Process-wide settings, read once at startup and never mutated afterwards.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub temp_dir: PathBuf,
    pub public_dir: PathBuf,
    pub ffmpeg_path: PathBuf,
    pub download_timeout_secs: u64,
    pub transcode_timeout_secs: u64,
    /// Overrides the scheme and host used to build public URLs.
    pub public_base_url: Option<String>,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            server_port: env::get_parsed(EnvKey::ServerPort, DEFAULT_PORT),
            temp_dir: env::get_or(EnvKey::TempDir, DEFAULT_TEMP_DIR).into(),
            public_dir: env::get_or(EnvKey::PublicDir, DEFAULT_PUBLIC_DIR).into(),
            ffmpeg_path: env::get_or(EnvKey::FfmpegPath, DEFAULT_FFMPEG_PATH).into(),
            download_timeout_secs: env::get_parsed(
                EnvKey::DownloadTimeoutSecs,
                DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            ),
            transcode_timeout_secs: env::get_parsed(
                EnvKey::TranscodeTimeoutSecs,
                DEFAULT_TRANSCODE_TIMEOUT_SECS,
            ),
            public_base_url: env::get_optional(EnvKey::PublicBaseUrl)
                .map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn transcode_timeout(&self) -> Duration {
        Duration::from_secs(self.transcode_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_PORT,
            temp_dir: DEFAULT_TEMP_DIR.into(),
            public_dir: DEFAULT_PUBLIC_DIR.into(),
            ffmpeg_path: DEFAULT_FFMPEG_PATH.into(),
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            transcode_timeout_secs: DEFAULT_TRANSCODE_TIMEOUT_SECS,
            public_base_url: None,
        }
    }
}
