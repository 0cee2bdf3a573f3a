//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use autoplay_server::app::create_app;
use autoplay_server::config::settings::AppConfig;
use autoplay_server::state::AppState;
use axum::body::{Body, Bytes};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;

/// Copies the `-i` input to the last argument, like a transcode that changes nothing.
pub const COPY_SCRIPT: &str = r#"#!/bin/sh
input=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-i" ]; then input="$arg"; fi
  prev="$arg"
done
cp "$input" "$prev"
"#;

/// Writes a partial output, complains on stderr and exits non-zero.
pub const FAILING_SCRIPT: &str = r#"#!/bin/sh
for arg in "$@"; do last="$arg"; done
echo "partial" > "$last"
echo "frame=    0 fps=0.0" >&2
echo "input.mp4: Invalid data found when processing input" >&2
exit 1
"#;

/// Starts writing the output, then hangs until killed.
pub const PARTIAL_THEN_HANG_SCRIPT: &str = r#"#!/bin/sh
for arg in "$@"; do last="$arg"; done
echo "partial" > "$last"
sleep 10
"#;

pub const SLOW_SCRIPT: &str = r#"#!/bin/sh
sleep 10
"#;

pub struct TestHarness {
    pub root: TempDir,
    pub state: AppState,
}

impl TestHarness {
    /// Harness whose ffmpeg binary does not exist.
    pub fn new() -> Self {
        Self::with_config(|_, _| {})
    }

    /// Harness running `script` as its ffmpeg binary.
    #[cfg(unix)]
    pub fn with_ffmpeg_script(script: &str) -> Self {
        Self::with_config(|root, config| {
            let bin = root.join("bin");
            std::fs::create_dir_all(&bin).unwrap();
            config.ffmpeg_path = write_script(&bin, "ffmpeg", script);
        })
    }

    pub fn with_config(customize: impl FnOnce(&Path, &mut AppConfig)) -> Self {
        let root = tempfile::tempdir().unwrap();
        let mut config = AppConfig {
            temp_dir: root.path().join("temp"),
            public_dir: root.path().join("public"),
            ffmpeg_path: root.path().join("missing-ffmpeg"),
            download_timeout_secs: 10,
            transcode_timeout_secs: 10,
            ..AppConfig::default()
        };
        customize(root.path(), &mut config);

        std::fs::create_dir_all(&config.temp_dir).unwrap();
        std::fs::create_dir_all(&config.public_dir).unwrap();

        let state = AppState::from_config(config).unwrap();
        Self { root, state }
    }

    pub fn app(&self) -> Router {
        create_app(self.state.clone())
    }

    pub fn write_public(&self, name: &str, data: &[u8]) -> PathBuf {
        let path = self.state.config.public_dir.join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    pub fn temp_files(&self) -> Vec<PathBuf> {
        list_dir(&self.state.config.temp_dir)
    }

    pub fn public_files(&self) -> Vec<PathBuf> {
        list_dir(&self.state.config.public_dir)
    }
}

fn list_dir(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}

#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Deterministic, non-repeating-looking payload.
pub fn sample_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

pub async fn body_bytes(body: Body) -> Bytes {
    body.collect().await.unwrap().to_bytes()
}

pub async fn body_json(body: Body) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(body).await).unwrap()
}
