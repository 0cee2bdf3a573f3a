use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use rand::seq::IndexedRandom;
use reqwest::{header, Client};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

use crate::common::error::{ConversionError, ConversionResult};

/// Identities rotated across downloads; some origins throttle a fixed one.
pub const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)",
    "Mozilla/5.0 (X11; Linux x86_64)",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 15_2 like Mac OS X)",
];

pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Streams remote resources to local files.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> ConversionResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ConversionError::Transport(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Downloads `url` into `dest`, returning the number of bytes written.
    ///
    /// On failure nothing is left behind at `dest`.
    pub async fn fetch(&self, url: &str, dest: &Path) -> ConversionResult<u64> {
        let result = match tokio::time::timeout(self.timeout, self.download(url, dest)).await {
            Ok(result) => result,
            Err(_) => Err(ConversionError::Transport(format!(
                "download timed out after {}s",
                self.timeout.as_secs()
            ))),
        };

        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(dest).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove partial download {}: {}", dest.display(), e);
                }
            }
        }

        result
    }

    async fn download(&self, url: &str, dest: &Path) -> ConversionResult<u64> {
        let user_agent = random_user_agent();
        debug!("GET {} as '{}'", url, user_agent);

        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConversionError::Download {
                status: status.as_u16(),
            });
        }

        let expected = response.content_length();

        let file = File::create(dest)
            .await
            .map_err(|e| ConversionError::io(dest, e))?;
        let mut writer = BufWriter::new(file);

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ConversionError::Transport(e.to_string()))?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| ConversionError::io(dest, e))?;
            written += chunk.len() as u64;
        }

        writer
            .flush()
            .await
            .map_err(|e| ConversionError::io(dest, e))?;
        writer
            .get_ref()
            .sync_all()
            .await
            .map_err(|e| ConversionError::io(dest, e))?;

        if written == 0 {
            return Err(ConversionError::Transport("empty response body".into()));
        }
        if let Some(expected) = expected {
            if written < expected {
                return Err(ConversionError::Transport(format!(
                    "connection closed after {} of {} bytes",
                    written, expected
                )));
            }
        }

        info!("⬇️ Downloaded {} bytes from {}", written, url);
        Ok(written)
    }
}
