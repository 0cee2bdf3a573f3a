use tracing::{info, info_span, warn, Instrument};
use url::Url;

use crate::common::error::{ConversionError, ConversionResult};
use crate::common::job_id::JobId;
use crate::state::AppState;

pub struct ConvertService;

impl ConvertService {
    /// Downloads `source_url`, transcodes it and returns the public URL of the result.
    ///
    /// `public_base` is the scheme and host clients reach this server on, without
    /// a trailing slash.
    pub async fn convert(
        state: &AppState,
        source_url: Option<&str>,
        public_base: &str,
    ) -> ConversionResult<String> {
        let source = Self::validate_source_url(source_url)?;
        let job_id = JobId::generate();

        Self::run(state, job_id, source, public_base)
            .instrument(info_span!("convert", %job_id))
            .await
    }

    /// Rejects absent, blank or non-http(s) URLs before any file is touched.
    pub fn validate_source_url(source_url: Option<&str>) -> ConversionResult<Url> {
        let raw = source_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(ConversionError::missing_url)?;

        let url = Url::parse(raw)
            .map_err(|e| ConversionError::Validation(format!("Invalid URL: {}", e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConversionError::Validation(format!(
                "Invalid URL: unsupported scheme '{}'",
                other
            ))),
        }
    }

    async fn run(
        state: &AppState,
        job_id: JobId,
        source: Url,
        public_base: &str,
    ) -> ConversionResult<String> {
        info!("🎞️ Processing: {}", source);

        let temp = state.storage.temporary_asset(&job_id);
        let output = state.storage.pending_output(&job_id);

        // Both guards clean up on every early return or cancellation below.
        state.fetcher.fetch(source.as_str(), temp.path()).await?;
        info!("Downloaded to {}", temp.path().display());

        let transcoded = state.transcoder.transcode(temp.path(), output.path()).await;

        if let Err(e) = temp.release().await {
            warn!("Failed to clean up temporary asset: {}", e);
        }

        transcoded?;
        output.commit();

        let public_url = format!("{}/{}", public_base, job_id.file_name());
        info!("✅ Conversion complete: {}", public_url);
        Ok(public_url)
    }
}
