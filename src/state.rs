use crate::common::error::ConversionResult;
use crate::config::settings::AppConfig;
use crate::infrastructure::http::fetcher::Fetcher;
use crate::infrastructure::storage::local::StorageService;
use crate::workers::transcoder::Transcoder;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub storage: StorageService,
    pub fetcher: Fetcher,
    pub transcoder: Transcoder,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        storage: StorageService,
        fetcher: Fetcher,
        transcoder: Transcoder,
    ) -> Self {
        Self {
            config,
            storage,
            fetcher,
            transcoder,
        }
    }

    /// Wires every collaborator from `config`.
    pub fn from_config(config: AppConfig) -> ConversionResult<Self> {
        let storage = StorageService::new(&config.temp_dir, &config.public_dir);
        let fetcher = Fetcher::new(config.download_timeout())?;
        let transcoder = Transcoder::new(&config.ffmpeg_path, config.transcode_timeout());

        Ok(Self::new(config, storage, fetcher, transcoder))
    }
}
