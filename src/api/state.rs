use std::sync::Arc;

use crate::config::Config;
use crate::observability::Metrics;
use crate::pipeline::{ArtifactLifecycleManager, FetchOrchestrator, MetadataProbe};
use crate::sources::StrategyRegistry;
use crate::storage::Workspace;
use crate::tools::{Extractor, Ffmpeg, Transcoder, YtDlp};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub workspace: Workspace,
    pub orchestrator: FetchOrchestrator,
    pub lifecycle: ArtifactLifecycleManager,
    pub probe: MetadataProbe,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// State backed by the configured yt-dlp and ffmpeg binaries.
    pub fn from_config(config: Config) -> Self {
        let extractor = Arc::new(YtDlp::new(config.extractor.clone()));
        let transcoder = Arc::new(Ffmpeg::new(config.transcoder.clone()));
        Self::new(config, extractor, transcoder)
    }

    pub fn new(
        config: Config,
        extractor: Arc<dyn Extractor>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        let metrics = Arc::new(Metrics::new());
        let workspace = Workspace::new(config.downloads.work_dir.clone());
        let strategies = Arc::new(StrategyRegistry::from_config(&config));

        let orchestrator = FetchOrchestrator::new(
            extractor.clone(),
            strategies,
            config.downloads.strategy.clone(),
            config.downloads.backoff(),
            metrics.clone(),
        );
        let lifecycle = ArtifactLifecycleManager::new(transcoder, metrics.clone());
        let probe = MetadataProbe::new(extractor, workspace.clone());

        Self {
            config: Arc::new(config),
            workspace,
            orchestrator,
            lifecycle,
            probe,
            metrics,
        }
    }
}
