// Pipeline: DOWNLOAD -> PREPARE -> REQUEST -> ENRICH.
//
// Each stage sits behind a trait so the orchestrator can be driven with test
// doubles. A stage that yields nothing ends the run with a Failure result;
// files already on disk are left in place.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::encoder::EncodedFile;
use crate::error::Result;
use crate::result::SummaryResult;

pub const DOWNLOAD_FAILED: &str = "Failed to download files";
pub const PREPARE_FAILED: &str = "Failed to prepare files for sending";

#[async_trait]
pub trait FetchStage: Send + Sync {
    async fn fetch_all(&self, folder_reference: &str, destination: &Path) -> Result<Vec<PathBuf>>;
}

#[async_trait]
pub trait PrepareStage: Send + Sync {
    async fn encode_all(&self, paths: &[PathBuf]) -> Vec<EncodedFile>;
}

#[async_trait]
pub trait SummarizeStage: Send + Sync {
    async fn request_summary(&self, files: &[EncodedFile]) -> SummaryResult;
}

pub struct Pipeline {
    fetcher: Arc<dyn FetchStage>,
    encoder: Arc<dyn PrepareStage>,
    summarizer: Arc<dyn SummarizeStage>,
    download_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn FetchStage>,
        encoder: Arc<dyn PrepareStage>,
        summarizer: Arc<dyn SummarizeStage>,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            encoder,
            summarizer,
            download_dir: download_dir.into(),
        }
    }

    pub async fn run(&self, folder_reference: &str) -> SummaryResult {
        info!("Starting document summarization (files sent directly)");

        let downloaded = match self
            .fetcher
            .fetch_all(folder_reference, &self.download_dir)
            .await
        {
            Ok(paths) if !paths.is_empty() => paths,
            Ok(_) => {
                error!("No files were downloaded, stopping");
                return SummaryResult::failure(DOWNLOAD_FAILED);
            }
            Err(e) => {
                error!(error = %e, "Download stage failed, stopping");
                return SummaryResult::failure(format!("{DOWNLOAD_FAILED}: {e}"));
            }
        };
        info!(count = downloaded.len(), "Files downloaded");

        let prepared = self.encoder.encode_all(&downloaded).await;
        if prepared.is_empty() {
            error!("No files could be prepared for sending, stopping");
            return SummaryResult::failure(PREPARE_FAILED);
        }
        info!(count = prepared.len(), "Files prepared for OpenRouter");

        let result = self
            .summarizer
            .request_summary(&prepared)
            .await
            .enrich(&downloaded, &prepared);

        info!(success = result.is_success(), "Summarization finished");
        result
    }
}
