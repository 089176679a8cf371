// SummaryResult: the terminal artifact of a pipeline run.
//
// Serialized as exactly one of two JSON shapes: `{"success": true, ...}` or
// `{"error": "..."}`. Callers branch on which variant they hold.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::encoder::EncodedFile;
use crate::error::{DigestError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SummaryResult {
    Success(SummaryReport),
    Failure(SummaryFailure),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryFailure {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub success: bool,
    pub summary: String,
    pub model: String,
    pub files_processed: usize,
    pub file_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloaded_files: Option<Vec<PathBuf>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepared_files: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<SummaryStats>,
    /// Provider body as received. Never persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    pub total_files: usize,
    pub files_prepared: usize,
    /// Length of the summary in characters, not bytes.
    pub summary_length: usize,
}

impl SummaryReport {
    pub fn new(
        summary: impl Into<String>,
        model: impl Into<String>,
        files: &[EncodedFile],
        raw_response: Option<serde_json::Value>,
    ) -> Self {
        Self {
            success: true,
            summary: summary.into(),
            model: model.into(),
            files_processed: files.len(),
            file_names: files.iter().map(|f| f.filename.clone()).collect(),
            downloaded_files: None,
            prepared_files: None,
            stats: None,
            raw_response,
        }
    }
}

impl SummaryResult {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure(SummaryFailure {
            error: error.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure(f) => Some(&f.error),
            Self::Success(_) => None,
        }
    }

    /// Attach download/preparation details and stats. Failures pass through.
    pub fn enrich(self, downloaded: &[PathBuf], prepared: &[EncodedFile]) -> Self {
        match self {
            Self::Success(mut report) => {
                report.stats = Some(SummaryStats {
                    total_files: downloaded.len(),
                    files_prepared: prepared.len(),
                    summary_length: report.summary.chars().count(),
                });
                report.downloaded_files = Some(downloaded.to_vec());
                report.prepared_files = Some(prepared.iter().map(|f| f.filename.clone()).collect());
                Self::Success(report)
            }
            failure => failure,
        }
    }

    /// Copy of the result without the raw provider payload.
    pub fn trimmed(&self) -> Self {
        match self {
            Self::Success(report) => Self::Success(SummaryReport {
                raw_response: None,
                ..report.clone()
            }),
            failure => failure.clone(),
        }
    }

    /// Pretty-printed UTF-8 JSON of the trimmed result.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.trimmed())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let persistence = |message: String| DigestError::Persistence {
            path: path.display().to_string(),
            message,
        };

        let json = self.to_json_pretty().map_err(|e| persistence(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| persistence(e.to_string()))?;
        }
        std::fs::write(path, json).map_err(|e| persistence(e.to_string()))?;

        tracing::info!(path = %path.display(), "Results saved");
        Ok(())
    }
}
