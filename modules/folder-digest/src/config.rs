use std::path::PathBuf;

use ai_client::openrouter::OPENROUTER_API_URL;
use tracing::{info, warn};

use crate::payload::DEFAULT_LANGUAGE;

pub const DEFAULT_MODEL: &str = "nvidia/nemotron-nano-12b-v2-vl:free";
pub const DEFAULT_FOLDER_URL: &str =
    "https://drive.google.com/drive/folders/1x6EKNkVw6PlFVTr6cGrsVscmRuwqGrXd";
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloaded_files";
pub const DEFAULT_OUTPUT: &str = "summary_results_v2.json";
pub const DEFAULT_APP_NAME: &str = "Document Summarization Tool";
pub const DEFAULT_SITE_URL: &str = "https://nobody.com";

/// Key value shipped in sample `.env` files.
pub const PLACEHOLDER_API_KEY: &str = "your-api-key-here";
/// Sent instead of a real key when none is configured. Calls will fail.
pub const DEMO_API_KEY: &str = "demo-key-for-display";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // OpenRouter
    pub api_key: String,
    pub demo_mode: bool,
    pub model: String,
    pub base_url: String,
    pub app_name: String,
    pub site_url: String,

    // Source folder
    pub folder_url: String,
    pub manifest_path: Option<PathBuf>,

    // Local files
    pub download_dir: PathBuf,
    pub output_path: PathBuf,

    pub language: String,
}

impl Config {
    /// Load `.env` (if any), then read the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let (api_key, demo_mode) = match var("OPENROUTER_API_KEY") {
            Some(key) if !is_placeholder_key(&key) => (key, false),
            _ => (DEMO_API_KEY.to_string(), true),
        };

        Self {
            api_key,
            demo_mode,
            model: or("OPENROUTER_MODEL", DEFAULT_MODEL),
            base_url: or("OPENROUTER_BASE_URL", OPENROUTER_API_URL),
            app_name: or("OPENROUTER_APP_NAME", DEFAULT_APP_NAME),
            site_url: or("OPENROUTER_SITE_URL", DEFAULT_SITE_URL),
            folder_url: or("DRIVE_FOLDER_URL", DEFAULT_FOLDER_URL),
            manifest_path: var("DRIVE_MANIFEST").map(PathBuf::from),
            download_dir: PathBuf::from(or("DOWNLOAD_DIR", DEFAULT_DOWNLOAD_DIR)),
            output_path: PathBuf::from(or("SUMMARY_OUTPUT", DEFAULT_OUTPUT)),
            language: or("SUMMARY_LANGUAGE", DEFAULT_LANGUAGE),
        }
    }

    /// Log the effective configuration. The API key is never printed.
    pub fn log_redacted(&self) {
        if self.demo_mode {
            warn!("OPENROUTER_API_KEY is not set or is still the placeholder");
            warn!("Get a key at https://openrouter.ai/keys and put it in .env");
            warn!("Continuing in demonstration mode; the summary request will fail");
        }

        info!(
            model = self.model.as_str(),
            base_url = self.base_url.as_str(),
            api_key = if self.demo_mode { "demo" } else { "[set]" },
            folder = self.folder_url.as_str(),
            manifest = ?self.manifest_path,
            download_dir = %self.download_dir.display(),
            output = %self.output_path.display(),
            language = self.language.as_str(),
            "Configuration loaded"
        );
    }
}

pub fn is_placeholder_key(key: &str) -> bool {
    let key = key.trim();
    key.is_empty() || key == PLACEHOLDER_API_KEY
}
