pub mod error;
pub mod types;

pub use error::{DriveError, Result};
pub use types::{DriveFile, FolderRef};

use std::path::Path;

use tokio::io::{AsyncWriteExt, BufWriter};

const BASE_URL: &str = "https://drive.google.com";

/// Marker that precedes the folder id in a folder link.
const FOLDER_MARKER: &str = "folders/";

/// Write buffer size for downloads. Bytes reach disk in blocks of this size.
pub const DOWNLOAD_CHUNK_SIZE: usize = 8192;

/// Extract the folder id from a link such as
/// `https://drive.google.com/drive/folders/<id>?usp=sharing`.
///
/// The id is the text after `folders/` up to the next `?` or `/`.
pub fn extract_folder_id(url: &str) -> Result<String> {
    let (_, rest) = url
        .split_once(FOLDER_MARKER)
        .ok_or_else(|| DriveError::InvalidFolderUrl(url.to_string()))?;

    let id = rest
        .split('?')
        .next()
        .and_then(|s| s.split('/').next())
        .unwrap_or_default();

    if id.is_empty() {
        return Err(DriveError::InvalidFolderUrl(url.to_string()));
    }

    Ok(id.to_string())
}

impl FolderRef {
    pub fn parse(url: &str) -> Result<Self> {
        Ok(Self {
            url: url.to_string(),
            id: extract_folder_id(url)?,
        })
    }
}

/// Downloads publicly shared files by id. No authentication is performed.
pub struct DriveClient {
    client: reqwest::Client,
    base_url: String,
}

impl DriveClient {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn direct_download_url(&self, file_id: &str) -> String {
        format!("{}/uc?export=download&id={}", self.base_url, file_id)
    }

    /// Stream a file to `dest`, replacing anything already there.
    /// Returns the number of bytes written.
    pub async fn download_to(&self, file_id: &str, dest: &Path) -> Result<u64> {
        let url = self.direct_download_url(file_id);
        tracing::debug!(file_id, url = url.as_str(), "Requesting file");

        let mut resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DriveError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let file = tokio::fs::File::create(dest).await?;
        let mut writer = BufWriter::with_capacity(DOWNLOAD_CHUNK_SIZE, file);
        let mut written: u64 = 0;

        while let Some(chunk) = resp.chunk().await? {
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;

        Ok(written)
    }
}

impl Default for DriveClient {
    fn default() -> Self {
        Self::new()
    }
}
