// Download stage: folder reference -> file list -> files on local disk.
//
// FileFetcher depends on two trait boundaries. FolderLister says which files
// belong to a folder; FileSource moves one file's bytes to disk. Production
// wires StaticFolderLister (or ManifestFolderLister) and DriveClient.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use drive_client::{DriveClient, FolderRef};
use tracing::{debug, error, info, warn};

use crate::error::{DigestError, Result};
use crate::pipeline::FetchStage;

pub use drive_client::DriveFile as RemoteFileRef;

/// Files shipped with the tool, in download order.
const DEFAULT_FILES: &[(&str, &str)] = &[
    (
        "5_grazhdanskijj_kodeks_rossijjskojj_federacii_chast_pervaya.pdf",
        "1nkfJ_rZBuJqRPBNkp8SzFUQ_NNtmwL1f",
    ),
    (
        "3_fc21cff16e05519324936c9c89d642bb_1460720162.jpg",
        "1jl-RdFVznqwcl2V4SGJ_d95SfxNvaFPj",
    ),
    (
        "e6ce831e-6346-4397-b2a0-47e9470304a6.webp",
        "1fuKnTaFWrBokILmh0I9xKXq4yBpSGB2A",
    ),
];

// ---------------------------------------------------------------------------
// FolderLister
// ---------------------------------------------------------------------------

#[async_trait]
pub trait FolderLister: Send + Sync {
    async fn list(&self, folder: &FolderRef) -> Result<Vec<RemoteFileRef>>;
}

/// A fixed file table. The folder id is not used to select entries.
pub struct StaticFolderLister {
    files: Vec<RemoteFileRef>,
}

impl StaticFolderLister {
    pub fn new(files: Vec<RemoteFileRef>) -> Self {
        Self { files }
    }
}

impl Default for StaticFolderLister {
    fn default() -> Self {
        Self::new(
            DEFAULT_FILES
                .iter()
                .map(|(name, id)| RemoteFileRef::new(*name, *id))
                .collect(),
        )
    }
}

#[async_trait]
impl FolderLister for StaticFolderLister {
    async fn list(&self, folder: &FolderRef) -> Result<Vec<RemoteFileRef>> {
        debug!(
            folder_id = folder.id.as_str(),
            files = self.files.len(),
            "Using static file table"
        );
        Ok(self.files.clone())
    }
}

/// Reads the file table from a JSON array of `{"filename", "file_id"}`.
pub struct ManifestFolderLister {
    path: PathBuf,
}

impl ManifestFolderLister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FolderLister for ManifestFolderLister {
    async fn list(&self, folder: &FolderRef) -> Result<Vec<RemoteFileRef>> {
        let manifest_err = |message: String| DigestError::Manifest {
            path: self.path.display().to_string(),
            message,
        };

        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| manifest_err(e.to_string()))?;
        let files: Vec<RemoteFileRef> =
            serde_json::from_str(&text).map_err(|e| manifest_err(e.to_string()))?;

        debug!(
            folder_id = folder.id.as_str(),
            manifest = %self.path.display(),
            files = files.len(),
            "Loaded file manifest"
        );
        Ok(files)
    }
}

// ---------------------------------------------------------------------------
// FileSource
// ---------------------------------------------------------------------------

/// Moves one remote file's bytes to `dest`. Returns bytes written.
#[async_trait]
pub trait FileSource: Send + Sync {
    async fn download(&self, file: &RemoteFileRef, dest: &Path) -> Result<u64>;
}

#[async_trait]
impl FileSource for DriveClient {
    async fn download(&self, file: &RemoteFileRef, dest: &Path) -> Result<u64> {
        self.download_to(&file.file_id, dest)
            .await
            .map_err(|e| DigestError::Fetch {
                filename: file.filename.clone(),
                message: e.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// FileFetcher
// ---------------------------------------------------------------------------

pub struct FileFetcher {
    lister: Arc<dyn FolderLister>,
    source: Arc<dyn FileSource>,
}

impl FileFetcher {
    pub fn new(lister: Arc<dyn FolderLister>, source: Arc<dyn FileSource>) -> Self {
        Self { lister, source }
    }

    /// Download every listed file into `destination`, one at a time.
    ///
    /// Only an unparseable reference, an unreadable listing or an unusable
    /// destination directory is an error. A failed file is logged and left
    /// out of the returned paths.
    pub async fn fetch_all(
        &self,
        folder_reference: &str,
        destination: &Path,
    ) -> Result<Vec<PathBuf>> {
        info!(folder = folder_reference, "Downloading files from folder");

        let folder = FolderRef::parse(folder_reference)
            .map_err(|e| DigestError::InvalidReference(e.to_string()))?;

        let files = self.lister.list(&folder).await?;

        tokio::fs::create_dir_all(destination)
            .await
            .map_err(|e| DigestError::Fetch {
                filename: destination.display().to_string(),
                message: format!("cannot create download directory: {e}"),
            })?;

        let mut downloaded = Vec::with_capacity(files.len());
        for file in &files {
            match self.fetch_one(file, destination).await {
                Ok(path) => downloaded.push(path),
                Err(e) => error!(error = %e, "Download failed"),
            }
        }

        info!(
            downloaded = downloaded.len(),
            listed = files.len(),
            "Download stage finished"
        );
        Ok(downloaded)
    }

    async fn fetch_one(&self, file: &RemoteFileRef, destination: &Path) -> Result<PathBuf> {
        let dest = destination.join(safe_filename(file)?);

        if tokio::fs::try_exists(&dest).await.unwrap_or(false) {
            warn!(path = %dest.display(), "Overwriting existing file");
        }

        info!(filename = file.filename.as_str(), "Downloading");
        let bytes = self.source.download(file, &dest).await?;
        info!(path = %dest.display(), bytes, "File saved");

        Ok(dest)
    }
}

#[async_trait]
impl FetchStage for FileFetcher {
    async fn fetch_all(
        &self,
        folder_reference: &str,
        destination: &Path,
    ) -> Result<Vec<PathBuf>> {
        FileFetcher::fetch_all(self, folder_reference, destination).await
    }
}

/// The table's filename, provided it names a plain file in the destination.
fn safe_filename(file: &RemoteFileRef) -> Result<&str> {
    let name = file.filename.as_str();
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\']);

    if plain {
        Ok(name)
    } else {
        Err(DigestError::Fetch {
            filename: name.to_string(),
            message: "filename must not contain path components".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// MockFileSource (for tests)
// ---------------------------------------------------------------------------

#[cfg(any(test, feature = "test-support"))]
pub use mock::MockFileSource;

#[cfg(any(test, feature = "test-support"))]
mod mock {
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{FileSource, RemoteFileRef};
    use crate::error::{DigestError, Result};

    /// Serves canned bytes per file id; unknown ids fail like a network error.
    pub struct MockFileSource {
        contents: HashMap<String, Vec<u8>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockFileSource {
        pub fn new() -> Self {
            Self {
                contents: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn with_file(mut self, file_id: &str, bytes: impl Into<Vec<u8>>) -> Self {
            self.contents.insert(file_id.to_string(), bytes.into());
            self
        }

        /// File ids requested so far, in order.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Default for MockFileSource {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl FileSource for MockFileSource {
        async fn download(&self, file: &RemoteFileRef, dest: &Path) -> Result<u64> {
            self.calls.lock().unwrap().push(file.file_id.clone());

            let bytes = self.contents.get(&file.file_id).ok_or_else(|| DigestError::Fetch {
                filename: file.filename.clone(),
                message: "simulated network failure".to_string(),
            })?;

            tokio::fs::write(dest, bytes)
                .await
                .map_err(|e| DigestError::Fetch {
                    filename: file.filename.clone(),
                    message: e.to_string(),
                })?;
            Ok(bytes.len() as u64)
        }
    }
}
