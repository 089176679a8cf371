use serde::{Deserialize, Serialize};

/// A parsed folder link: the original URL plus the folder id cut out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRef {
    pub url: String,
    pub id: String,
}

/// One downloadable file: the local name to save it under and its Drive id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveFile {
    pub filename: String,
    pub file_id: String,
}

impl DriveFile {
    pub fn new(filename: impl Into<String>, file_id: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            file_id: file_id.into(),
        }
    }
}
