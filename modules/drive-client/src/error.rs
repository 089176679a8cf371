use thiserror::Error;

pub type Result<T> = std::result::Result<T, DriveError>;

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("Invalid Google Drive folder URL: {0}")]
    InvalidFolderUrl(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for DriveError {
    fn from(err: reqwest::Error) -> Self {
        DriveError::Network(err.to_string())
    }
}
