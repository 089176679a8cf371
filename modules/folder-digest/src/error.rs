/// Result type alias for digest operations.
pub type Result<T> = std::result::Result<T, DigestError>;

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("Invalid folder reference: {0}")]
    InvalidReference(String),

    #[error("Failed to read file manifest {path}: {message}")]
    Manifest { path: String, message: String },

    #[error("Failed to download {filename}: {message}")]
    Fetch { filename: String, message: String },

    #[error("Failed to encode {path}: {message}")]
    Encode { path: String, message: String },

    #[error("LLM request failed: {0}")]
    ProviderRequest(String),

    #[error("Unexpected response shape from LLM: {0}")]
    ProviderResponseShape(String),

    #[error("Failed to save results to {path}: {message}")]
    Persistence { path: String, message: String },
}
