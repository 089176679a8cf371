use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use tracing::{error, info, warn};

use crate::error::{DigestError, Result};
use crate::mime;
use crate::pipeline::PrepareStage;

/// A local file read into memory and base64-encoded for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFile {
    pub filepath: PathBuf,
    pub filename: String,
    pub mime_type: String,
    pub encoded_data: String,
}

impl EncodedFile {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == mime::PDF_MIME
    }

    /// `data:<mime>;base64,<payload>`
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.encoded_data)
    }
}

/// Reads downloaded files and encodes them one at a time.
/// The whole file is held in memory; there is no size limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadEncoder;

impl PayloadEncoder {
    pub fn new() -> Self {
        Self
    }

    pub async fn encode_file(&self, path: &Path) -> Result<EncodedFile> {
        let encode_err = |message: String| DigestError::Encode {
            path: path.display().to_string(),
            message,
        };

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| encode_err("path has no UTF-8 file name".to_string()))?
            .to_string();

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| encode_err(e.to_string()))?;

        let encoded_data = base64::engine::general_purpose::STANDARD.encode(&bytes);
        info!(path = %path.display(), bytes = bytes.len(), "File encoded to base64");

        Ok(EncodedFile {
            filepath: path.to_path_buf(),
            mime_type: mime::resolve(&filename).to_string(),
            filename,
            encoded_data,
        })
    }

    /// Encode every readable file. Missing, unreadable and empty files are
    /// logged and left out; the rest keep their input order.
    pub async fn encode_all(&self, paths: &[PathBuf]) -> Vec<EncodedFile> {
        let mut prepared = Vec::with_capacity(paths.len());

        for path in paths {
            if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                warn!(path = %path.display(), "File not found, skipping");
                continue;
            }

            match self.encode_file(path).await {
                Ok(file) if file.encoded_data.is_empty() => {
                    warn!(path = %path.display(), "File is empty, skipping");
                }
                Ok(file) => {
                    info!(
                        filename = file.filename.as_str(),
                        mime_type = file.mime_type.as_str(),
                        "File prepared"
                    );
                    prepared.push(file);
                }
                Err(e) => {
                    error!(error = %e, "Failed to prepare file");
                }
            }
        }

        prepared
    }
}

#[async_trait]
impl PrepareStage for PayloadEncoder {
    async fn encode_all(&self, paths: &[PathBuf]) -> Vec<EncodedFile> {
        PayloadEncoder::encode_all(self, paths).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn encoded_data_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        let original: Vec<u8> = (0u8..=255).cycle().take(10_000).collect();
        std::fs::write(&path, &original).unwrap();

        let file = PayloadEncoder::new().encode_file(&path).await.unwrap();

        assert_eq!(file.filename, "scan.png");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.filepath, path);
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&file.encoded_data)
            .unwrap();
        assert_eq!(decoded, original);
    }

    #[tokio::test]
    async fn missing_and_empty_files_are_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("doc.pdf");
        let empty = dir.path().join("empty.txt");
        let note = dir.path().join("note.txt");
        std::fs::write(&doc, b"%PDF-1.7").unwrap();
        std::fs::write(&empty, b"").unwrap();
        std::fs::write(&note, "привет").unwrap();

        let paths = vec![
            doc.clone(),
            dir.path().join("missing.jpg"),
            empty,
            note.clone(),
        ];
        let prepared = PayloadEncoder::new().encode_all(&paths).await;

        let names: Vec<_> = prepared.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["doc.pdf", "note.txt"]);
        assert!(prepared[0].is_pdf());
        assert_eq!(prepared[1].mime_type, "text/plain");
    }

    #[tokio::test]
    async fn unreadable_path_is_an_encode_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PayloadEncoder::new()
            .encode_file(dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, DigestError::Encode { .. }));
    }

    #[tokio::test]
    async fn directory_in_input_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("folder.pdf");
        std::fs::create_dir(&sub).unwrap();

        let prepared = PayloadEncoder::new().encode_all(&[sub]).await;
        assert!(prepared.is_empty());
    }

    #[test]
    fn data_uri_and_kind() {
        let file = EncodedFile {
            filepath: PathBuf::from("x/photo.webp"),
            filename: "photo.webp".to_string(),
            mime_type: "image/webp".to_string(),
            encoded_data: "UklGRg==".to_string(),
        };
        assert!(file.is_image());
        assert!(!file.is_pdf());
        assert_eq!(file.data_uri(), "data:image/webp;base64,UklGRg==");
    }
}
