use std::path::Path;

/// Returned for extensions missing from the table.
pub const FALLBACK_MIME: &str = "application/octet-stream";

pub const PDF_MIME: &str = "application/pdf";

const MIME_TYPES: &[(&str, &str)] = &[
    ("pdf", PDF_MIME),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("txt", "text/plain"),
    ("json", "application/json"),
];

/// MIME type for a filename, from its lowercased extension.
pub fn resolve(filename: &str) -> &'static str {
    let Some(ext) = Path::new(filename).extension().and_then(|e| e.to_str()) else {
        return FALLBACK_MIME;
    };
    let ext = ext.to_ascii_lowercase();

    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(FALLBACK_MIME)
}
