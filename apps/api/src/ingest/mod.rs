// Document ingestion: uploaded file → plain text → document prompt.
// Extraction is synchronous and CPU-bound; handlers run it inside
// tokio::task::spawn_blocking.

pub mod document_prompt;
pub mod extract;
pub mod handlers;

use thiserror::Error;

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Extracted text is cut to this many characters before prompting.
pub const MAX_CONTENT_CHARS: usize = 5000;

pub const TRUNCATION_MARKER: &str = "\n\n... (content truncated for processing)";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("File size exceeds 10MB limit")]
    TooLarge { size: usize },

    #[error("Unsupported file type: .{0}")]
    UnsupportedType(String),

    #[error("No text content found in file")]
    Empty,

    #[error("Error processing file: {0}")]
    Extraction(String),
}

impl From<zip::result::ZipError> for IngestError {
    fn from(err: zip::result::ZipError) -> Self {
        IngestError::Extraction(err.to_string())
    }
}

impl From<quick_xml::Error> for IngestError {
    fn from(err: quick_xml::Error) -> Self {
        IngestError::Extraction(err.to_string())
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Extraction(err.to_string())
    }
}

/// Supported upload kinds, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Docx,
    Pptx,
    Txt,
}

impl FileKind {
    /// Extension is whatever follows the last '.', lowercased.
    pub fn from_filename(filename: &str) -> Result<Self, IngestError> {
        let ext = filename
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match ext.as_str() {
            "pdf" => Ok(FileKind::Pdf),
            "docx" => Ok(FileKind::Docx),
            "pptx" => Ok(FileKind::Pptx),
            "txt" | "text" => Ok(FileKind::Txt),
            _ => Err(IngestError::UnsupportedType(ext)),
        }
    }
}

/// Text pulled out of one upload, already capped.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExtractedDocument {
    pub filename: String,
    pub file_type: FileKind,
    pub content: String,
    pub char_count: usize,
}

/// Size check, extraction by kind, empty check, truncation.
pub fn process_upload(filename: &str, bytes: &[u8]) -> Result<ExtractedDocument, IngestError> {
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(IngestError::TooLarge { size: bytes.len() });
    }

    let kind = FileKind::from_filename(filename)?;
    let text = match kind {
        FileKind::Pdf => extract::pdf_text(bytes)?,
        FileKind::Docx => extract::docx_text(bytes)?,
        FileKind::Pptx => extract::pptx_text(bytes)?,
        FileKind::Txt => extract::plain_text(bytes),
    };

    if text.is_empty() {
        return Err(IngestError::Empty);
    }

    let content = truncate_content(&text);
    Ok(ExtractedDocument {
        filename: filename.to_string(),
        file_type: kind,
        char_count: content.chars().count(),
        content,
    })
}

pub fn truncate_content(text: &str) -> String {
    match text.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}
