use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::{DEFAULT_MAX_FILE_SIZE, ExtractionError};

/// Closed set of container formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// Paginated container (PDF).
    Pdf,
    /// Flow document (Office Open XML word processing).
    Docx,
}

impl DocumentFormat {
    pub const ALL: [Self; 2] = [Self::Pdf, Self::Docx];

    /// Map a file extension, case-insensitively, to a supported format.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Raw uploaded bytes tagged with their declared format. Immutable once read.
#[derive(Debug, Clone)]
pub struct Document {
    name: String,
    format: DocumentFormat,
    bytes: Arc<[u8]>,
}

impl Document {
    #[must_use]
    pub fn new(name: impl Into<String>, format: DocumentFormat, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            format,
            bytes: bytes.into(),
        }
    }

    /// Read a document from disk, taking its format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not a supported format, the file is
    /// larger than `max_file_size`, or it cannot be read.
    pub async fn from_path(path: &Path, max_file_size: u64) -> Result<Self, ExtractionError> {
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| ExtractionError::UnsupportedFormat(path.display().to_string()))?;

        let meta = tokio::fs::metadata(path).await?;
        if meta.len() > max_file_size {
            return Err(ExtractionError::FileTooLarge(meta.len()));
        }

        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

        tracing::debug!(%name, %format, size = bytes.len(), "read document");
        Ok(Self::new(name, format, bytes))
    }

    /// Same as [`Document::from_path`] with the default size limit.
    ///
    /// # Errors
    ///
    /// See [`Document::from_path`].
    pub async fn open(path: &Path) -> Result<Self, ExtractionError> {
        Self::from_path(path, DEFAULT_MAX_FILE_SIZE).await
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }
}

/// Text extracted from a [`Document`].
///
/// An empty value is a successfully read blank document, not a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedText(String);

impl NormalizedText {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NormalizedText {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NormalizedText {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension_is_case_insensitive() {
        assert_eq!(DocumentFormat::from_extension("PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("Docx"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_extension("doc"), None);
        assert_eq!(DocumentFormat::from_extension("txt"), None);
    }

    #[test]
    fn format_from_path_without_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("spec")), None);
        assert_eq!(
            DocumentFormat::from_path(Path::new("/tmp/Spec.v2.pdf")),
            Some(DocumentFormat::Pdf)
        );
    }

    #[test]
    fn normalized_text_empty_is_valid() {
        let text = NormalizedText::default();
        assert!(text.is_empty());
        assert_eq!(text.as_str(), "");
    }

    #[tokio::test]
    async fn from_path_reads_bytes_and_format() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("quality.docx");
        std::fs::write(&file, b"PK\x03\x04").unwrap();

        let doc = Document::open(&file).await.unwrap();
        assert_eq!(doc.name(), "quality.docx");
        assert_eq!(doc.format(), DocumentFormat::Docx);
        assert_eq!(doc.bytes(), b"PK\x03\x04");
    }

    #[tokio::test]
    async fn from_path_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "hello").unwrap();

        let result = Document::open(&file).await;
        assert!(matches!(result, Err(ExtractionError::UnsupportedFormat(_))));
    }

    #[tokio::test]
    async fn from_path_missing_file_is_io_error() {
        let result = Document::open(Path::new("/nonexistent/spec.pdf")).await;
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }

    #[tokio::test]
    async fn file_too_large_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("big.pdf");
        std::fs::write(&file, "x").unwrap();

        let result = Document::from_path(&file, 0).await;
        assert!(matches!(result, Err(ExtractionError::FileTooLarge(1))));
    }
}
