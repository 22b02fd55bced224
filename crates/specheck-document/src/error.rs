#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("file too large: {0} bytes")]
    FileTooLarge(u64),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("DOCX error: {0}")]
    Docx(String),

    #[error("{format} extractor cannot read {actual} documents")]
    FormatMismatch {
        format: crate::DocumentFormat,
        actual: crate::DocumentFormat,
    },

    #[error("extraction worker failed: {0}")]
    Worker(String),
}
