//! Document ingestion: uploaded PDF and DOCX files to normalized text.

pub mod docx;
pub mod error;
pub mod extractor;
pub mod pdf;
pub mod types;

pub use docx::DocxExtractor;
pub use error::ExtractionError;
pub use extractor::{DocumentExtractor, FormatDispatch};
pub use pdf::PdfExtractor;
pub use types::{Document, DocumentFormat, NormalizedText};

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
