use std::future::Future;
use std::pin::Pin;

use crate::{Document, DocumentFormat, DocxExtractor, ExtractionError, NormalizedText, PdfExtractor};

pub type ExtractFuture<'a> =
    Pin<Box<dyn Future<Output = Result<NormalizedText, ExtractionError>> + Send + 'a>>;

/// Converts a [`Document`] into a single normalized text string.
pub trait DocumentExtractor: Send + Sync {
    fn extract<'a>(&'a self, document: &'a Document) -> ExtractFuture<'a>;

    fn supported_formats(&self) -> &[DocumentFormat];
}

/// Routes each document to the adapter registered for its declared format.
#[derive(Debug, Default)]
pub struct FormatDispatch {
    pdf: PdfExtractor,
    docx: DocxExtractor,
}

impl FormatDispatch {
    #[must_use]
    pub fn new(pdf: PdfExtractor, docx: DocxExtractor) -> Self {
        Self { pdf, docx }
    }
}

impl DocumentExtractor for FormatDispatch {
    fn extract<'a>(&'a self, document: &'a Document) -> ExtractFuture<'a> {
        match document.format() {
            DocumentFormat::Pdf => self.pdf.extract(document),
            DocumentFormat::Docx => self.docx.extract(document),
        }
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &DocumentFormat::ALL
    }
}

pub(crate) fn ensure_format(
    expected: DocumentFormat,
    document: &Document,
) -> Result<(), ExtractionError> {
    if document.format() == expected {
        Ok(())
    } else {
        Err(ExtractionError::FormatMismatch {
            format: expected,
            actual: document.format(),
        })
    }
}
