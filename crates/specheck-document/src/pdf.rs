use crate::extractor::{DocumentExtractor, ExtractFuture, ensure_format};
use crate::{Document, DocumentFormat, ExtractionError, NormalizedText};

/// Paginated-container adapter.
///
/// Page texts are concatenated in page order with no separator. A page that
/// yields no text contributes nothing at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl DocumentExtractor for PdfExtractor {
    fn extract<'a>(&'a self, document: &'a Document) -> ExtractFuture<'a> {
        Box::pin(async move {
            ensure_format(DocumentFormat::Pdf, document)?;
            let bytes = document.shared_bytes();

            let pages = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem_by_pages(&bytes)
                    .map_err(|e| ExtractionError::Pdf(e.to_string()))
            })
            .await
            .map_err(|e| ExtractionError::Worker(e.to_string()))??;

            tracing::debug!(
                name = document.name(),
                pages = pages.len(),
                blank = pages.iter().filter(|p| p.is_empty()).count(),
                "extracted PDF pages"
            );
            Ok(join_pages(pages))
        })
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Pdf]
    }
}

/// Concatenate page texts, dropping pages with no text.
pub fn join_pages<I, S>(pages: I) -> NormalizedText
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let text = pages
        .into_iter()
        .filter(|p| !p.as_ref().is_empty())
        .fold(String::new(), |mut acc, p| {
            acc.push_str(p.as_ref());
            acc
        });
    NormalizedText::new(text)
}
