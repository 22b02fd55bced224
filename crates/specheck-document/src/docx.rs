use docx_rs::{DocumentChild, Paragraph, ParagraphChild, Run, RunChild};

use crate::extractor::{DocumentExtractor, ExtractFuture, ensure_format};
use crate::{Document, DocumentFormat, ExtractionError, NormalizedText};

/// Flow-document adapter.
///
/// Body paragraphs are joined with a single newline in document order. Empty
/// paragraphs are kept and become empty lines, unlike blank PDF pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor;

impl DocumentExtractor for DocxExtractor {
    fn extract<'a>(&'a self, document: &'a Document) -> ExtractFuture<'a> {
        Box::pin(async move {
            ensure_format(DocumentFormat::Docx, document)?;
            let bytes = document.shared_bytes();

            let paragraphs = tokio::task::spawn_blocking(move || {
                let docx =
                    docx_rs::read_docx(&bytes).map_err(|e| ExtractionError::Docx(e.to_string()))?;
                Ok::<_, ExtractionError>(body_paragraphs(&docx.document.children))
            })
            .await
            .map_err(|e| ExtractionError::Worker(e.to_string()))??;

            tracing::debug!(
                name = document.name(),
                paragraphs = paragraphs.len(),
                "extracted DOCX paragraphs"
            );
            Ok(join_paragraphs(paragraphs))
        })
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Docx]
    }
}

/// Join paragraph texts with `\n`, keeping empty paragraphs as empty lines.
pub fn join_paragraphs<I, S>(paragraphs: I) -> NormalizedText
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut text = String::new();
    for (i, p) in paragraphs.into_iter().enumerate() {
        if i > 0 {
            text.push('\n');
        }
        text.push_str(p.as_ref());
    }
    NormalizedText::new(text)
}

// Top-level body paragraphs only; tables and other block containers are skipped.
fn body_paragraphs(children: &[DocumentChild]) -> Vec<String> {
    children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(p) => Some(paragraph_text(p)),
            _ => None,
        })
        .collect()
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut out = String::new();
    push_paragraph_children(&paragraph.children, &mut out);
    out
}

fn push_paragraph_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, out),
            ParagraphChild::Hyperlink(link) => push_paragraph_children(&link.children, out),
            _ => {}
        }
    }
}

fn push_run(run: &Run, out: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}
