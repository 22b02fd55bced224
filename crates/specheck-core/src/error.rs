use std::fmt;

use specheck_document::ExtractionError;
use specheck_llm::LlmError;

/// Which of the two uploads a failure concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentRole {
    Specification,
    QualityDocument,
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Specification => "specification",
            Self::QualityDocument => "quality document",
        })
    }
}

/// Collaborator round-trip that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    RequirementExtraction,
    ComplianceEvaluation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RequirementExtraction => "requirement extraction",
            Self::ComplianceEvaluation => "compliance evaluation",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("please provide the {0}")]
    Missing(DocumentRole),

    #[error("{role} '{name}' is not a supported format (expected .pdf or .docx)")]
    UnsupportedFormat { role: DocumentRole, name: String },

    #[error("cannot read {role}: {source}")]
    Unreadable {
        role: DocumentRole,
        #[source]
        source: ExtractionError,
    },
}

/// Fatal outcomes of a validation run.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("failed to extract text from {role}: {source}")]
    Extraction {
        role: DocumentRole,
        #[source]
        source: ExtractionError,
    },

    #[error("{stage} request failed: {source}")]
    Collaborator {
        stage: Stage,
        #[source]
        source: LlmError,
    },
}

impl ValidationError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
