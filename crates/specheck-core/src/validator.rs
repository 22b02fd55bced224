//! One validation run: credential, inputs, extraction, then the collaborator pipeline.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use specheck_document::{Document, DocumentExtractor, ExtractionError, FormatDispatch, NormalizedText};
use specheck_llm::LlmProvider;
use specheck_llm::openai::OpenAiProvider;

use crate::collaborator::RequestSettings;
use crate::config::{Config, LlmConfig, TimeoutConfig};
use crate::error::{DocumentRole, InputError, ValidationError};
use crate::evaluation::{ComplianceEvaluator, RawEvaluation};
use crate::pipeline::{
    AssembleStep, EvaluationStep, ExtractedTexts, Pipeline, RequirementsStep,
};
use crate::report::{AssembledReport, Report, ReportAssembler, TemplateMismatch};
use crate::requirements::{RequirementExtractor, RequirementList};
use crate::template::EvaluationTemplate;
use crate::vault::{Secret, VaultProvider, resolve_credential};

/// One of the two documents supplied by the caller.
///
/// Files are not read until the credential has been resolved.
#[derive(Debug, Clone)]
pub enum Upload {
    Loaded(Document),
    File(PathBuf),
}

impl Upload {
    async fn load(self, role: DocumentRole, max_file_size: u64) -> Result<Document, InputError> {
        match self {
            Self::Loaded(document) => Ok(document),
            Self::File(path) => Document::from_path(&path, max_file_size)
                .await
                .map_err(|source| match source {
                    ExtractionError::UnsupportedFormat(name) => {
                        InputError::UnsupportedFormat { role, name }
                    }
                    source => InputError::Unreadable { role, source },
                }),
        }
    }
}

impl From<Document> for Upload {
    fn from(document: Document) -> Self {
        Self::Loaded(document)
    }
}

impl From<PathBuf> for Upload {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

/// Both uploads of a run. Either may be absent; that is reported as an input error.
#[derive(Debug, Clone, Default)]
pub struct ValidationInputs {
    pub specification: Option<Upload>,
    pub quality_document: Option<Upload>,
}

impl ValidationInputs {
    #[must_use]
    pub fn new(specification: impl Into<Upload>, quality_document: impl Into<Upload>) -> Self {
        Self {
            specification: Some(specification.into()),
            quality_document: Some(quality_document.into()),
        }
    }

    fn require(self) -> Result<(Upload, Upload), InputError> {
        let specification = self
            .specification
            .ok_or(InputError::Missing(DocumentRole::Specification))?;
        let quality_document = self
            .quality_document
            .ok_or(InputError::Missing(DocumentRole::QualityDocument))?;
        Ok((specification, quality_document))
    }
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    requirements: RequirementList,
    raw: RawEvaluation,
    assembled: AssembledReport,
    report: Report,
}

impl ValidationReport {
    #[must_use]
    pub fn new(requirements: RequirementList, raw: RawEvaluation, assembled: AssembledReport) -> Self {
        let report = assembled.report();
        Self {
            requirements,
            raw,
            assembled,
            report,
        }
    }

    #[must_use]
    pub fn requirements(&self) -> &RequirementList {
        &self.requirements
    }

    #[must_use]
    pub fn raw(&self) -> &RawEvaluation {
        &self.raw
    }

    #[must_use]
    pub fn full_listing(&self) -> &str {
        self.assembled.full_listing()
    }

    #[must_use]
    pub fn summary(&self) -> Option<String> {
        self.assembled.summary()
    }

    #[must_use]
    pub fn mismatch(&self) -> Option<TemplateMismatch> {
        self.assembled.mismatch()
    }

    /// Structured results parsed from the full listing.
    #[must_use]
    pub fn report(&self) -> &Report {
        &self.report
    }
}

/// Builds the collaborator once the credential is known.
pub trait ProviderFactory: Send + Sync {
    type Provider: LlmProvider + 'static;

    /// # Errors
    ///
    /// Returns [`ValidationError::Configuration`] if the provider cannot be set up.
    fn build(&self, api_key: &Secret) -> Result<Self::Provider, ValidationError>;
}

/// OpenAI chat-completions provider with the configured model and timeouts.
#[derive(Debug, Clone)]
pub struct OpenAiFactory {
    llm: LlmConfig,
    timeouts: TimeoutConfig,
}

impl OpenAiFactory {
    #[must_use]
    pub fn new(llm: LlmConfig, timeouts: TimeoutConfig) -> Self {
        Self { llm, timeouts }
    }
}

impl ProviderFactory for OpenAiFactory {
    type Provider = OpenAiProvider;

    fn build(&self, api_key: &Secret) -> Result<OpenAiProvider, ValidationError> {
        let client = specheck_llm::http::client_with_timeouts(
            Duration::from_secs(self.timeouts.connect_seconds),
            Duration::from_secs(self.timeouts.llm_seconds),
        )
        .map_err(|e| ValidationError::configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(OpenAiProvider::new(
            client,
            api_key.expose().to_owned(),
            self.llm.base_url.clone(),
            self.llm.model.clone(),
        ))
    }
}

/// Hands out an already constructed provider and ignores the credential.
pub struct FixedProvider<P>(Arc<P>);

impl<P> FixedProvider<P> {
    #[must_use]
    pub fn new(provider: Arc<P>) -> Self {
        Self(provider)
    }
}

impl<P: LlmProvider + 'static> ProviderFactory for FixedProvider<P> {
    type Provider = Arc<P>;

    fn build(&self, _api_key: &Secret) -> Result<Arc<P>, ValidationError> {
        Ok(Arc::clone(&self.0))
    }
}

/// Runs validations. Holds no per-run state.
pub struct Validator<E = FormatDispatch, F = OpenAiFactory> {
    extractor: E,
    factory: F,
    template: EvaluationTemplate,
    settings: RequestSettings,
    max_file_size: u64,
    api_key_name: String,
}

impl Validator {
    /// PDF/DOCX extraction and the OpenAI collaborator, configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Configuration`] if the evaluation template is invalid.
    pub fn new(config: &Config) -> Result<Self, ValidationError> {
        Self::with_parts(
            FormatDispatch::default(),
            OpenAiFactory::new(config.llm.clone(), config.timeouts),
            config,
        )
    }
}

impl<E: DocumentExtractor, F: ProviderFactory> Validator<E, F> {
    /// # Errors
    ///
    /// Returns [`ValidationError::Configuration`] if the evaluation template is invalid.
    pub fn with_parts(extractor: E, factory: F, config: &Config) -> Result<Self, ValidationError> {
        Ok(Self {
            extractor,
            factory,
            template: config.evaluation_template()?,
            settings: config.request_settings(),
            max_file_size: config.documents.max_file_size,
            api_key_name: config.vault.api_key_name.clone(),
        })
    }

    #[must_use]
    pub fn template(&self) -> &EvaluationTemplate {
        &self.template
    }

    /// Run one validation.
    ///
    /// The credential is resolved before the inputs are looked at, and both
    /// documents are extracted before the first collaborator call.
    ///
    /// # Errors
    ///
    /// Returns the first fatal [`ValidationError`]; no partial result is kept.
    pub async fn run(
        &self,
        vault: &dyn VaultProvider,
        inputs: ValidationInputs,
    ) -> Result<ValidationReport, ValidationError> {
        let api_key = resolve_credential(vault, &self.api_key_name).await?;
        tracing::debug!(key = %self.api_key_name, "credential resolved");

        let (specification, quality_document) = inputs.require()?;
        let specification = specification
            .load(DocumentRole::Specification, self.max_file_size)
            .await?;
        let quality_document = quality_document
            .load(DocumentRole::QualityDocument, self.max_file_size)
            .await?;

        let texts = ExtractedTexts {
            specification: self
                .extract(DocumentRole::Specification, &specification)
                .await?,
            quality_document: self
                .extract(DocumentRole::QualityDocument, &quality_document)
                .await?,
        };

        let provider = Arc::new(self.factory.build(&api_key)?);
        tracing::info!(
            provider = provider.name(),
            template = self.template.name(),
            "starting validation"
        );

        let pipeline = Pipeline::start(RequirementsStep::new(RequirementExtractor::new(
            Arc::clone(&provider),
            self.settings,
        )))
        .step(EvaluationStep::new(ComplianceEvaluator::new(
            Arc::clone(&provider),
            self.template.clone(),
            self.settings,
        )))
        .step(AssembleStep::new(ReportAssembler::new(
            self.template.summary_header(),
        )));

        let report = pipeline.run(texts).await?;
        tracing::info!(
            requirements = report.requirements().len(),
            results = report.report().len(),
            summary_found = report.mismatch().is_none(),
            "validation complete"
        );
        Ok(report)
    }

    async fn extract(
        &self,
        role: DocumentRole,
        document: &Document,
    ) -> Result<NormalizedText, ValidationError> {
        let text = self
            .extractor
            .extract(document)
            .await
            .map_err(|source| ValidationError::Extraction { role, source })?;
        tracing::info!(%role, name = document.name(), chars = text.len(), "extracted text");
        Ok(text)
    }
}
