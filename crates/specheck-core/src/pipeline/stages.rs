//! The three stages of a validation run and the values passed between them.

use specheck_document::NormalizedText;
use specheck_llm::LlmProvider;

use crate::error::ValidationError;
use crate::evaluation::{ComplianceEvaluator, RawEvaluation};
use crate::report::ReportAssembler;
use crate::requirements::{RequirementExtractor, RequirementList};
use crate::validator::ValidationReport;

use super::step::Step;

/// Text of both uploads, extracted before any collaborator call.
#[derive(Debug, Clone, Default)]
pub struct ExtractedTexts {
    pub specification: NormalizedText,
    pub quality_document: NormalizedText,
}

#[derive(Debug, Clone)]
pub struct EvaluationInput {
    pub quality_document: NormalizedText,
    pub requirements: RequirementList,
}

#[derive(Debug, Clone)]
pub struct Evaluated {
    pub requirements: RequirementList,
    pub raw: RawEvaluation,
}

pub struct RequirementsStep<P>(RequirementExtractor<P>);

impl<P> RequirementsStep<P> {
    #[must_use]
    pub fn new(extractor: RequirementExtractor<P>) -> Self {
        Self(extractor)
    }
}

impl<P: LlmProvider> Step for RequirementsStep<P> {
    type Input = ExtractedTexts;
    type Output = EvaluationInput;

    fn name(&self) -> &'static str {
        "requirements"
    }

    async fn run(&self, input: Self::Input) -> Result<Self::Output, ValidationError> {
        let requirements = self.0.extract_requirements(&input.specification).await?;
        Ok(EvaluationInput {
            quality_document: input.quality_document,
            requirements,
        })
    }
}

pub struct EvaluationStep<P>(ComplianceEvaluator<P>);

impl<P> EvaluationStep<P> {
    #[must_use]
    pub fn new(evaluator: ComplianceEvaluator<P>) -> Self {
        Self(evaluator)
    }
}

impl<P: LlmProvider> Step for EvaluationStep<P> {
    type Input = EvaluationInput;
    type Output = Evaluated;

    fn name(&self) -> &'static str {
        "evaluation"
    }

    async fn run(&self, input: Self::Input) -> Result<Self::Output, ValidationError> {
        let raw = self
            .0
            .evaluate(&input.quality_document, &input.requirements)
            .await?;
        Ok(Evaluated {
            requirements: input.requirements,
            raw,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssembleStep(ReportAssembler);

impl AssembleStep {
    #[must_use]
    pub fn new(assembler: ReportAssembler) -> Self {
        Self(assembler)
    }
}

impl Step for AssembleStep {
    type Input = Evaluated;
    type Output = ValidationReport;

    fn name(&self) -> &'static str {
        "assemble"
    }

    async fn run(&self, input: Self::Input) -> Result<Self::Output, ValidationError> {
        let assembled = self.0.assemble(input.raw.as_str());
        Ok(ValidationReport::new(input.requirements, input.raw, assembled))
    }
}
