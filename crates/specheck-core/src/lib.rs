//! Requirement extraction, compliance evaluation, and report assembly.

pub mod collaborator;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod pipeline;
pub mod report;
pub mod requirements;
pub mod template;
pub mod validator;
pub mod vault;

pub use config::Config;
pub use error::{DocumentRole, InputError, Stage, ValidationError};
pub use evaluation::{ComplianceEvaluator, RawEvaluation};
pub use report::{
    AssembledReport, ComplianceResult, ComplianceStatus, Report, ReportAssembler, Summary,
    TemplateMismatch, assemble,
};
pub use requirements::{Requirement, RequirementExtractor, RequirementList};
pub use template::{EvaluationTemplate, SUMMARY_HEADER};
pub use validator::{
    FixedProvider, OpenAiFactory, ProviderFactory, Upload, ValidationInputs, ValidationReport,
    Validator,
};
