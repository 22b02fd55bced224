pub mod builder;
pub mod stages;
pub mod step;

pub use builder::Pipeline;
pub use stages::{
    AssembleStep, Evaluated, EvaluationInput, EvaluationStep, ExtractedTexts, RequirementsStep,
};
pub use step::Step;
