use std::sync::Arc;

use specheck_document::NormalizedText;
use specheck_llm::LlmProvider;

use crate::collaborator::{RequestSettings, round_trip};
use crate::error::{Stage, ValidationError};
use crate::requirements::RequirementList;
use crate::template::EvaluationTemplate;

/// The collaborator's evaluation text, passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvaluation(String);

impl RawEvaluation {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for RawEvaluation {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Asks the collaborator to classify every requirement against a quality document.
///
/// Request construction and response pass-through only; the classification
/// itself is never checked here.
pub struct ComplianceEvaluator<P> {
    provider: Arc<P>,
    template: EvaluationTemplate,
    settings: RequestSettings,
}

impl<P: LlmProvider> ComplianceEvaluator<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, template: EvaluationTemplate, settings: RequestSettings) -> Self {
        Self {
            provider,
            template,
            settings,
        }
    }

    #[must_use]
    pub fn template(&self) -> &EvaluationTemplate {
        &self.template
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::Collaborator`] if the round-trip fails or times out.
    pub async fn evaluate(
        &self,
        document: &NormalizedText,
        requirements: &RequirementList,
    ) -> Result<RawEvaluation, ValidationError> {
        if document.is_empty() {
            tracing::warn!("quality document text is empty, evaluating anyway");
        }
        let messages = self
            .template
            .messages(document.as_str(), requirements.raw());
        tracing::debug!(
            template = self.template.name(),
            document_chars = document.len(),
            requirements = requirements.len(),
            "sending evaluation request"
        );

        let text = round_trip(self.provider.as_ref(), &messages, &self.settings)
            .await
            .map_err(|source| ValidationError::Collaborator {
                stage: Stage::ComplianceEvaluation,
                source,
            })?;
        tracing::info!(chars = text.len(), "received compliance evaluation");
        Ok(RawEvaluation(text))
    }
}

#[cfg(test)]
mod tests {
    use specheck_llm::mock::MockProvider;

    use super::*;

    fn evaluator(mock: &Arc<MockProvider>) -> ComplianceEvaluator<MockProvider> {
        ComplianceEvaluator::new(
            Arc::clone(mock),
            EvaluationTemplate::detailed(),
            RequestSettings::default(),
        )
    }

    #[tokio::test]
    async fn prompt_embeds_document_and_raw_requirements() {
        let mock = Arc::new(MockProvider::with_responses(vec!["result".into()]));
        let reqs = RequirementList::parse("1. Cover 40 mm.\n  - tolerance 5 mm\n");
        let raw = evaluator(&mock)
            .evaluate(&NormalizedText::from("Concrete cover 40 mm."), &reqs)
            .await
            .unwrap();

        assert_eq!(raw.as_str(), "result");
        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        let user = &requests[0].messages[1].content;
        assert!(user.contains("Concrete cover 40 mm."));
        assert!(user.contains("1. Cover 40 mm.\n  - tolerance 5 mm\n"));
        assert!(requests[0].options.is_deterministic());
    }

    #[tokio::test]
    async fn empty_document_does_not_fail() {
        let mock = Arc::new(MockProvider::with_responses(vec![
            "**1. Cover 40 mm.**\n- **Status:** Missing\n- **Reason:** no content".into(),
        ]));
        let raw = evaluator(&mock)
            .evaluate(
                &NormalizedText::default(),
                &RequirementList::parse("Cover 40 mm."),
            )
            .await
            .unwrap();
        assert!(raw.as_str().contains("Missing"));
    }

    #[tokio::test]
    async fn response_passes_through_unchanged() {
        let body = "**1. R**\n- **Status:** Banana\n";
        let mock = Arc::new(MockProvider::with_responses(vec![body.into()]));
        let raw = evaluator(&mock)
            .evaluate(&NormalizedText::from("d"), &RequirementList::parse("R"))
            .await
            .unwrap();
        assert_eq!(raw.into_string(), body);
    }

    #[tokio::test]
    async fn failure_maps_to_evaluation_stage() {
        let mock = Arc::new(MockProvider::failing());
        let err = evaluator(&mock)
            .evaluate(&NormalizedText::from("d"), &RequirementList::parse("R"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Collaborator {
                stage: Stage::ComplianceEvaluation,
                ..
            }
        ));
    }
}
