//! Evaluation prompt templates.
//!
//! A template is a system message plus a body with `{document}` and
//! `{requirements}` placeholders. The body instructs the collaborator to close
//! its answer with a section introduced by the template's summary header, which
//! the report assembler later splits on.

use specheck_llm::Message;

use crate::error::ValidationError;

/// Literal that opens the missing / partially met recap.
pub const SUMMARY_HEADER: &str = "**Summary of Missing and Partially Met Requirements:**";

pub const DOCUMENT_PLACEHOLDER: &str = "{document}";
pub const REQUIREMENTS_PLACEHOLDER: &str = "{requirements}";

const VALIDATION_SYSTEM_PROMPT: &str = "You are an expert in construction compliance validation.";

const DETAILED_BODY: &str = "\
The following is the content of a construction quality document:
{document}

Validate against the following requirements:
{requirements}

Output Format:

Step 1 - For each requirement, output:
**<number>. <Requirement>**
- **Status:** Met / Partially Met / Missing
- **Reason:** short justification (mention evidence if Met or what's missing if not)

Step 2 - At the end, write:
{summary_header}

- **Missing:**
1. ...
2. ...

- **Partially Met:**
1. ...
2. ...

Be precise. If a requirement has multiple components, clearly state what is met and what is missing. Use clause references if applicable.

Only use the format above.
";

const CONCISE_BODY: &str = "\
Quality document:
{document}

Requirements:
{requirements}

For each requirement, output:
**<number>. <Requirement>**
- **Status:** Met / Partially Met / Missing
- **Reason:** one sentence

Then write:
{summary_header}

- **Missing:**
1. ...

- **Partially Met:**
1. ...

Only use the format above.
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationTemplate {
    name: String,
    system_prompt: String,
    body: String,
    summary_header: String,
}

impl EvaluationTemplate {
    /// Clause-referenced template asking for a per-component breakdown.
    #[must_use]
    pub fn detailed() -> Self {
        Self::builtin("detailed", DETAILED_BODY)
    }

    #[must_use]
    pub fn concise() -> Self {
        Self::builtin("concise", CONCISE_BODY)
    }

    fn builtin(name: &str, body: &str) -> Self {
        Self {
            name: name.to_owned(),
            system_prompt: VALIDATION_SYSTEM_PROMPT.to_owned(),
            body: body.replace("{summary_header}", SUMMARY_HEADER),
            summary_header: SUMMARY_HEADER.to_owned(),
        }
    }

    /// Build a template from user-supplied parts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Configuration`] if the body lacks either
    /// placeholder or the summary header, or the header is blank.
    pub fn custom(
        system_prompt: String,
        body: String,
        summary_header: String,
    ) -> Result<Self, ValidationError> {
        if summary_header.trim().is_empty() {
            return Err(ValidationError::configuration(
                "custom template summary header must not be empty",
            ));
        }
        for placeholder in [DOCUMENT_PLACEHOLDER, REQUIREMENTS_PLACEHOLDER] {
            if !body.contains(placeholder) {
                return Err(ValidationError::configuration(format!(
                    "custom template body is missing the {placeholder} placeholder"
                )));
            }
        }
        if !body.contains(&summary_header) {
            return Err(ValidationError::configuration(
                "custom template body must instruct the model to emit the summary header",
            ));
        }
        Ok(Self {
            name: "custom".to_owned(),
            system_prompt,
            body,
            summary_header,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    #[must_use]
    pub fn summary_header(&self) -> &str {
        &self.summary_header
    }

    /// Substitute the placeholders in a single pass over the body.
    ///
    /// Inserted text is never rescanned, so a document that happens to contain
    /// `{requirements}` is embedded unchanged.
    #[must_use]
    pub fn render(&self, document: &str, requirements: &str) -> String {
        let mut out = String::with_capacity(self.body.len() + document.len() + requirements.len());
        let mut rest = self.body.as_str();
        while let Some(pos) = rest.find('{') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            if let Some(after) = tail.strip_prefix(DOCUMENT_PLACEHOLDER) {
                out.push_str(document);
                rest = after;
            } else if let Some(after) = tail.strip_prefix(REQUIREMENTS_PLACEHOLDER) {
                out.push_str(requirements);
                rest = after;
            } else {
                out.push('{');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        out
    }

    #[must_use]
    pub fn messages(&self, document: &str, requirements: &str) -> Vec<Message> {
        vec![
            Message::system(self.system_prompt.clone()),
            Message::user(self.render(document, requirements)),
        ]
    }
}

impl Default for EvaluationTemplate {
    fn default() -> Self {
        Self::detailed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_embed_summary_header() {
        for template in [EvaluationTemplate::detailed(), EvaluationTemplate::concise()] {
            let rendered = template.render("doc", "reqs");
            assert!(rendered.contains(SUMMARY_HEADER), "{}", template.name());
            assert!(!rendered.contains("{summary_header}"));
            assert_eq!(template.summary_header(), SUMMARY_HEADER);
        }
    }

    #[test]
    fn detailed_mentions_clause_references() {
        let rendered = EvaluationTemplate::detailed().render("", "");
        assert!(rendered.contains("clause references"));
        assert!(!EvaluationTemplate::concise().render("", "").contains("clause references"));
    }

    #[test]
    fn render_substitutes_both_placeholders() {
        let rendered = EvaluationTemplate::detailed().render("QUALITY TEXT", "1. REQ");
        assert!(rendered.contains("quality document:\nQUALITY TEXT\n"));
        assert!(rendered.contains("requirements:\n1. REQ\n"));
        assert!(!rendered.contains(DOCUMENT_PLACEHOLDER));
        assert!(!rendered.contains(REQUIREMENTS_PLACEHOLDER));
    }

    #[test]
    fn render_does_not_rescan_inserted_text() {
        let template = EvaluationTemplate::custom(
            "sys".into(),
            "D={document} R={requirements} H".into(),
            "H".into(),
        )
        .unwrap();
        let rendered = template.render("{requirements}", "{document}");
        assert_eq!(rendered, "D={requirements} R={document} H");
    }

    #[test]
    fn render_keeps_unrelated_braces() {
        let template =
            EvaluationTemplate::custom("s".into(), "{x} {document}{requirements} H".into(), "H".into())
                .unwrap();
        assert_eq!(template.render("a", "b"), "{x} ab H");
    }

    #[test]
    fn render_with_empty_document() {
        let rendered = EvaluationTemplate::concise().render("", "1. R");
        assert!(rendered.starts_with("Quality document:\n\n"));
    }

    #[test]
    fn custom_requires_placeholders() {
        let err = EvaluationTemplate::custom("s".into(), "{document} H".into(), "H".into())
            .unwrap_err();
        assert!(err.to_string().contains("{requirements}"));
    }

    #[test]
    fn custom_requires_header_in_body() {
        let err = EvaluationTemplate::custom(
            "s".into(),
            "{document} {requirements}".into(),
            "## Gaps".into(),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::Configuration(_)));
    }

    #[test]
    fn messages_are_system_then_user() {
        let msgs = EvaluationTemplate::detailed().messages("d", "r");
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, specheck_llm::Role::System);
        assert_eq!(msgs[0].content, VALIDATION_SYSTEM_PROMPT);
        assert_eq!(msgs[1].role, specheck_llm::Role::User);
    }
}
