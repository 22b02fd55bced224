use std::sync::{Arc, LazyLock};

use regex::Regex;
use specheck_document::NormalizedText;
use specheck_llm::{LlmProvider, Message};

use crate::collaborator::{RequestSettings, round_trip};
use crate::error::{Stage, ValidationError};

const EXTRACTION_SYSTEM_PROMPT: &str =
    "You are an expert in construction specification extraction.";

const EXTRACTION_INSTRUCTIONS: &str = "\
You are reviewing a construction specification.
Some paragraphs contain general requirements followed by specific sub-items (e.g., \"Evidence shall be provided within 12 months, including: compressive strength, drying shrinkage...\")
Your task is to extract all requirements clearly and separately:
1. The general (parent) requirement.
2. Each sub-requirement as a separate item, on its own line starting with \"- \" directly below its parent.
A requirement without sub-items is a single line.
Output each as its own line.
Now extract all such requirements from the following specification:
";

static LETTERED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(?(?:[a-z]|[ivx]{1,4})\)\s").expect("valid regex"));

/// One atomic normative statement, numbered by its position in the extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// 1-based position; strictly increasing within one extraction.
    pub id: usize,
    /// The response line, trimmed, including any list marker.
    pub text: String,
    /// Id of the enclosing general requirement for sub-items. Always less than `id`.
    pub parent: Option<usize>,
}

impl Requirement {
    #[must_use]
    pub fn is_sub_item(&self) -> bool {
        self.parent.is_some()
    }
}

/// Requirements parsed from one collaborator response.
///
/// The raw response is kept verbatim because the evaluation prompt embeds it
/// exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementList {
    raw: String,
    items: Vec<Requirement>,
}

impl RequirementList {
    /// Map each non-blank line of `raw` to one requirement, in order.
    ///
    /// No reordering, deduplication, or validation against the source text is
    /// performed. A line is a sub-item when it is indented or starts with a
    /// bullet or lettered marker; its parent is the nearest preceding top-level
    /// entry. A sub-item with no top-level entry before it becomes top-level.
    #[must_use]
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let mut items: Vec<Requirement> = Vec::new();
        let mut last_top_level: Option<usize> = None;

        for line in raw.lines() {
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            let id = items.len() + 1;
            let parent = if looks_like_sub_item(line) {
                last_top_level
            } else {
                None
            };
            if parent.is_none() {
                last_top_level = Some(id);
            }
            items.push(Requirement {
                id,
                text: text.to_owned(),
                parent,
            });
        }

        Self { raw, items }
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn items(&self) -> &[Requirement] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Requirement> {
        self.items.iter()
    }

    #[must_use]
    pub fn get(&self, id: usize) -> Option<&Requirement> {
        id.checked_sub(1).and_then(|i| self.items.get(i))
    }

    /// Sub-items whose parent is `id`, in list order.
    pub fn children(&self, id: usize) -> impl Iterator<Item = &Requirement> {
        self.items.iter().filter(move |r| r.parent == Some(id))
    }
}

impl<'a> IntoIterator for &'a RequirementList {
    type Item = &'a Requirement;
    type IntoIter = std::slice::Iter<'a, Requirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn looks_like_sub_item(line: &str) -> bool {
    if line.starts_with([' ', '\t']) {
        return true;
    }
    let text = line.trim_start();
    if text.starts_with("**") {
        return false;
    }
    let bullet = ['-', '*', '\u{2022}', '\u{2013}'].iter().any(|m| {
        text.strip_prefix(*m)
            .is_some_and(|rest| rest.starts_with(char::is_whitespace))
    });
    bullet || LETTERED_MARKER.is_match(text)
}

/// The two messages of the extraction request.
#[must_use]
pub fn extraction_messages(spec_text: &str) -> Vec<Message> {
    vec![
        Message::system(EXTRACTION_SYSTEM_PROMPT),
        Message::user(format!("{EXTRACTION_INSTRUCTIONS}{spec_text}")),
    ]
}

/// Turns specification text into an ordered requirement list in one round-trip.
pub struct RequirementExtractor<P> {
    provider: Arc<P>,
    settings: RequestSettings,
}

impl<P: LlmProvider> RequirementExtractor<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, settings: RequestSettings) -> Self {
        Self { provider, settings }
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::Collaborator`] if the round-trip fails or times out.
    pub async fn extract_requirements(
        &self,
        spec: &NormalizedText,
    ) -> Result<RequirementList, ValidationError> {
        if spec.is_empty() {
            tracing::warn!("specification text is empty");
        }
        let messages = extraction_messages(spec.as_str());
        let raw = round_trip(self.provider.as_ref(), &messages, &self.settings)
            .await
            .map_err(|source| ValidationError::Collaborator {
                stage: Stage::RequirementExtraction,
                source,
            })?;

        let list = RequirementList::parse(raw);
        tracing::info!(
            requirements = list.len(),
            sub_items = list.iter().filter(|r| r.is_sub_item()).count(),
            "extracted requirements"
        );
        if list.is_empty() {
            tracing::warn!("collaborator returned no requirements");
        }
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use specheck_llm::Role;
    use specheck_llm::mock::MockProvider;

    use super::*;

    #[test]
    fn each_non_blank_line_is_one_requirement() {
        let list = RequirementList::parse("First.\n\nSecond.\n   \nThird.");
        let texts: Vec<_> = list.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["First.", "Second.", "Third."]);
        let ids: Vec<_> = list.iter().map(|r| r.id).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert!(list.iter().all(|r| r.parent.is_none()));
    }

    #[test]
    fn bullets_attach_to_previous_top_level() {
        let raw = "1. Evidence shall be provided within 12 months.\n\
                   - Compressive strength.\n\
                   - Drying shrinkage.\n\
                   2. Cover shall be 40 mm.\n\
                   \x20\x20Tolerance +/- 5 mm.";
        let list = RequirementList::parse(raw);
        let parents: Vec<_> = list.iter().map(|r| r.parent).collect();
        assert_eq!(parents, [None, Some(1), Some(1), None, Some(4)]);
        assert_eq!(list.children(1).count(), 2);
        assert_eq!(list.get(5).unwrap().text, "Tolerance +/- 5 mm.");
    }

    #[test]
    fn lettered_markers_are_sub_items() {
        let list = RequirementList::parse("Parent:\na) one\n(b) two\nii) three\nabc) not a marker");
        let parents: Vec<_> = list.iter().map(|r| r.parent).collect();
        assert_eq!(parents, [None, Some(1), Some(1), Some(1), None]);
    }

    #[test]
    fn leading_sub_item_without_parent_is_top_level() {
        let list = RequirementList::parse("- orphan\nParent\n- child");
        let parents: Vec<_> = list.iter().map(|r| r.parent).collect();
        assert_eq!(parents, [None, None, Some(2)]);
    }

    #[test]
    fn bold_lines_and_hyphenated_words_are_top_level() {
        let list = RequirementList::parse("**Heading**\n-5 degrees minimum\nNext");
        assert!(list.iter().all(|r| r.parent.is_none()));
    }

    #[test]
    fn raw_is_preserved_verbatim() {
        let raw = "A\n\n  - b  \n";
        let list = RequirementList::parse(raw);
        assert_eq!(list.raw(), raw);
        assert_eq!(list.get(2).unwrap().text, "- b");
    }

    #[test]
    fn empty_response_yields_empty_list() {
        let list = RequirementList::parse("\n \n");
        assert!(list.is_empty());
        assert!(list.get(0).is_none());
        assert!(list.get(1).is_none());
    }

    #[test]
    fn extraction_messages_embed_full_spec() {
        let msgs = extraction_messages("SPEC BODY");
        assert_eq!(msgs[0].role, Role::System);
        assert_eq!(msgs[1].role, Role::User);
        assert!(msgs[1].content.ends_with("specification:\nSPEC BODY"));
    }

    #[tokio::test]
    async fn extractor_sends_one_deterministic_request() {
        let mock = Arc::new(MockProvider::with_responses(vec![
            "Evidence shall be provided within 12 months.\n- Strength and shrinkage results."
                .into(),
        ]));
        let extractor = RequirementExtractor::new(Arc::clone(&mock), RequestSettings::default());
        let list = extractor
            .extract_requirements(&NormalizedText::from("spec"))
            .await
            .unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.get(2).unwrap().parent, Some(1));
        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].options.is_deterministic());
        assert_eq!(requests[0].options.max_tokens, 4000);
    }

    #[tokio::test]
    async fn extractor_error_is_collaborator_error() {
        let extractor = RequirementExtractor::new(
            Arc::new(MockProvider::failing()),
            RequestSettings::default(),
        );
        let err = extractor
            .extract_requirements(&NormalizedText::from("spec"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Collaborator {
                stage: Stage::RequirementExtraction,
                ..
            }
        ));
    }

    proptest! {
        #[test]
        fn line_mapping_is_order_preserving(lines in proptest::collection::vec("[ -~]{0,12}", 0..20)) {
            let raw = lines.join("\n");
            let list = RequirementList::parse(raw.clone());
            let expected: Vec<&str> = raw.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
            prop_assert_eq!(list.len(), expected.len());
            for (i, (req, line)) in list.iter().zip(expected).enumerate() {
                prop_assert_eq!(req.id, i + 1);
                prop_assert_eq!(req.text.as_str(), line);
                if let Some(parent) = req.parent {
                    prop_assert!(parent < req.id);
                    prop_assert!(list.get(parent).unwrap().parent.is_none());
                }
            }
        }
    }
}
