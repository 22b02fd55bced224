//! Report assembly.
//!
//! The collaborator's evaluation text is split at the summary header into a
//! full listing and a summary view. The full listing can further be parsed into
//! [`ComplianceResult`] entries, from which the summary is re-derivable.

use std::fmt::{self, Write as _};
use std::sync::LazyLock;

use regex::Regex;

use crate::template::SUMMARY_HEADER;

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:#+\s*)?\*{0,2}\s*(\d+)[.)]\s+(.*?)\s*\*{0,2}\s*$").expect("valid regex")
});
static FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(status|reason)\s*:\s*(.*)$").expect("valid regex"));
static CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:clause|section|cl\.)\s*\d+(?:\.\d+)*").expect("valid regex")
});

/// The evaluation did not contain the summary header.
///
/// Non-fatal: the raw text is still presented as the full listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMismatch {
    pub header: String,
}

impl fmt::Display for TemplateMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "summary section not found (expected header {:?}); showing raw output",
            self.header
        )
    }
}

/// Outcome of splitting one raw evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledReport {
    full_listing: String,
    header: String,
    summary_body: Option<String>,
}

impl AssembledReport {
    /// Per-requirement text before the summary header, trimmed. On a template
    /// mismatch this is the whole raw evaluation, untouched.
    #[must_use]
    pub fn full_listing(&self) -> &str {
        &self.full_listing
    }

    /// The summary region with its header re-attached.
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        self.summary_body
            .as_deref()
            .map(|body| format!("{}\n\n{body}", self.header))
    }

    /// Text after the header, trimmed.
    #[must_use]
    pub fn summary_body(&self) -> Option<&str> {
        self.summary_body.as_deref()
    }

    #[must_use]
    pub fn mismatch(&self) -> Option<TemplateMismatch> {
        if self.summary_body.is_some() {
            None
        } else {
            Some(TemplateMismatch {
                header: self.header.clone(),
            })
        }
    }

    /// Parse the full listing into structured results.
    #[must_use]
    pub fn report(&self) -> Report {
        Report::parse(&self.full_listing)
    }
}

/// Splits evaluations on a fixed header literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportAssembler {
    header: String,
}

impl ReportAssembler {
    #[must_use]
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }

    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Split `raw` on the first occurrence of the header. Never fails.
    #[must_use]
    pub fn assemble(&self, raw: &str) -> AssembledReport {
        match raw.split_once(self.header.as_str()) {
            Some((before, after)) => AssembledReport {
                full_listing: before.trim().to_owned(),
                header: self.header.clone(),
                summary_body: Some(after.trim().to_owned()),
            },
            None => {
                tracing::warn!(header = %self.header, "summary section not found in evaluation");
                AssembledReport {
                    full_listing: raw.to_owned(),
                    header: self.header.clone(),
                    summary_body: None,
                }
            }
        }
    }
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new(SUMMARY_HEADER)
    }
}

/// Split with the built-in summary header.
#[must_use]
pub fn assemble(raw: &str) -> AssembledReport {
    ReportAssembler::default().assemble(raw)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplianceStatus {
    Met,
    PartiallyMet,
    Missing,
}

impl ComplianceStatus {
    /// Case-insensitive match on the leading words. Emphasis, punctuation and
    /// trailing remarks such as `Met ✅` or `Partially Met (see below)` are
    /// ignored; a remark naming another status makes the value ambiguous.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let words: Vec<String> = s
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();
        let (status, rest) = match words.as_slice() {
            [first, second, rest @ ..] if first == "partially" && second == "met" => {
                (Self::PartiallyMet, rest)
            }
            [first, rest @ ..] if first == "met" => (Self::Met, rest),
            [first, rest @ ..] if first == "missing" => (Self::Missing, rest),
            _ => return None,
        };
        let ambiguous = rest
            .iter()
            .any(|w| matches!(w.as_str(), "met" | "partially" | "missing"));
        (!ambiguous).then_some(status)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Met => "Met",
            Self::PartiallyMet => "Partially Met",
            Self::Missing => "Missing",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed entry of the full listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceResult {
    /// The number echoed in the entry heading.
    pub index: usize,
    pub requirement: String,
    /// `None` when the status line is absent or not one of the three values.
    pub status: Option<ComplianceStatus>,
    pub reason: String,
    /// First clause or section reference found in the reason, if any.
    pub clause: Option<String>,
}

impl ComplianceResult {
    fn new(index: usize, requirement: String) -> Self {
        Self {
            index,
            requirement,
            status: None,
            reason: String::new(),
            clause: None,
        }
    }

    fn finish(mut self) -> Self {
        self.reason = self.reason.trim().to_owned();
        self.clause = CLAUSE
            .find(&self.reason)
            .map(|m| m.as_str().trim().to_owned());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Status,
    Reason,
}

/// Ordered per-requirement results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    results: Vec<ComplianceResult>,
}

impl Report {
    #[must_use]
    pub fn new(results: Vec<ComplianceResult>) -> Self {
        Self { results }
    }

    /// Parse `**N. text**` headings followed by `Status:` and `Reason:` lines.
    ///
    /// Headings start at column 0. Inside an open reason, a plain numbered line
    /// only starts a new entry when a `Status:` line follows before any other
    /// field or heading; otherwise it is part of the reason. Bullets and bold
    /// markers are ignored.
    #[must_use]
    pub fn parse(full_listing: &str) -> Self {
        let lines: Vec<&str> = full_listing.lines().collect();
        let mut results = Vec::new();
        let mut current: Option<ComplianceResult> = None;
        let mut last_field: Option<Field> = None;

        for (i, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(heading) = Heading::parse(line) {
                let in_reason = last_field == Some(Field::Reason);
                if !in_reason || heading.decorated || opens_entry(&lines[i + 1..]) {
                    if let Some(done) = current.take() {
                        results.push(done.finish());
                    }
                    current = Some(ComplianceResult::new(heading.index, heading.text));
                    last_field = None;
                    continue;
                }
            }

            let Some(entry) = current.as_mut() else {
                continue;
            };
            let plain = strip_markup(trimmed);
            if let Some(caps) = FIELD.captures(&plain) {
                let value = caps[2].trim();
                if caps[1].eq_ignore_ascii_case("status") {
                    entry.status = ComplianceStatus::parse(value);
                    last_field = Some(Field::Status);
                } else {
                    entry.reason = value.to_owned();
                    last_field = Some(Field::Reason);
                }
            } else if last_field == Some(Field::Reason) {
                entry.reason.push(' ');
                entry.reason.push_str(&plain);
            }
        }
        if let Some(done) = current {
            results.push(done.finish());
        }

        tracing::debug!(entries = results.len(), "parsed compliance results");
        Self { results }
    }

    #[must_use]
    pub fn results(&self) -> &[ComplianceResult] {
        &self.results
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    #[must_use]
    pub fn count(&self, status: ComplianceStatus) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == Some(status))
            .count()
    }

    /// Entries whose status was not recognised.
    #[must_use]
    pub fn unclassified(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_none()).count()
    }

    /// Missing and partially met requirements, in listing order.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let pick = |status: ComplianceStatus| -> Vec<String> {
            self.results
                .iter()
                .filter(|r| r.status == Some(status))
                .map(|r| r.requirement.clone())
                .collect()
        };
        Summary {
            missing: pick(ComplianceStatus::Missing),
            partially_met: pick(ComplianceStatus::PartiallyMet),
        }
    }
}

struct Heading {
    index: usize,
    text: String,
    /// Bold or `#`-prefixed.
    decorated: bool,
}

impl Heading {
    fn parse(line: &str) -> Option<Self> {
        if line.starts_with(char::is_whitespace) {
            return None;
        }
        let line = line.trim_end();
        let caps = HEADING.captures(line)?;
        Some(Self {
            index: caps[1].parse().unwrap_or_default(),
            text: caps[2].trim_end_matches('*').trim().to_owned(),
            decorated: line.starts_with(['*', '#']),
        })
    }
}

/// Whether the next field line after a numbered line is a `Status:`.
fn opens_entry(rest: &[&str]) -> bool {
    for line in rest {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(caps) = FIELD.captures(&strip_markup(trimmed)) {
            return caps[1].eq_ignore_ascii_case("status");
        }
        if Heading::parse(line).is_some() {
            return false;
        }
    }
    false
}

fn strip_markup(line: &str) -> String {
    let line = line
        .strip_prefix(['-', '*', '\u{2022}'])
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .unwrap_or(line);
    line.replace("**", "").trim().to_owned()
}

/// Derived view over a [`Report`]: not-met requirements grouped by status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub missing: Vec<String>,
    pub partially_met: Vec<String>,
}

impl Summary {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.partially_met.is_empty()
    }

    /// Render in the template's summary layout, each group numbered from 1.
    #[must_use]
    pub fn render(&self, header: &str) -> String {
        let mut out = format!("{header}\n\n");
        render_group(&mut out, "Missing", &self.missing);
        out.push('\n');
        render_group(&mut out, "Partially Met", &self.partially_met);
        out
    }
}

fn render_group(out: &mut String, title: &str, items: &[String]) {
    out.push_str("- **");
    out.push_str(title);
    out.push_str(":**\n");
    if items.is_empty() {
        out.push_str("None\n");
    }
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(out, "{}. {item}", i + 1);
    }
}
