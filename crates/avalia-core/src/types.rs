//! Core types for criteria extraction.

use serde::{Deserialize, Serialize};

/// A criterion the analysis was asked to evaluate.
///
/// Ordering of requests matters: it drives positional matching and the
/// order of the parsed results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CriterionRequest {
    /// Opaque identifier (e.g., "criteria_66")
    pub key: String,

    /// Human-readable name as shown to the LLM
    pub name: String,

    /// Explicit criterion number, if the prompt numbered it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
}

impl CriterionRequest {
    /// Create a request without an explicit number.
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            number: None,
        }
    }

    /// Attach an explicit criterion number.
    pub fn with_number(mut self, number: u32) -> Self {
        self.number = Some(number);
        self
    }
}

/// Conformance verdict stated by the LLM for one criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CriterionStatus {
    Conformant,
    PartiallyConformant,
    NonConformant,
    #[default]
    Unknown,
}

impl CriterionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CriterionStatus::Conformant => "conformant",
            CriterionStatus::PartiallyConformant => "partially_conformant",
            CriterionStatus::NonConformant => "non_conformant",
            CriterionStatus::Unknown => "unknown",
        }
    }

    /// Whether the LLM stated a recognizable verdict.
    pub fn is_known(self) -> bool {
        !matches!(self, CriterionStatus::Unknown)
    }
}

impl std::fmt::Display for CriterionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which strategy attached a response section to a requested criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Heading number equals the request's number or position
    ExactNumeric,
    /// Heading title and requested name contain one another
    FuzzyTitle,
    /// Section order lined up with request order
    Positional,
    /// No section found; placeholder result
    Unmatched,
}

/// Heading grammar that produced the extracted sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    /// `## Critério N: Title` headings
    Primary,
    /// `N: Title` headings, optionally with `#` markers
    Simplified,
    /// Any line shaped like `N:` after arbitrary decoration
    Minimal,
}

impl PassKind {
    /// Passes in escalation order.
    pub const ALL: [PassKind; 3] = [PassKind::Primary, PassKind::Simplified, PassKind::Minimal];

    pub fn as_str(self) -> &'static str {
        match self {
            PassKind::Primary => "primary",
            PassKind::Simplified => "simplified",
            PassKind::Minimal => "minimal",
        }
    }
}

impl std::fmt::Display for PassKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured result for one requested criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCriterionResult {
    /// Copied from the request
    pub key: String,

    /// Heading title when matched, requested name otherwise
    pub name: String,

    pub status: CriterionStatus,

    /// Stated confidence in [0.0, 1.0]
    pub confidence: Option<f64>,

    /// Section body (evidence, analysis, recommendations)
    pub content: String,

    /// False for synthesized placeholders
    pub matched: bool,

    pub match_kind: MatchKind,
}

impl ParsedCriterionResult {
    /// Placeholder for a criterion the response never addressed.
    pub fn unmatched(request: &CriterionRequest) -> Self {
        Self {
            key: request.key.clone(),
            name: request.name.clone(),
            status: CriterionStatus::Unknown,
            confidence: None,
            content: String::new(),
            matched: false,
            match_kind: MatchKind::Unmatched,
        }
    }
}
