//! Criteria response parser.
//!
//! Splits a free-form LLM report into one structured result per requested
//! criterion. Three heading grammars are tried from strictest to loosest;
//! the first that finds enough sections wins. Parsing never fails: a
//! criterion the parser cannot locate becomes an unmatched placeholder.

mod markers;
mod matcher;
mod patterns;
mod sections;

pub use markers::{extract_confidence, extract_status};
pub use matcher::{assign, Assignment};
pub use sections::{minimal_pass, primary_pass, run_pass, simplified_pass, summary_section, Section};

use tracing::{debug, warn};

use crate::config::ParserConfig;
use crate::report::AnalysisReport;
use crate::types::{CriterionRequest, ParsedCriterionResult, PassKind};

/// Sections found by the winning pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// `None` when every pass came back empty
    pub pass: Option<PassKind>,
    pub sections: Vec<Section>,
}

/// Stateless parser for LLM criteria reports.
///
/// Holds only its configuration, so one instance can be shared freely
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct CriteriaResponseParser {
    config: ParserConfig,
}

impl CriteriaResponseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse `raw_text` into exactly one result per entry of `requested`,
    /// in the same order.
    pub fn parse(&self, raw_text: &str, requested: &[CriterionRequest]) -> Vec<ParsedCriterionResult> {
        if requested.is_empty() {
            return Vec::new();
        }

        let extraction = self.extract(raw_text, requested.len());
        self.build_results(&extraction, requested)
    }

    /// Parse and summarize: results plus the winning pass, the general
    /// result section and per-status counts.
    pub fn parse_report(&self, raw_text: &str, requested: &[CriterionRequest]) -> AnalysisReport {
        let extraction = if requested.is_empty() {
            Extraction {
                pass: None,
                sections: Vec::new(),
            }
        } else {
            self.extract(raw_text, requested.len())
        };

        let results = self.build_results(&extraction, requested);
        let general = summary_section(raw_text, self.config.skip_code_fences);

        AnalysisReport::new(results, extraction.pass, general)
    }

    /// Run passes in escalation order until one yields enough sections.
    ///
    /// When none does, the pass with the most sections is kept; the
    /// stricter pass wins ties.
    pub fn extract(&self, raw_text: &str, requested: usize) -> Extraction {
        let required = self.config.required_sections(requested);
        let mut best = Extraction {
            pass: None,
            sections: Vec::new(),
        };

        for pass in PassKind::ALL {
            let sections = run_pass(pass, raw_text, self.config.skip_code_fences);
            debug!(pass = ?pass, found = sections.len(), required, "Extraction pass finished");

            if sections.len() >= required {
                return Extraction {
                    pass: Some(pass),
                    sections,
                };
            }

            if sections.len() > best.sections.len() {
                best = Extraction {
                    pass: Some(pass),
                    sections,
                };
            }
        }

        debug!(pass = ?best.pass, found = best.sections.len(), "No pass met the section threshold");
        best
    }

    fn build_results(
        &self,
        extraction: &Extraction,
        requested: &[CriterionRequest],
    ) -> Vec<ParsedCriterionResult> {
        let slots = assign(&extraction.sections, requested);

        let results: Vec<ParsedCriterionResult> = requested
            .iter()
            .zip(slots)
            .map(|(request, slot)| match slot {
                Some(assignment) => {
                    let section = &extraction.sections[assignment.section];
                    ParsedCriterionResult {
                        key: request.key.clone(),
                        name: if section.title.is_empty() {
                            request.name.clone()
                        } else {
                            section.title.clone()
                        },
                        status: extract_status(&section.body),
                        confidence: extract_confidence(&section.body),
                        content: section.body.clone(),
                        matched: true,
                        match_kind: assignment.kind,
                    }
                }
                None => ParsedCriterionResult::unmatched(request),
            })
            .collect();

        let missing: Vec<&str> = results
            .iter()
            .filter(|r| !r.matched)
            .map(|r| r.key.as_str())
            .collect();
        if !missing.is_empty() {
            warn!(
                missing = missing.len(),
                requested = requested.len(),
                keys = ?missing,
                "Criteria not found in response"
            );
        }

        results
    }
}
