//! Report aggregation: per-criterion results plus summary figures.
//!
//! The summary is derived from the results alone, so re-parsing the same
//! response always yields the same report.

use serde::{Deserialize, Serialize};

use crate::types::{CriterionStatus, ParsedCriterionResult, PassKind};

/// Aggregated counts over a set of parsed results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub conformant: usize,
    pub partially_conformant: usize,
    pub non_conformant: usize,
    pub unknown: usize,

    /// Mean of the confidences that were stated
    pub mean_confidence: Option<f64>,

    /// (conformant + 0.5 × partial) / results with a known status
    pub conformance_score: Option<f64>,
}

impl ReportSummary {
    pub fn from_results(results: &[ParsedCriterionResult]) -> Self {
        let mut summary = ReportSummary {
            total: results.len(),
            ..Default::default()
        };

        let mut confidence_sum = 0.0;
        let mut confidence_count = 0usize;

        for result in results {
            if result.matched {
                summary.matched += 1;
            } else {
                summary.unmatched += 1;
            }

            match result.status {
                CriterionStatus::Conformant => summary.conformant += 1,
                CriterionStatus::PartiallyConformant => summary.partially_conformant += 1,
                CriterionStatus::NonConformant => summary.non_conformant += 1,
                CriterionStatus::Unknown => summary.unknown += 1,
            }

            if let Some(confidence) = result.confidence {
                confidence_sum += confidence;
                confidence_count += 1;
            }
        }

        if confidence_count > 0 {
            summary.mean_confidence = Some(confidence_sum / confidence_count as f64);
        }

        let known = summary.conformant + summary.partially_conformant + summary.non_conformant;
        if known > 0 {
            let points = summary.conformant as f64 + 0.5 * summary.partially_conformant as f64;
            summary.conformance_score = Some(points / known as f64);
        }

        summary
    }
}

/// Everything extracted from one LLM response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// One entry per requested criterion, in request order
    pub results: Vec<ParsedCriterionResult>,

    /// Heading grammar that produced the sections
    pub pass: Option<PassKind>,

    /// Body of the "general result / recommendations" section
    pub general_section: Option<String>,

    pub summary: ReportSummary,
}

impl AnalysisReport {
    pub fn new(
        results: Vec<ParsedCriterionResult>,
        pass: Option<PassKind>,
        general_section: Option<String>,
    ) -> Self {
        let summary = ReportSummary::from_results(&results);
        Self {
            results,
            pass,
            general_section,
            summary,
        }
    }

    /// Results the caller should flag as "could not be evaluated".
    pub fn unmatched(&self) -> impl Iterator<Item = &ParsedCriterionResult> {
        self.results.iter().filter(|r| !r.matched)
    }
}
