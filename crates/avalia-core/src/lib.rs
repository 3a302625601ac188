//! # avalia-core
//!
//! Deterministic criteria extraction from LLM code-quality reports.
//!
//! An analysis asks an LLM to evaluate submitted code against a list of
//! criteria. The model answers with one loosely formatted markdown report.
//! This crate splits that report into one structured result per requested
//! criterion: status, confidence and the evidence/recommendation text.
//!
//! ## Key Guarantees
//!
//! 1. **Complete**: exactly one result per requested criterion, in order
//! 2. **Deterministic**: same input always produces same output
//! 3. **Infallible**: malformed input degrades to placeholders, never errors
//! 4. **Pure**: no I/O, no shared mutable state, safe to call from any thread
//!
//! ## Example
//!
//! ```rust,ignore
//! use avalia_core::{parse, CriterionRequest, CriterionStatus};
//!
//! let requested = vec![
//!     CriterionRequest::new("criteria_1", "Legibilidade"),
//!     CriterionRequest::new("criteria_66", "Princípios SOLID"),
//! ];
//! let results = parse(&llm_response, &requested);
//!
//! for result in &results {
//!     if !result.matched {
//!         println!("{}: could not be evaluated", result.key);
//!     } else if result.status == CriterionStatus::NonConformant {
//!         println!("{}: {}", result.name, result.content);
//!     }
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod normalize;
pub mod parser;
pub mod report;
pub mod types;

// Re-export main types at crate root
pub use catalog::{CatalogError, CriteriaCatalog, CriterionDefinition};
pub use config::{ConfigError, ParserConfig};
pub use parser::{CriteriaResponseParser, Extraction, Section};
pub use report::{AnalysisReport, ReportSummary};
pub use types::{CriterionRequest, CriterionStatus, MatchKind, ParsedCriterionResult, PassKind};

/// Parse an LLM response with the default configuration.
///
/// Returns exactly one result per entry of `requested`, in the same order.
pub fn parse(raw_text: &str, requested: &[CriterionRequest]) -> Vec<ParsedCriterionResult> {
    CriteriaResponseParser::new().parse(raw_text, requested)
}

/// Parse an LLM response and summarize it with the default configuration.
pub fn parse_report(raw_text: &str, requested: &[CriterionRequest]) -> AnalysisReport {
    CriteriaResponseParser::new().parse_report(raw_text, requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_parse() {
        let response = "\
## Critério 1: Legibilidade
Código claro.
**Status:** Conforme
**Confiança:** 95%
";
        let requested = vec![CriterionRequest::new("criteria_1", "Legibilidade")];
        let results = parse(response, &requested);

        assert_eq!(results.len(), 1);
        assert!(results[0].matched);
        assert_eq!(results[0].status, CriterionStatus::Conformant);
        assert_eq!(results[0].confidence, Some(0.95));
    }

    #[test]
    fn test_catalog_to_report() {
        let catalog = CriteriaCatalog::from_yaml(
            r#"
catalog_version: "1.0"
name: "Padrão"
criteria:
  - key: criteria_1
    name: "Legibilidade"
  - key: criteria_2
    name: "Testes"
"#,
        )
        .unwrap();

        let requested = catalog.requests_for(&["criteria_2"]).unwrap();
        let report = parse_report("## Critério 1: Testes\nPoucos.\nStatus: Parcialmente conforme", &requested);

        assert_eq!(report.results[0].key, "criteria_2");
        assert_eq!(report.results[0].status, CriterionStatus::PartiallyConformant);
        assert_eq!(report.summary.conformance_score, Some(0.5));
    }
}
