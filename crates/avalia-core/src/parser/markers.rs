//! Status and confidence markers inside a section body.
//!
//! Both extractors look for a labelled line first (`**Status:** ...`,
//! `**Confiança:** ...`). Labels only count at the start of a line, so prose
//! that happens to mention "status" or "certeza" is not mistaken for one.
//! The first labelled line with a usable value decides the outcome. Only
//! bodies without any labelled line fall back to scanning free text.

use crate::normalize::fold;
use crate::types::CriterionStatus;

use super::patterns::{
    CONFIDENCE_LABEL, CONFORMANT_STATUS, LABELLED_NUMBER, LOOSE_CONFIDENCE, NON_CONFORMANT_STATUS,
    PARTIAL_STATUS, STATUS_LABEL,
};

/// Detect the verdict stated in `body`.
pub fn extract_status(body: &str) -> CriterionStatus {
    let folded = fold(body);

    let mut labelled = false;
    for line in folded.lines() {
        if let Some(caps) = STATUS_LABEL.captures(line) {
            labelled = true;
            if let Some(status) = classify(&caps["value"]) {
                return status;
            }
        }
    }

    if labelled {
        return CriterionStatus::Unknown;
    }

    folded
        .lines()
        .find_map(classify)
        .unwrap_or(CriterionStatus::Unknown)
}

/// Detect the stated confidence in `body`, normalized to [0, 1].
pub fn extract_confidence(body: &str) -> Option<f64> {
    let folded = fold(body);

    let mut labelled = false;
    for line in folded.lines() {
        let Some(caps) = CONFIDENCE_LABEL.captures(line) else {
            continue;
        };
        labelled = true;

        let Some(num) = LABELLED_NUMBER.captures(&caps["value"]) else {
            continue;
        };
        let value = parse_decimal(&num["num"]).map(|value| {
            if num.name("pct").is_some() {
                value / 100.0
            } else {
                value
            }
        });
        // An out-of-range label may be followed by a valid one.
        if let Some(value) = value.and_then(in_unit_range) {
            return Some(value);
        }
    }

    if labelled {
        return None;
    }

    let caps = LOOSE_CONFIDENCE.captures(&folded)?;
    let value = match (caps.name("pct"), caps.name("dec")) {
        (Some(pct), _) => parse_decimal(pct.as_str())? / 100.0,
        (None, Some(dec)) => parse_decimal(dec.as_str())?,
        (None, None) => return None,
    };
    in_unit_range(value)
}

/// Classify one line of folded text. Partial and negative phrasings are
/// checked first because they contain the positive keyword.
fn classify(text: &str) -> Option<CriterionStatus> {
    if PARTIAL_STATUS.is_match(text) {
        Some(CriterionStatus::PartiallyConformant)
    } else if NON_CONFORMANT_STATUS.is_match(text) {
        Some(CriterionStatus::NonConformant)
    } else if CONFORMANT_STATUS.is_match(text) {
        Some(CriterionStatus::Conformant)
    } else {
        None
    }
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.replace(',', ".").parse().ok()
}

fn in_unit_range(value: f64) -> Option<f64> {
    if (0.0..=1.0).contains(&value) {
        Some(value)
    } else {
        None
    }
}
