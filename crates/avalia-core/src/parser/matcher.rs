//! Assignment of extracted sections to requested criteria.
//!
//! Strategies run in a fixed order over whatever is still unassigned:
//! 1. Exact numeric: heading number equals the request's number, or its
//!    1-based position when the request carries none
//! 2. Fuzzy title: normalized title and name contain one another on word
//!    boundaries; first free section in document order wins
//! 3. Positional: the Nth section goes to the Nth request, then equal-sized
//!    leftovers pair up in order
//!
//! Every step is deterministic, so identical input yields identical output.

use crate::normalize::normalize_title;
use crate::types::{CriterionRequest, MatchKind};

use super::sections::Section;

/// Chosen section for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    /// Index into the extracted sections
    pub section: usize,
    pub kind: MatchKind,
}

/// Assign sections to requests. The result has one slot per request.
pub fn assign(sections: &[Section], requested: &[CriterionRequest]) -> Vec<Option<Assignment>> {
    let mut slots: Vec<Option<Assignment>> = vec![None; requested.len()];
    let mut taken = vec![false; sections.len()];

    assign_numeric(sections, requested, &mut slots, &mut taken);
    assign_fuzzy(sections, requested, &mut slots, &mut taken);
    assign_positional(sections, &mut slots, &mut taken);

    slots
}

fn assign_numeric(
    sections: &[Section],
    requested: &[CriterionRequest],
    slots: &mut [Option<Assignment>],
    taken: &mut [bool],
) {
    for (s, section) in sections.iter().enumerate() {
        let Some(index) = section.index() else {
            continue;
        };

        let target = requested.iter().enumerate().position(|(r, request)| {
            slots[r].is_none() && request_number(request, r) == Some(index)
        });

        if let Some(r) = target {
            slots[r] = Some(Assignment {
                section: s,
                kind: MatchKind::ExactNumeric,
            });
            taken[s] = true;
        }
    }
}

fn assign_fuzzy(
    sections: &[Section],
    requested: &[CriterionRequest],
    slots: &mut [Option<Assignment>],
    taken: &mut [bool],
) {
    let titles: Vec<String> = sections.iter().map(|s| normalize_title(&s.title)).collect();

    for (r, request) in requested.iter().enumerate() {
        if slots[r].is_some() {
            continue;
        }

        let name = normalize_title(&request.name);
        let found = titles
            .iter()
            .enumerate()
            .position(|(s, title)| !taken[s] && titles_overlap(title, &name));

        if let Some(s) = found {
            slots[r] = Some(Assignment {
                section: s,
                kind: MatchKind::FuzzyTitle,
            });
            taken[s] = true;
        }
    }
}

fn assign_positional(sections: &[Section], slots: &mut [Option<Assignment>], taken: &mut [bool]) {
    for r in 0..slots.len() {
        if slots[r].is_none() && r < sections.len() && !taken[r] {
            slots[r] = Some(Assignment {
                section: r,
                kind: MatchKind::Positional,
            });
            taken[r] = true;
        }
    }

    let free_sections: Vec<usize> = (0..sections.len()).filter(|&s| !taken[s]).collect();
    let free_slots: Vec<usize> = (0..slots.len()).filter(|&r| slots[r].is_none()).collect();

    if !free_sections.is_empty() && free_sections.len() == free_slots.len() {
        for (&r, &s) in free_slots.iter().zip(&free_sections) {
            slots[r] = Some(Assignment {
                section: s,
                kind: MatchKind::Positional,
            });
            taken[s] = true;
        }
    }
}

/// Number the prompt gave this criterion.
fn request_number(request: &CriterionRequest, position: usize) -> Option<u32> {
    request
        .number
        .or_else(|| u32::try_from(position + 1).ok())
}

/// Word-boundary containment in either direction. Both inputs must
/// already be normalized.
fn titles_overlap(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let a = format!(" {} ", a);
    let b = format!(" {} ", b);
    a.contains(&b) || b.contains(&a)
}
