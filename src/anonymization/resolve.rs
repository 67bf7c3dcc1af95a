//! Overlap resolution for recognizer results
//!
//! Recognizers run independently, so their spans may overlap. Before
//! substitution every region of the text must belong to at most one match.
//!
//! Candidates are ranked by score (desc), span length (desc), start (asc),
//! label (asc) and recognizer name (asc), then accepted greedily when they
//! overlap nothing already accepted. The ranking is total, so the outcome
//! does not depend on recognizer order.

use crate::anonymization::models::EntityMatch;
use std::cmp::Ordering;

/// Keep a non-overlapping subset of matches, sorted by start offset
///
/// Zero-length, inverted and out-of-range spans are discarded, as are spans
/// whose offsets do not fall on `char` boundaries of `text`. Each kept
/// match carries the exact slice of `text` at its offsets.
pub fn resolve_overlaps(text: &str, matches: Vec<EntityMatch>) -> Vec<EntityMatch> {
    let mut candidates: Vec<EntityMatch> = matches
        .into_iter()
        .filter(|m| is_valid_span(text, m))
        .map(|m| m.anchored_to(text))
        .collect();

    candidates.sort_by(rank);

    let mut accepted: Vec<EntityMatch> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if accepted.iter().any(|a| a.overlaps(&candidate)) {
            tracing::trace!(
                label = %candidate.label(),
                recognizer = candidate.recognizer(),
                start = candidate.start(),
                end = candidate.end(),
                "Overlapping span discarded"
            );
            continue;
        }
        accepted.push(candidate);
    }

    accepted.sort_by_key(EntityMatch::start);
    accepted
}

fn is_valid_span(text: &str, m: &EntityMatch) -> bool {
    m.start() < m.end()
        && m.end() <= text.len()
        && text.is_char_boundary(m.start())
        && text.is_char_boundary(m.end())
}

fn rank(a: &EntityMatch, b: &EntityMatch) -> Ordering {
    b.score()
        .total_cmp(&a.score())
        .then_with(|| b.len().cmp(&a.len()))
        .then_with(|| a.start().cmp(&b.start()))
        .then_with(|| a.label().cmp(b.label()))
        .then_with(|| a.recognizer().cmp(b.recognizer()))
}
