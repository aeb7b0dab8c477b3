//! Priority-ordered candidate selection.

use std::sync::Arc;

use crate::group::candidate::Candidate;

/// Find the first valid candidate at or after `start`.
///
/// Scanning stops at the end of the slice; it never wraps back to index 0,
/// so a lower index always wins over a higher one when both are valid.
pub fn find_valid_from(candidates: &[Arc<Candidate>], start: usize) -> Option<(usize, &Arc<Candidate>)> {
    candidates
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, c)| c.is_valid())
}
