//! Merging of per-tier responses and deduplication by subtitle id.

use std::collections::HashSet;

use super::planner::TierKind;
use super::types::{Candidate, TierResponse};

/// Candidates merged across tiers, with drop counts.
#[derive(Debug, Default)]
pub struct MergedCandidates {
    /// Unique candidates with the tier that first returned them.
    pub candidates: Vec<(TierKind, Candidate)>,
    pub malformed: usize,
    pub duplicates: usize,
}

/// Flatten tier responses in tier priority order and deduplicate by id.
///
/// Responses are merged by tier priority, not by the order they are given
/// in, so the first copy of a duplicated id always comes from the most
/// specific tier. Records missing a required field are counted and skipped.
pub fn merge_tiers(mut responses: Vec<TierResponse>) -> MergedCandidates {
    // Stable: tiers of the same kind keep their relative order.
    responses.sort_by_key(|r| r.tier);

    let mut merged = MergedCandidates::default();
    let mut seen: HashSet<String> = HashSet::new();

    for response in responses {
        for raw in response.candidates {
            let candidate = match Candidate::try_from(raw) {
                Ok(c) => c,
                Err(_) => {
                    merged.malformed += 1;
                    continue;
                }
            };

            if seen.insert(candidate.id.clone()) {
                merged.candidates.push((response.tier, candidate));
            } else {
                merged.duplicates += 1;
            }
        }
    }

    merged
}
