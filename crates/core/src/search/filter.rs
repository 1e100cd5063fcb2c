//! Per-language sorting and result-count policy.

use super::types::{GroupedCandidates, RankedEntry, RankedResults, ResultLimit};

/// Sort each language group and apply `limit`.
///
/// Groups are sorted by score, then downloads, both descending. The sort is
/// stable, so remaining ties keep merge order. Empty groups are omitted.
pub fn filter(grouped: GroupedCandidates, limit: ResultLimit) -> RankedResults {
    let mut ranked = RankedResults::new();

    for (language, mut group) in grouped {
        group.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.candidate.downloads.cmp(&a.candidate.downloads))
        });

        let entry = match limit {
            ResultLimit::Best => match group.into_iter().next() {
                Some(best) => RankedEntry::Best(Box::new(best)),
                None => continue,
            },
            ResultLimit::All => RankedEntry::List(group),
            ResultLimit::Top(n) => {
                group.truncate(n.get());
                RankedEntry::List(group)
            }
        };

        if entry.candidates().is_empty() {
            continue;
        }
        ranked.insert(language, entry);
    }

    ranked
}
