//! Candidate scoring.
//!
//! The scorer merges per-tier responses, drops what the criteria exclude and
//! assigns each survivor a score built from independent bonuses:
//!
//! | bonus    | condition                                            |
//! |----------|------------------------------------------------------|
//! | identity | movie hash or byte size matches the fingerprint      |
//! | tags     | file name token overlap (only without identity)      |
//! | fps      | one frame rate string is a prefix of the other       |
//! | uploader | trusted/administrator, else platinum/gold member     |
//!
//! Scoring never touches the filesystem: a path without a fingerprint
//! contributes only its file name.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::warn;

use super::dedup::merge_tiers;
use super::normalize::tokenize;
use super::planner::TierKind;
use super::types::{
    Candidate, GroupedCandidates, MatchKind, Score, ScoredCandidate, SearchCriteria, TierResponse,
};
use crate::config::ScoringConfig;
use crate::fingerprint::FileFingerprint;
use crate::metrics::{CANDIDATES_DROPPED, CANDIDATES_SCORED};

static TRUSTED_RANK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)trusted|administrator").unwrap());
static MEMBER_RANK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)platinum member|gold member").unwrap());

/// Scores candidates against search criteria.
#[derive(Debug, Clone)]
pub struct Scorer {
    identity_bonus: Score,
    tag_weight: Score,
    fps_bonus: Score,
    trusted_bonus: Score,
    member_bonus: Score,
    min_tag_tokens: usize,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-search values derived once from the criteria.
struct ScoringContext<'a> {
    fingerprint: Option<&'a FileFingerprint>,
    tokens: Vec<String>,
    fps: Option<String>,
}

impl<'a> ScoringContext<'a> {
    fn new(criteria: &'a SearchCriteria) -> Self {
        Self {
            fingerprint: criteria.fingerprint.as_ref(),
            tokens: criteria
                .resolved_filename()
                .map(|name| tokenize(&name))
                .unwrap_or_default(),
            fps: criteria
                .fps
                .as_deref()
                .map(str::trim)
                .filter(|fps| {
                    fps.parse::<f64>()
                        .map(|v| v.is_finite() && v >= 1.0)
                        .unwrap_or(false)
                })
                .map(str::to_string),
        }
    }
}

impl Scorer {
    /// Scorer with the default weights.
    pub fn new() -> Self {
        Self::with_config(&ScoringConfig::default())
    }

    pub fn with_config(config: &ScoringConfig) -> Self {
        Self {
            identity_bonus: Score::from_points(config.identity_bonus),
            tag_weight: Score::from_points(config.tag_weight),
            fps_bonus: Score::from_points(config.fps_bonus),
            trusted_bonus: Score::from_points(config.trusted_bonus),
            member_bonus: Score::from_points(config.member_bonus),
            min_tag_tokens: config.min_tag_tokens.max(1),
        }
    }

    /// Merge, filter and score tier responses, grouped by language code.
    ///
    /// Groups keep merge order; sorting is left to the result filter.
    pub fn score(
        &self,
        responses: Vec<TierResponse>,
        criteria: &SearchCriteria,
    ) -> GroupedCandidates {
        let merged = merge_tiers(responses);
        if merged.malformed > 0 {
            warn!(count = merged.malformed, "Dropped malformed candidates");
            CANDIDATES_DROPPED
                .with_label_values(&["malformed"])
                .inc_by(merged.malformed as u64);
        }
        if merged.duplicates > 0 {
            CANDIDATES_DROPPED
                .with_label_values(&["duplicate"])
                .inc_by(merged.duplicates as u64);
        }

        let context = ScoringContext::new(criteria);
        let mut grouped = GroupedCandidates::new();
        let mut scored_count = 0u64;

        for (tier, candidate) in merged.candidates {
            if let Some(reason) = exclusion(&candidate, criteria) {
                CANDIDATES_DROPPED.with_label_values(&[reason]).inc();
                continue;
            }

            let scored = self.score_one(candidate, tier, &context, criteria.gzip);
            scored_count += 1;
            grouped
                .entry(scored.candidate.language.clone())
                .or_default()
                .push(scored);
        }

        CANDIDATES_SCORED.observe(scored_count as f64);
        grouped
    }

    fn score_one(
        &self,
        candidate: Candidate,
        tier: TierKind,
        context: &ScoringContext<'_>,
        gzip: bool,
    ) -> ScoredCandidate {
        let mut bonuses: Vec<(MatchKind, Score)> = Vec::with_capacity(3);

        if self.identity_matches(&candidate, context) {
            bonuses.push((MatchKind::Identity, self.identity_bonus));
        } else {
            let tags = self.tag_bonus(&candidate, context);
            if tags > Score::ZERO {
                bonuses.push((MatchKind::Tags, tags));
            }
        }

        if fps_matches(&candidate, context) {
            bonuses.push((MatchKind::FrameRate, self.fps_bonus));
        }

        let uploader = self.uploader_bonus(&candidate.uploader_rank);
        if uploader > Score::ZERO {
            bonuses.push((MatchKind::Uploader, uploader));
        }

        let score = bonuses
            .iter()
            .fold(Score::ZERO, |total, (_, bonus)| total + *bonus);

        // Highest bonus wins; on a tie the earlier kind is kept.
        let mut matched_by = MatchKind::Unmatched;
        let mut best = Score::ZERO;
        for (kind, bonus) in bonuses {
            if bonus > best {
                best = bonus;
                matched_by = kind;
            }
        }

        let links = DownloadLinks::derive(&candidate.download_url, gzip);
        ScoredCandidate {
            candidate,
            score,
            matched_by,
            tier,
            url: links.url,
            utf8_url: links.utf8_url,
            vtt_url: links.vtt_url,
        }
    }

    fn identity_matches(&self, candidate: &Candidate, context: &ScoringContext<'_>) -> bool {
        let Some(fp) = context.fingerprint else {
            return false;
        };
        let hash_matches = candidate.movie_hash.as_deref() == Some(fp.digest());
        let size_matches = fp.byte_size() > 0 && candidate.movie_byte_size == Some(fp.byte_size());
        hash_matches || size_matches
    }

    /// `floor(matched / submitted * tag_weight)` in whole points.
    fn tag_bonus(&self, candidate: &Candidate, context: &ScoringContext<'_>) -> Score {
        let submitted = context.tokens.len();
        if submitted < self.min_tag_tokens {
            return Score::ZERO;
        }

        let names = format!("{}_{}", candidate.release_name, candidate.file_name);
        let candidate_tokens = tokenize(&names);
        if candidate_tokens.is_empty() {
            return Score::ZERO;
        }

        let matched = context
            .tokens
            .iter()
            .filter(|token| candidate_tokens.contains(token))
            .count();

        let points = (matched as u64 * self.tag_weight.tenths() as u64) / (submitted as u64 * 10);
        Score::from_tenths((points * 10) as u32)
    }

    fn uploader_bonus(&self, rank: &str) -> Score {
        if TRUSTED_RANK.is_match(rank) {
            self.trusted_bonus
        } else if MEMBER_RANK.is_match(rank) {
            self.member_bonus
        } else {
            Score::ZERO
        }
    }
}

/// Why a candidate is excluded by the criteria, if it is.
fn exclusion(candidate: &Candidate, criteria: &SearchCriteria) -> Option<&'static str> {
    if !criteria.accepts_format(&candidate.format) {
        return Some("format");
    }

    if let Some(imdb_id) = criteria.imdb_id.filter(|id| *id > 0) {
        if candidate.resolved_imdb_id() != Some(imdb_id) {
            return Some("imdb");
        }
    }

    if let Some(wanted) = criteria.episode_ref() {
        if candidate.season != Some(wanted.season) || candidate.episode != Some(wanted.episode) {
            return Some("episode");
        }
    }

    None
}

fn fps_matches(candidate: &Candidate, context: &ScoringContext<'_>) -> bool {
    match (context.fps.as_deref(), candidate.fps.as_deref()) {
        (Some(submitted), Some(theirs)) => {
            theirs.starts_with(submitted) || submitted.starts_with(theirs)
        }
        _ => false,
    }
}

/// Download links derived from the service's `.gz` link.
struct DownloadLinks {
    url: String,
    utf8_url: String,
    vtt_url: String,
}

impl DownloadLinks {
    fn derive(link: &str, gzip: bool) -> Self {
        let plain = link.strip_suffix(".gz").unwrap_or(link);
        let url = if gzip { link } else { plain };

        Self {
            url: url.to_string(),
            utf8_url: url.replacen("download/", "download/subencoding-utf8/", 1),
            vtt_url: plain.replacen("download/", "download/subformat-vtt/", 1),
        }
    }
}
