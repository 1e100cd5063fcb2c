//! Query planning: loose criteria to an ordered list of backend queries.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::types::{EpisodeRef, LanguageFilter, SearchCriteria};
use crate::fingerprint::{fingerprint, FingerprintError};
use crate::metrics::TIERS_PLANNED;

/// Errors that can occur while planning a search.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Search criteria need a fingerprint, path, filename, IMDb id or query")]
    InsufficientCriteria,

    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
}

/// One independently dispatched backend query, most specific first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryTier {
    /// Exact file identity.
    Fingerprint {
        digest: String,
        byte_size: u64,
        languages: LanguageFilter,
    },
    /// Release file name, sent as-is.
    Tag {
        filename: String,
        languages: LanguageFilter,
    },
    Imdb {
        imdb_id: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        episode: Option<EpisodeRef>,
        languages: LanguageFilter,
    },
    /// Last resort when nothing more specific is known.
    FreeText {
        query: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        episode: Option<EpisodeRef>,
        languages: LanguageFilter,
    },
}

impl QueryTier {
    pub fn kind(&self) -> TierKind {
        match self {
            Self::Fingerprint { .. } => TierKind::Fingerprint,
            Self::Tag { .. } => TierKind::Tag,
            Self::Imdb { .. } => TierKind::Imdb,
            Self::FreeText { .. } => TierKind::FreeText,
        }
    }

    pub fn languages(&self) -> &LanguageFilter {
        match self {
            Self::Fingerprint { languages, .. }
            | Self::Tag { languages, .. }
            | Self::Imdb { languages, .. }
            | Self::FreeText { languages, .. } => languages,
        }
    }
}

/// Tier discriminant. Ordering follows tier priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    Fingerprint,
    Tag,
    Imdb,
    FreeText,
}

impl TierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fingerprint => "fingerprint",
            Self::Tag => "tag",
            Self::Imdb => "imdb",
            Self::FreeText => "free_text",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the ordered query tiers for `criteria`.
///
/// Tiers are appended in priority order: fingerprint, tag, imdb. The
/// free-text tier is only built when none of those applies. When a path is
/// given without a fingerprint, the file is fingerprinted here, which blocks.
pub fn plan(criteria: &SearchCriteria) -> Result<Vec<QueryTier>, PlanError> {
    let languages = criteria.language_filter();
    let mut tiers = Vec::with_capacity(3);

    let file_fingerprint = match (&criteria.fingerprint, criteria.video_path()) {
        (Some(fp), _) => Some(fp.clone()),
        (None, Some(path)) => Some(fingerprint(path)?),
        (None, None) => None,
    };

    if let Some(fp) = file_fingerprint {
        tiers.push(QueryTier::Fingerprint {
            digest: fp.digest().to_string(),
            byte_size: fp.byte_size(),
            languages: languages.clone(),
        });
    }

    if let Some(filename) = criteria.resolved_filename() {
        tiers.push(QueryTier::Tag {
            filename,
            languages: languages.clone(),
        });
    }

    if let Some(imdb_id) = criteria.imdb_id.filter(|id| *id > 0) {
        tiers.push(QueryTier::Imdb {
            imdb_id,
            episode: criteria.episode_ref(),
            languages: languages.clone(),
        });
    }

    if tiers.is_empty() {
        if let Some(query) = criteria.free_text() {
            tiers.push(QueryTier::FreeText {
                query: query.to_string(),
                episode: criteria.episode_ref(),
                languages,
            });
        }
    }

    if tiers.is_empty() {
        return Err(PlanError::InsufficientCriteria);
    }

    for tier in &tiers {
        TIERS_PLANNED.with_label_values(&[tier.kind().as_str()]).inc();
        debug!(tier = %tier.kind(), languages = %tier.languages(), "Planned query tier");
    }

    Ok(tiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::FileFingerprint;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn kinds(tiers: &[QueryTier]) -> Vec<TierKind> {
        tiers.iter().map(QueryTier::kind).collect()
    }

    fn matrix_fingerprint() -> FileFingerprint {
        FileFingerprint::new("8e245d9679d31e12", 12_909_756).unwrap()
    }

    #[test]
    fn test_full_criteria_tier_order() {
        let criteria = SearchCriteria {
            fingerprint: Some(matrix_fingerprint()),
            filename: Some("Show.S02E05.720p.mkv".to_string()),
            imdb_id: Some(944_947),
            season: Some(2),
            episode: Some(5),
            query: Some("show".to_string()),
            ..Default::default()
        };

        let tiers = plan(&criteria).unwrap();
        assert_eq!(
            kinds(&tiers),
            vec![TierKind::Fingerprint, TierKind::Tag, TierKind::Imdb]
        );
        assert_eq!(
            tiers[2],
            QueryTier::Imdb {
                imdb_id: 944_947,
                episode: Some(EpisodeRef {
                    season: 2,
                    episode: 5
                }),
                languages: LanguageFilter::All,
            }
        );
    }

    #[test]
    fn test_free_text_only() {
        let criteria = SearchCriteria {
            query: Some("the matrix".to_string()),
            languages: vec!["eng".to_string()],
            ..Default::default()
        };

        let tiers = plan(&criteria).unwrap();
        assert_eq!(
            tiers,
            vec![QueryTier::FreeText {
                query: "the matrix".to_string(),
                episode: None,
                languages: LanguageFilter::Only(vec!["eng".to_string()]),
            }]
        );
    }

    #[test]
    fn test_specific_criteria_suppress_free_text() {
        let base = SearchCriteria {
            query: Some("the matrix".to_string()),
            ..Default::default()
        };

        let with_filename = SearchCriteria {
            filename: Some("The.Matrix.1999.mkv".to_string()),
            ..base.clone()
        };
        assert_eq!(kinds(&plan(&with_filename).unwrap()), vec![TierKind::Tag]);

        let with_imdb = SearchCriteria {
            imdb_id: Some(133_093),
            ..base.clone()
        };
        assert_eq!(kinds(&plan(&with_imdb).unwrap()), vec![TierKind::Imdb]);

        let with_fingerprint = SearchCriteria {
            fingerprint: Some(matrix_fingerprint()),
            ..base
        };
        assert_eq!(
            kinds(&plan(&with_fingerprint).unwrap()),
            vec![TierKind::Fingerprint]
        );
    }

    #[test]
    fn test_path_is_fingerprinted_and_named() {
        let mut file = tempfile::Builder::new()
            .prefix("The.Matrix.1999.")
            .suffix(".mkv")
            .tempfile()
            .unwrap();
        file.write_all(&[1, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        file.flush().unwrap();

        let criteria = SearchCriteria {
            path: Some(file.path().to_path_buf()),
            query: Some("ignored".to_string()),
            ..Default::default()
        };

        let tiers = plan(&criteria).unwrap();
        assert_eq!(kinds(&tiers), vec![TierKind::Fingerprint, TierKind::Tag]);
        match &tiers[0] {
            QueryTier::Fingerprint {
                digest, byte_size, ..
            } => {
                assert_eq!(digest, "000000000000000a");
                assert_eq!(*byte_size, 8);
            }
            other => panic!("unexpected tier: {:?}", other),
        }
        match &tiers[1] {
            QueryTier::Tag { filename, .. } => {
                assert!(filename.starts_with("The.Matrix.1999."));
                assert!(filename.ends_with(".mkv"));
            }
            other => panic!("unexpected tier: {:?}", other),
        }
    }

    #[test]
    fn test_supplied_fingerprint_skips_file_read() {
        // The path does not exist; the supplied fingerprint wins.
        let criteria = SearchCriteria {
            fingerprint: Some(matrix_fingerprint()),
            path: Some("/nonexistent/The.Matrix.mkv".into()),
            ..Default::default()
        };
        let tiers = plan(&criteria).unwrap();
        assert_eq!(kinds(&tiers), vec![TierKind::Fingerprint, TierKind::Tag]);
    }

    #[test]
    fn test_unreadable_path_fails() {
        let criteria = SearchCriteria {
            path: Some("/nonexistent/video.mkv".into()),
            ..Default::default()
        };
        match plan(&criteria) {
            Err(PlanError::Fingerprint(err)) => assert!(err.is_not_found()),
            other => panic!("expected fingerprint error, got {:?}", other),
        }
    }

    #[test]
    fn test_insufficient_criteria() {
        let criteria = SearchCriteria {
            season: Some(1),
            episode: Some(1),
            query: Some("   ".to_string()),
            languages: vec!["eng".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            plan(&criteria),
            Err(PlanError::InsufficientCriteria)
        ));
    }

    #[test]
    fn test_imdb_without_full_episode() {
        let criteria = SearchCriteria {
            imdb_id: Some(944_947),
            season: Some(2),
            ..Default::default()
        };
        let tiers = plan(&criteria).unwrap();
        assert!(matches!(tiers[0], QueryTier::Imdb { episode: None, .. }));
    }

    #[test]
    fn test_every_tier_carries_languages() {
        let criteria = SearchCriteria {
            fingerprint: Some(matrix_fingerprint()),
            filename: Some("The.Matrix.1999.mkv".to_string()),
            imdb_id: Some(133_093),
            languages: vec!["eng".to_string(), "fre".to_string()],
            ..Default::default()
        };
        let tiers = plan(&criteria).unwrap();
        assert_eq!(tiers.len(), 3);
        for tier in &tiers {
            assert_eq!(tier.languages().to_string(), "eng,fre");
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        let criteria = SearchCriteria {
            fingerprint: Some(matrix_fingerprint()),
            filename: Some("The.Matrix.1999.mkv".to_string()),
            imdb_id: Some(133_093),
            ..Default::default()
        };
        assert_eq!(plan(&criteria).unwrap(), plan(&criteria).unwrap());
    }

    #[test]
    fn test_tier_serialization() {
        let tier = QueryTier::Fingerprint {
            digest: "8e245d9679d31e12".to_string(),
            byte_size: 12_909_756,
            languages: LanguageFilter::All,
        };
        let json = serde_json::to_value(&tier).unwrap();
        assert_eq!(json["kind"], "fingerprint");
        assert_eq!(json["languages"], "all");

        let tier: QueryTier =
            serde_json::from_str(r#"{"kind": "free_text", "query": "matrix", "languages": "eng"}"#)
                .unwrap();
        assert_eq!(tier.kind(), TierKind::FreeText);
        assert!(TierKind::Fingerprint < TierKind::FreeText);
    }
}
