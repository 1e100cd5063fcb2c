//! Types for the subtitle search system.

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::ops::{Add, AddAssign};
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::planner::TierKind;
use crate::fingerprint::FileFingerprint;

/// Timestamp format used by the subtitle service.
const ADDED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// Search criteria
// ============================================================================

/// A loose, partially specified description of the video to find subtitles for.
///
/// At least one of `fingerprint`, `path`, `filename`, `imdb_id` or `query`
/// must be set for a search to be planned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Precomputed fingerprint; takes precedence over `path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<FileFingerprint>,
    /// Local video file; fingerprinted on demand when no fingerprint is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Video file name. Derived from `path` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// IMDb id, accepted as `tt0133093` or `133093`.
    #[serde(
        default,
        deserialize_with = "loose_imdb_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub imdb_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    /// Free-text query; only used when nothing more specific is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Language codes; empty means all languages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    /// Accepted subtitle formats.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Frame rate of the video, kept as written (`"25.000"` stays `"25.000"`).
    /// Numbers are accepted too.
    #[serde(
        default,
        deserialize_with = "loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub fps: Option<String>,
    #[serde(default)]
    pub limit: ResultLimit,
    /// Keep `.gz` download links instead of plain ones.
    #[serde(default)]
    pub gzip: bool,
}

pub(crate) fn default_extensions() -> Vec<String> {
    vec!["srt".to_string()]
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            fingerprint: None,
            path: None,
            filename: None,
            imdb_id: None,
            season: None,
            episode: None,
            query: None,
            languages: Vec::new(),
            extensions: default_extensions(),
            fps: None,
            limit: ResultLimit::default(),
            gzip: false,
        }
    }
}

impl SearchCriteria {
    /// File name to match against: the explicit one, else the path's base name.
    pub fn resolved_filename(&self) -> Option<String> {
        if let Some(name) = self.filename.as_deref().filter(|n| !n.trim().is_empty()) {
            return Some(name.to_string());
        }
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
    }

    /// Path to fingerprint, if one was given and is non-empty.
    pub fn video_path(&self) -> Option<&PathBuf> {
        self.path.as_ref().filter(|p| !p.as_os_str().is_empty())
    }

    /// Season and episode, only when both are set.
    pub fn episode_ref(&self) -> Option<EpisodeRef> {
        match (self.season, self.episode) {
            (Some(season), Some(episode)) => Some(EpisodeRef { season, episode }),
            _ => None,
        }
    }

    /// Trimmed free-text query, if non-empty.
    pub fn free_text(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn language_filter(&self) -> LanguageFilter {
        LanguageFilter::from_codes(&self.languages)
    }

    /// Case-insensitive check against `extensions` (`srt` when empty).
    pub fn accepts_format(&self, format: &str) -> bool {
        let format = format.trim();
        if self.extensions.is_empty() {
            return format.eq_ignore_ascii_case("srt");
        }
        self.extensions
            .iter()
            .any(|ext| ext.trim().trim_start_matches('.').eq_ignore_ascii_case(format))
    }
}

/// Season/episode pair of a TV episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub season: u32,
    pub episode: u32,
}

/// Parse an IMDb id given as `tt0133093`, `0133093` or `133093`.
pub fn parse_imdb_id(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("tt")
        .or_else(|| trimmed.strip_prefix("TT"))
        .unwrap_or(trimmed);
    digits.parse::<u32>().ok().filter(|id| *id > 0)
}

// ============================================================================
// Language filter
// ============================================================================

/// Languages requested from the backend, rendered as `all` or `eng,fre`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum LanguageFilter {
    #[default]
    All,
    Only(Vec<String>),
}

impl LanguageFilter {
    /// Normalize codes: trimmed, lowercased, de-duplicated in order.
    /// No codes, or an explicit `all`, means all languages.
    pub fn from_codes<S: AsRef<str>>(codes: &[S]) -> Self {
        let mut seen = Vec::new();
        for code in codes {
            for part in code.as_ref().split(',') {
                let part = part.trim().to_lowercase();
                if part.is_empty() {
                    continue;
                }
                if part == "all" {
                    return Self::All;
                }
                if !seen.contains(&part) {
                    seen.push(part);
                }
            }
        }

        if seen.is_empty() {
            Self::All
        } else {
            Self::Only(seen)
        }
    }
}

impl fmt::Display for LanguageFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Only(codes) => write!(f, "{}", codes.join(",")),
        }
    }
}

impl Serialize for LanguageFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LanguageFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_codes(&[raw]))
    }
}

// ============================================================================
// Result limit
// ============================================================================

/// How many results to keep per language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultLimit {
    /// Only the best result, returned as a single item.
    #[default]
    Best,
    /// Every result, sorted.
    All,
    /// At most N results, sorted.
    Top(NonZeroUsize),
}

impl ResultLimit {
    /// Parse `best`, `all` or a positive integer. Anything else is `Best`.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("all") {
            return Self::All;
        }
        value
            .parse::<usize>()
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self::Top)
            .unwrap_or(Self::Best)
    }
}

impl From<usize> for ResultLimit {
    fn from(n: usize) -> Self {
        NonZeroUsize::new(n).map(Self::Top).unwrap_or(Self::Best)
    }
}

impl fmt::Display for ResultLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Best => write!(f, "best"),
            Self::All => write!(f, "all"),
            Self::Top(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for ResultLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Top(n) => serializer.serialize_u64(n.get() as u64),
            other => serializer.collect_str(other),
        }
    }
}

impl<'de> Deserialize<'de> for ResultLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Loose::deserialize(deserializer)? {
            Loose::Int(n) if n > 0 => Self::from(n as usize),
            Loose::Text(s) => Self::parse(&s),
            _ => Self::Best,
        })
    }
}

// ============================================================================
// Candidates
// ============================================================================

/// A subtitle record exactly as the backend returns it.
///
/// Every field is optional; [`Candidate::try_from`] decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    #[serde(rename = "IDSubtitle", default, deserialize_with = "loose_string")]
    pub id_subtitle: Option<String>,
    #[serde(rename = "IDSubtitleFile", default, deserialize_with = "loose_string")]
    pub id_subtitle_file: Option<String>,
    #[serde(rename = "ISO639", default, deserialize_with = "loose_string")]
    pub iso639: Option<String>,
    #[serde(rename = "LanguageName", default, deserialize_with = "loose_string")]
    pub language_name: Option<String>,
    #[serde(rename = "SubDownloadsCnt", default, deserialize_with = "loose_string")]
    pub sub_downloads_cnt: Option<String>,
    #[serde(rename = "MovieReleaseName", default, deserialize_with = "loose_string")]
    pub movie_release_name: Option<String>,
    #[serde(rename = "SubFileName", default, deserialize_with = "loose_string")]
    pub sub_file_name: Option<String>,
    #[serde(rename = "SubFormat", default, deserialize_with = "loose_string")]
    pub sub_format: Option<String>,
    #[serde(rename = "SubEncoding", default, deserialize_with = "loose_string")]
    pub sub_encoding: Option<String>,
    #[serde(rename = "UserRank", default, deserialize_with = "loose_string")]
    pub user_rank: Option<String>,
    #[serde(rename = "MovieHash", default, deserialize_with = "loose_string")]
    pub movie_hash: Option<String>,
    #[serde(rename = "MovieByteSize", default, deserialize_with = "loose_string")]
    pub movie_byte_size: Option<String>,
    #[serde(rename = "MovieFPS", default, deserialize_with = "loose_string")]
    pub movie_fps: Option<String>,
    #[serde(rename = "IDMovieImdb", default, deserialize_with = "loose_string")]
    pub id_movie_imdb: Option<String>,
    #[serde(rename = "SeriesIMDBParent", default, deserialize_with = "loose_string")]
    pub series_imdb_parent: Option<String>,
    #[serde(rename = "SeriesSeason", default, deserialize_with = "loose_string")]
    pub series_season: Option<String>,
    #[serde(rename = "SeriesEpisode", default, deserialize_with = "loose_string")]
    pub series_episode: Option<String>,
    #[serde(rename = "SubDownloadLink", default, deserialize_with = "loose_string")]
    pub sub_download_link: Option<String>,
    #[serde(rename = "SubAddDate", default, deserialize_with = "loose_string")]
    pub sub_add_date: Option<String>,
}

/// Candidates returned by the backend for one tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierResponse {
    pub tier: TierKind,
    #[serde(default)]
    pub candidates: Vec<RawCandidate>,
}

/// A raw record lacking a field the pipeline cannot do without.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Candidate is missing required field {0}")]
pub struct MalformedCandidate(pub &'static str);

/// A validated subtitle candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique subtitle id; the deduplication key.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    /// Language code (ISO 639).
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_name: Option<String>,
    pub downloads: u64,
    pub release_name: String,
    pub file_name: String,
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    pub uploader_rank: String,
    /// Lowercase movie hash, unset when the backend reports `0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_byte_size: Option<u64>,
    /// Frame rate as reported, unset unless at least 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_imdb_id: Option<u32>,
    /// IMDb id of the parent series when the candidate is a TV episode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_imdb_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<NaiveDateTime>,
}

impl Candidate {
    /// The series id for episodes, otherwise the movie id.
    pub fn resolved_imdb_id(&self) -> Option<u32> {
        self.series_imdb_id.or(self.movie_imdb_id)
    }
}

impl TryFrom<RawCandidate> for Candidate {
    type Error = MalformedCandidate;

    fn try_from(raw: RawCandidate) -> Result<Self, Self::Error> {
        let id = non_empty(raw.id_subtitle).ok_or(MalformedCandidate("IDSubtitle"))?;
        let language = non_empty(raw.iso639).ok_or(MalformedCandidate("ISO639"))?;
        let format = non_empty(raw.sub_format).ok_or(MalformedCandidate("SubFormat"))?;
        let download_url =
            non_empty(raw.sub_download_link).ok_or(MalformedCandidate("SubDownloadLink"))?;

        Ok(Self {
            id,
            file_id: non_empty(raw.id_subtitle_file),
            language,
            language_name: non_empty(raw.language_name),
            downloads: parse_num(raw.sub_downloads_cnt.as_deref()).unwrap_or(0),
            release_name: raw.movie_release_name.unwrap_or_default(),
            file_name: raw.sub_file_name.unwrap_or_default(),
            format,
            encoding: non_empty(raw.sub_encoding),
            uploader_rank: raw.user_rank.unwrap_or_default(),
            movie_hash: non_empty(raw.movie_hash)
                .filter(|h| h != "0")
                .map(|h| h.to_ascii_lowercase()),
            movie_byte_size: parse_num::<u64>(raw.movie_byte_size.as_deref()).filter(|s| *s > 0),
            fps: non_empty(raw.movie_fps)
                .filter(|f| f.parse::<f64>().map(|v| v >= 1.0).unwrap_or(false)),
            movie_imdb_id: parse_num::<u32>(raw.id_movie_imdb.as_deref()).filter(|id| *id > 0),
            series_imdb_id: parse_num::<u32>(raw.series_imdb_parent.as_deref())
                .filter(|id| *id > 0),
            season: parse_num(raw.series_season.as_deref()),
            episode: parse_num(raw.series_episode.as_deref()),
            download_url,
            added_at: raw
                .sub_add_date
                .as_deref()
                .and_then(|d| NaiveDateTime::parse_from_str(d.trim(), ADDED_AT_FORMAT).ok()),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_num<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

// ============================================================================
// Scoring
// ============================================================================

/// Non-negative fixed-point score, stored in tenths of a point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(u32);

impl Score {
    pub const ZERO: Score = Score(0);

    pub const fn from_tenths(tenths: u32) -> Self {
        Self(tenths)
    }

    /// Round to the nearest tenth; negative and NaN inputs become zero.
    pub fn from_points(points: f64) -> Self {
        if points.is_nan() || points <= 0.0 {
            return Self::ZERO;
        }
        Self((points * 10.0).round().min(u32::MAX as f64) as u32)
    }

    pub const fn tenths(self) -> u32 {
        self.0
    }

    pub fn points(self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl Add for Score {
    type Output = Score;

    fn add(self, rhs: Score) -> Score {
        Score(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Score {
    fn add_assign(&mut self, rhs: Score) {
        *self = *self + rhs;
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.points())
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Self::from_points)
    }
}

/// The bonus that contributed most to a candidate's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Movie hash or byte size matched the submitted fingerprint.
    Identity,
    /// File name tokens overlapped.
    Tags,
    FrameRate,
    Uploader,
    /// No bonus applied.
    Unmatched,
}

/// A candidate with its score and derived download links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub score: Score,
    pub matched_by: MatchKind,
    /// Tier that first returned this candidate.
    pub tier: TierKind,
    /// Download link, `.gz` removed unless gzip was requested.
    pub url: String,
    pub utf8_url: String,
    pub vtt_url: String,
}

/// Scored candidates grouped by language code, in merge order.
pub type GroupedCandidates = BTreeMap<String, Vec<ScoredCandidate>>;

/// Per-language outcome of the result-count policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RankedEntry {
    Best(Box<ScoredCandidate>),
    List(Vec<ScoredCandidate>),
}

impl RankedEntry {
    /// The candidates held by this entry, best first.
    pub fn candidates(&self) -> &[ScoredCandidate] {
        match self {
            Self::Best(best) => std::slice::from_ref(best.as_ref()),
            Self::List(list) => list,
        }
    }

    pub fn as_best(&self) -> Option<&ScoredCandidate> {
        match self {
            Self::Best(best) => Some(best),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ScoredCandidate]> {
        match self {
            Self::Best(_) => None,
            Self::List(list) => Some(list),
        }
    }
}

/// Final search output keyed by language code.
pub type RankedResults = BTreeMap<String, RankedEntry>;

// ============================================================================
// Loose deserialization
// ============================================================================

/// The service sends numbers as strings and vice versa.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Loose {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => u8::from(b).to_string(),
        }
    }
}

fn loose_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Loose>::deserialize(deserializer)?.map(Loose::into_string))
}

fn loose_imdb_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(loose_string(deserializer)?.and_then(|s| parse_imdb_id(&s)))
}
