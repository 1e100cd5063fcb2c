pub mod config;
pub mod error;
pub mod fingerprint;
pub mod metrics;
pub mod search;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, FingerprintConfig,
    ScoringConfig, SearchDefaults, ServerConfig,
};
pub use error::ErrorKind;
pub use fingerprint::{
    compressed_payload, content_digest, content_digest_with_buffer, fingerprint, DigestAlgorithm,
    FileFingerprint, FingerprintError,
};
pub use search::{
    filter, plan, resolve_fingerprint, search, BackendError, Candidate, LanguageFilter, MatchKind,
    PlanError, QueryTier, RankedEntry, RankedResults, RawCandidate, ResultLimit, Score,
    ScoredCandidate, Scorer, SearchBackend, SearchCriteria, SearchError, SubtitleSearch, TierKind,
    TierResponse,
};
