use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::fingerprint::{DigestAlgorithm, DEFAULT_BUFFER_SIZE};
use crate::search::{default_extensions, ResultLimit};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchDefaults,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub fingerprint: FingerprintConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Defaults for search requests that leave these fields out.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchDefaults {
    /// Language codes; empty means all.
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub limit: ResultLimit,
    #[serde(default)]
    pub gzip: bool,
    /// Skip failed tiers instead of failing the search.
    /// The search still fails when every tier fails.
    #[serde(default)]
    pub partial_results: bool,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            languages: Vec::new(),
            extensions: default_extensions(),
            limit: ResultLimit::default(),
            gzip: false,
            partial_results: false,
        }
    }
}

/// Scoring weights, in points.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScoringConfig {
    /// Movie hash or byte size matches the submitted fingerprint.
    #[serde(default = "default_identity_bonus")]
    pub identity_bonus: f64,
    /// Upper bound of the file name token-overlap bonus.
    #[serde(default = "default_tag_weight")]
    pub tag_weight: f64,
    #[serde(default = "default_fps_bonus")]
    pub fps_bonus: f64,
    /// Trusted uploaders and administrators.
    #[serde(default = "default_trusted_bonus")]
    pub trusted_bonus: f64,
    /// Platinum and gold members.
    #[serde(default = "default_member_bonus")]
    pub member_bonus: f64,
    /// Below this many file name tokens, no tag bonus is given.
    #[serde(default = "default_min_tag_tokens")]
    pub min_tag_tokens: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            identity_bonus: default_identity_bonus(),
            tag_weight: default_tag_weight(),
            fps_bonus: default_fps_bonus(),
            trusted_bonus: default_trusted_bonus(),
            member_bonus: default_member_bonus(),
            min_tag_tokens: default_min_tag_tokens(),
        }
    }
}

fn default_identity_bonus() -> f64 {
    9.0
}

fn default_tag_weight() -> f64 {
    7.0
}

fn default_fps_bonus() -> f64 {
    1.0
}

fn default_trusted_bonus() -> f64 {
    0.5
}

fn default_member_bonus() -> f64 {
    0.2
}

fn default_min_tag_tokens() -> usize {
    3
}

/// Fingerprinter configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FingerprintConfig {
    /// Algorithm for whole-file content digests.
    #[serde(default)]
    pub digest: DigestAlgorithm,
    /// Read buffer for streaming digests, in bytes.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            digest: DigestAlgorithm::default(),
            buffer_size: default_buffer_size(),
        }
    }
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}
