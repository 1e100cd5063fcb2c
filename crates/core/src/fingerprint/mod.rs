//! File fingerprinting.
//!
//! Three independent operations over a file on disk:
//! - [`fingerprint`]: the size + boundary-checksum identifier the subtitle
//!   service uses to recognise a video without receiving it.
//! - [`content_digest`]: a streaming whole-file cryptographic digest.
//! - [`compressed_payload`]: zlib-deflated, base64-encoded file content,
//!   meant for small text files such as subtitles.
//!
//! All of them are blocking; run them on a blocking thread from async code.

mod digest;
mod moviehash;
mod payload;

pub use digest::{
    content_digest, content_digest_with_buffer, DigestAlgorithm, DEFAULT_BUFFER_SIZE,
};
pub use moviehash::{checksum, fingerprint, FileFingerprint, CHUNK_SIZE};
pub use payload::compressed_payload;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::ErrorKind;

/// Errors that can occur while fingerprinting files.
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Missing path")]
    MissingPath,

    #[error("Invalid fingerprint digest: {0:?} (expected 16 hex characters)")]
    InvalidDigest(String),
}

impl FingerprintError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True when the underlying failure is a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::Io,
            Self::MissingPath | Self::InvalidDigest(_) => ErrorKind::Validation,
        }
    }
}

/// Reject empty paths before touching the filesystem.
fn require_path(path: &Path) -> Result<(), FingerprintError> {
    if path.as_os_str().is_empty() {
        return Err(FingerprintError::MissingPath);
    }
    Ok(())
}
