//! Streaming whole-file digests.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{require_path, FingerprintError};

/// Default read buffer for streaming digests.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Hash algorithm used for whole-file digests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// Collision resistant; the default.
    #[default]
    Sha256,
    /// What the subtitle service uses to identify subtitle files.
    Md5,
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => write!(f, "sha256"),
            Self::Md5 => write!(f, "md5"),
        }
    }
}

/// Lowercase hex digest of the whole file, read incrementally.
pub fn content_digest(
    path: impl AsRef<Path>,
    algorithm: DigestAlgorithm,
) -> Result<String, FingerprintError> {
    content_digest_with_buffer(path, algorithm, DEFAULT_BUFFER_SIZE)
}

/// Same as [`content_digest`] with an explicit read buffer size.
pub fn content_digest_with_buffer(
    path: impl AsRef<Path>,
    algorithm: DigestAlgorithm,
    buffer_size: usize,
) -> Result<String, FingerprintError> {
    let path = path.as_ref();
    require_path(path)?;

    let mut file = File::open(path).map_err(|e| FingerprintError::io(path, e))?;
    let mut buffer = vec![0u8; buffer_size.max(1)];

    match algorithm {
        DigestAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            stream(path, &mut file, &mut buffer, |chunk| hasher.update(chunk))?;
            Ok(format!("{:x}", hasher.finalize()))
        }
        DigestAlgorithm::Md5 => {
            let mut context = md5::Context::new();
            stream(path, &mut file, &mut buffer, |chunk| context.consume(chunk))?;
            Ok(format!("{:x}", context.compute()))
        }
    }
}

fn stream<R: Read>(
    path: &Path,
    reader: &mut R,
    buffer: &mut [u8],
    mut sink: impl FnMut(&[u8]),
) -> Result<(), FingerprintError> {
    loop {
        let bytes_read = reader
            .read(buffer)
            .map_err(|e| FingerprintError::io(path, e))?;
        if bytes_read == 0 {
            return Ok(());
        }
        sink(&buffer[..bytes_read]);
    }
}
