//! Size + boundary checksum ("moviehash").

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{require_path, FingerprintError};
use crate::metrics::FINGERPRINTS_TOTAL;

/// Bytes read from each end of the file.
pub const CHUNK_SIZE: usize = 128 * 1024;

const WORD: usize = std::mem::size_of::<u64>();

/// Content fingerprint of a file: 64-bit checksum plus byte size.
///
/// The digest is always 16 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawFingerprint")]
pub struct FileFingerprint {
    digest: String,
    byte_size: u64,
}

#[derive(Deserialize)]
struct RawFingerprint {
    digest: String,
    byte_size: u64,
}

impl TryFrom<RawFingerprint> for FileFingerprint {
    type Error = FingerprintError;

    fn try_from(raw: RawFingerprint) -> Result<Self, Self::Error> {
        Self::new(&raw.digest, raw.byte_size)
    }
}

impl FileFingerprint {
    /// Build a fingerprint from a caller-supplied digest.
    ///
    /// Accepts upper- or lowercase hex; shorter digests are zero-padded.
    pub fn new(digest: &str, byte_size: u64) -> Result<Self, FingerprintError> {
        let trimmed = digest.trim();
        if trimmed.is_empty()
            || trimmed.len() > 16
            || !trimmed.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(FingerprintError::InvalidDigest(digest.to_string()));
        }

        Ok(Self {
            digest: format!("{:0>16}", trimmed.to_ascii_lowercase()),
            byte_size,
        })
    }

    fn from_checksum(checksum: u64, byte_size: u64) -> Self {
        Self {
            digest: format!("{:016x}", checksum),
            byte_size,
        }
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }
}

/// Compute the fingerprint of the file at `path`.
///
/// The checksum is the file size plus every little-endian 64-bit word of the
/// first and last [`CHUNK_SIZE`] bytes, summed with wraparound. Files shorter
/// than two chunks have overlapping ranges, so some bytes are counted twice.
/// Short reads are zero-padded to the full chunk.
pub fn fingerprint(path: impl AsRef<Path>) -> Result<FileFingerprint, FingerprintError> {
    let path = path.as_ref();
    require_path(path)?;

    let result = compute(path);
    let status = if result.is_ok() { "success" } else { "error" };
    FINGERPRINTS_TOTAL.with_label_values(&[status]).inc();

    if let Ok(fp) = &result {
        debug!(
            path = %path.display(),
            digest = fp.digest(),
            byte_size = fp.byte_size(),
            "Fingerprinted file"
        );
    }
    result
}

fn compute(path: &Path) -> Result<FileFingerprint, FingerprintError> {
    let mut file = File::open(path).map_err(|e| FingerprintError::io(path, e))?;
    let size = file
        .metadata()
        .map_err(|e| FingerprintError::io(path, e))?
        .len();

    let mut head = vec![0u8; CHUNK_SIZE];
    read_chunk(&mut file, 0, &mut head).map_err(|e| FingerprintError::io(path, e))?;

    let mut tail = vec![0u8; CHUNK_SIZE];
    let tail_offset = size.saturating_sub(CHUNK_SIZE as u64);
    read_chunk(&mut file, tail_offset, &mut tail).map_err(|e| FingerprintError::io(path, e))?;

    Ok(FileFingerprint::from_checksum(
        checksum(size, &head, &tail),
        size,
    ))
}

/// Fill `buf` from `offset` until it is full or the file ends.
fn read_chunk(file: &mut File, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(())
}

/// Seed with `size`, then add every 8-byte LE word of both ranges mod 2^64.
///
/// A trailing partial word is zero-padded.
pub fn checksum(size: u64, head: &[u8], tail: &[u8]) -> u64 {
    [head, tail]
        .iter()
        .flat_map(|range| range.chunks(WORD))
        .fold(size, |acc, chunk| {
            let mut word = [0u8; WORD];
            word[..chunk.len()].copy_from_slice(chunk);
            acc.wrapping_add(u64::from_le_bytes(word))
        })
}
