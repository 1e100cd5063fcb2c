use std::fs;
use std::io::Write;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::{require_path, FingerprintError};

/// Deflate (zlib-wrapped) the whole file and base64-encode the result.
///
/// Reads the entire file into memory; intended for subtitle-sized inputs.
pub fn compressed_payload(path: impl AsRef<Path>) -> Result<String, FingerprintError> {
    let path = path.as_ref();
    require_path(path)?;

    let content = fs::read(path).map_err(|e| FingerprintError::io(path, e))?;

    let mut encoder =
        ZlibEncoder::new(Vec::with_capacity(content.len() / 2), Compression::default());
    encoder
        .write_all(&content)
        .and_then(|_| encoder.finish())
        .map(|compressed| BASE64.encode(compressed))
        .map_err(|e| FingerprintError::io(path, e))
}
