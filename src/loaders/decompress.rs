use std::borrow::Cow;
use std::io::Read;

use flate2::read::GzDecoder;

use crate::error::LoadError;

/// Leading bytes of every gzip stream
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Returns true when the payload starts with the gzip signature
pub fn is_gzipped(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Inflates gzip payloads and passes everything else through borrowed.
///
/// A payload that carries the signature but fails to inflate is an error;
/// it is never reinterpreted as raw bytes.
pub fn maybe_decompress(bytes: &[u8]) -> Result<Cow<'_, [u8]>, LoadError> {
    if !is_gzipped(bytes) {
        return Ok(Cow::Borrowed(bytes));
    }

    let mut inflated = Vec::with_capacity(bytes.len() * 4);
    GzDecoder::new(bytes)
        .read_to_end(&mut inflated)
        .map_err(LoadError::Decompression)?;

    Ok(Cow::Owned(inflated))
}
