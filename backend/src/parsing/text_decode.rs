use crate::error::ReportError;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use std::path::Path;

/// Share of NUL bytes at one parity above which a BOM-less buffer is taken
/// for UTF-16.
const UTF16_NUL_RATIO: f64 = 0.3;

/// Reads an instrument export and decodes it to a `String`.
pub fn read_instrument_text(path: &Path) -> Result<String, ReportError> {
    let bytes = std::fs::read(path).map_err(|e| ReportError::io(path, e))?;
    Ok(decode_instrument_bytes(&bytes))
}

/// Decodes export bytes: UTF-16 when a BOM or the NUL-byte layout says so,
/// UTF-8 otherwise. Undecodable sequences are replaced, never rejected.
pub fn decode_instrument_bytes(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text.into_owned();
    }

    let encoding = match utf16_layout(bytes) {
        Some(encoding) => encoding,
        None => UTF_8,
    };
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        log::debug!("Replaced malformed {} sequences in export", encoding.name());
    }
    text.into_owned()
}

/// Detects BOM-less UTF-16 from the position of NUL bytes: ASCII-heavy
/// exports put a NUL in every second byte.
fn utf16_layout(bytes: &[u8]) -> Option<&'static Encoding> {
    if bytes.len() < 2 {
        return None;
    }
    let pairs = bytes.len() / 2;
    let (mut even_nul, mut odd_nul) = (0usize, 0usize);
    for pair in bytes.chunks_exact(2) {
        if pair[0] == 0 {
            even_nul += 1;
        }
        if pair[1] == 0 {
            odd_nul += 1;
        }
    }
    let ratio = |count: usize| count as f64 / pairs as f64;
    if ratio(odd_nul) > UTF16_NUL_RATIO && odd_nul > even_nul {
        Some(UTF_16LE)
    } else if ratio(even_nul) > UTF16_NUL_RATIO && even_nul > odd_nul {
        Some(UTF_16BE)
    } else {
        None
    }
}
