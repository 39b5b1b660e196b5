//! Best-effort decoding of legacy text payloads
//!
//! MSG bodies and `.doc` streams arrive as UTF-16 with or without a BOM,
//! or as arbitrary binary with readable ASCII embedded. Decoding tries the
//! cheapest certain signal first (BOM), then a zero-byte-ratio heuristic,
//! then gives up so the caller can fall back to ASCII salvage.

use encoding_rs::{UTF_16BE, UTF_16LE};

/// Fraction of zero bytes on alternating positions that marks a payload
/// as likely UTF-16 without a BOM.
const ZERO_RATIO_THRESHOLD: f64 = 0.30;

fn non_empty(decoded: std::borrow::Cow<'_, str>) -> Option<String> {
    let trimmed = decoded.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn zero_ratio(data: &[u8], start: usize) -> f64 {
    let mut zeros = 0usize;
    let mut slots = 0usize;
    let mut i = start;
    while i < data.len() {
        slots += 1;
        if data[i] == 0 {
            zeros += 1;
        }
        i += 2;
    }
    if slots == 0 {
        0.0
    } else {
        zeros as f64 / slots as f64
    }
}

/// Try to decode `data` as UTF-16.
///
/// Order: BOM-aware decode; many zero bytes on odd positions ⇒ UTF-16LE;
/// many on even positions ⇒ UTF-16BE; otherwise `None` and the caller
/// falls back to ASCII salvage.
#[must_use]
pub fn utf16_best_effort(data: &[u8]) -> Option<String> {
    if data.len() >= 2 {
        if data[0] == 0xFF && data[1] == 0xFE {
            return non_empty(UTF_16LE.decode_without_bom_handling(&data[2..]).0);
        }
        if data[0] == 0xFE && data[1] == 0xFF {
            return non_empty(UTF_16BE.decode_without_bom_handling(&data[2..]).0);
        }
    }
    if data.len() < 4 {
        return None;
    }

    if zero_ratio(data, 1) >= ZERO_RATIO_THRESHOLD {
        return non_empty(UTF_16LE.decode_without_bom_handling(data).0);
    }
    if zero_ratio(data, 0) >= ZERO_RATIO_THRESHOLD {
        return non_empty(UTF_16BE.decode_without_bom_handling(data).0);
    }

    None
}

/// ASCII salvage: map every byte outside printable ASCII (plus tab, LF,
/// CR) to a space, then collapse whitespace runs.
#[must_use]
pub fn salvage_text(data: &[u8]) -> String {
    let mapped: String = data
        .iter()
        .map(|&b| {
            if b == 0x09 || b == 0x0A || b == 0x0D || (0x20..=0x7E).contains(&b) {
                b as char
            } else {
                ' '
            }
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// UTF-16 best effort with ASCII salvage as the final fallback.
#[must_use]
pub fn decode_loose(data: &[u8]) -> String {
    utf16_best_effort(data).unwrap_or_else(|| salvage_text(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    fn utf16be(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_be_bytes).collect()
    }

    #[test]
    fn decodes_bom_marked_utf16() {
        let mut data = vec![0xFF, 0xFE];
        data.extend(utf16le("hello world"));
        assert_eq!(utf16_best_effort(&data).as_deref(), Some("hello world"));

        let mut data = vec![0xFE, 0xFF];
        data.extend(utf16be("hello world"));
        assert_eq!(utf16_best_effort(&data).as_deref(), Some("hello world"));
    }

    #[test]
    fn detects_bomless_utf16_by_zero_ratio() {
        assert_eq!(
            utf16_best_effort(&utf16le("plain ascii text")).as_deref(),
            Some("plain ascii text")
        );
        assert_eq!(
            utf16_best_effort(&utf16be("plain ascii text")).as_deref(),
            Some("plain ascii text")
        );
    }

    #[test]
    fn plain_ascii_is_not_misdetected() {
        assert!(utf16_best_effort(b"just regular ascii bytes").is_none());
    }

    #[test]
    fn salvage_maps_binary_to_spaces() {
        let data = b"keep\x00\x01this\xfftext";
        assert_eq!(salvage_text(data), "keep this text");
    }
}
