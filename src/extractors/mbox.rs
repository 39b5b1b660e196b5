//! MBOX (concatenated messages) text extraction
//!
//! An mbox file is a sequence of RFC-822 messages, each introduced by a
//! `From ` separator line at the start of a line. Each message runs
//! through the EML extractor; outputs are joined with `\n---\n`. A file
//! yielding no messages at all falls back to its raw bytes.

use super::eml;
use crate::error::Result;

/// Byte ranges of the individual messages, excluding the separator lines.
fn message_ranges(data: &[u8]) -> Vec<(usize, usize)> {
    let mut separators: Vec<usize> = Vec::new();
    if data.starts_with(b"From ") {
        separators.push(0);
    }
    let mut i = 0usize;
    while i < data.len() {
        if data[i] == b'\n' && data[i + 1..].starts_with(b"From ") {
            separators.push(i + 1);
        }
        i += 1;
    }

    let mut ranges = Vec::with_capacity(separators.len());
    for (idx, &sep) in separators.iter().enumerate() {
        // Message body starts after the separator line's newline.
        let body_start = match data[sep..].iter().position(|&b| b == b'\n') {
            Some(nl) => sep + nl + 1,
            None => continue,
        };
        let body_end = separators
            .get(idx + 1)
            .copied()
            .unwrap_or(data.len());
        if body_start < body_end {
            ranges.push((body_start, body_end));
        }
    }
    ranges
}

/// Extract all message bodies, separated by `\n---\n`.
pub fn extract(data: &[u8]) -> Result<String> {
    let ranges = message_ranges(data);
    if ranges.is_empty() {
        return Ok(String::from_utf8_lossy(data).into_owned());
    }

    let mut out = String::new();
    for (start, end) in ranges {
        match eml::extract(&data[start..end]) {
            Ok(text) => {
                out.push_str(&text);
                out.push_str("\n---\n");
            }
            Err(_) => continue,
        }
    }

    if out.is_empty() {
        return Ok(String::from_utf8_lossy(data).into_owned());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_messages_on_from_lines() {
        let mbox = "From alice@example.com Mon Jan  1 10:00:00 2024\n\
                    From: alice@example.com\n\
                    Subject: one\n\
                    \n\
                    first body\n\
                    From bob@example.com Mon Jan  1 11:00:00 2024\n\
                    From: bob@example.com\n\
                    Subject: two\n\
                    \n\
                    second body\n";
        let text = extract(mbox.as_bytes()).unwrap();
        assert!(text.contains("first body"));
        assert!(text.contains("second body"));
        assert!(text.contains("\n---\n"));
    }

    #[test]
    fn zero_messages_falls_back_to_raw() {
        let not_mbox = b"just some plain text without separators";
        let text = extract(not_mbox).unwrap();
        assert_eq!(text, "just some plain text without separators");
    }

    #[test]
    fn from_in_body_does_not_split_mid_line() {
        let mbox = "From alice@example.com Mon Jan  1 10:00:00 2024\n\
                    From: alice@example.com\n\
                    \n\
                    quote: letter From a friend arrived\n";
        let text = extract(mbox.as_bytes()).unwrap();
        assert!(text.contains("letter From a friend"));
        assert!(!text.contains("---\n---"));
    }
}
