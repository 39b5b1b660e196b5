//! MSG (Outlook OLE compound file) text extraction
//!
//! MAPI properties live in streams named `__substg1.0_PPPPTTTT` where the
//! type suffix distinguishes Unicode (`001F`), ANSI (`001E`), and binary
//! (`0102`) encodings. Unicode streams are preferred. A file that is not a
//! valid compound file at all degrades to a best-effort UTF-16 decode and
//! finally ASCII salvage.

use std::io::{Cursor, Read};

use crate::error::Result;

use super::encoding::{decode_loose, utf16_best_effort};
use super::markup::strip_html_tags;

/// PR_SUBJECT streams, Unicode first.
const SUBJECT_STREAMS: &[&str] = &["__substg1.0_0037001F", "__substg1.0_0037001E"];
/// PR_BODY streams, Unicode first.
const BODY_STREAMS: &[&str] = &["__substg1.0_1000001F", "__substg1.0_1000001E"];
/// PR_HTML streams; the binary variant is last.
const HTML_STREAMS: &[&str] = &[
    "__substg1.0_1013001F",
    "__substg1.0_1013001E",
    "__substg1.0_10130102",
];

fn read_first_stream(
    comp: &mut cfb::CompoundFile<Cursor<&[u8]>>,
    names: &[&str],
) -> Option<Vec<u8>> {
    for name in names {
        let path = format!("/{name}");
        if let Ok(mut stream) = comp.open_stream(&path) {
            let mut buf = Vec::new();
            if stream.read_to_end(&mut buf).is_ok() && !buf.is_empty() {
                return Some(buf);
            }
        }
    }
    None
}

/// Decode a substg payload: UTF-16 when it looks like it, whitespace-
/// collapsed lossy text otherwise.
fn decode_stream_text(data: &[u8]) -> String {
    if let Some(text) = utf16_best_effort(data) {
        return text;
    }
    String::from_utf8_lossy(data)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract subject and body text from an Outlook message.
pub fn extract(data: &[u8]) -> Result<String> {
    if let Ok(mut comp) = cfb::CompoundFile::open(Cursor::new(data)) {
        let subject = read_first_stream(&mut comp, SUBJECT_STREAMS)
            .map(|b| decode_stream_text(&b))
            .unwrap_or_default();

        let mut body = read_first_stream(&mut comp, BODY_STREAMS)
            .map(|b| decode_stream_text(&b))
            .unwrap_or_default();

        if body.is_empty() {
            if let Some(html_bytes) = read_first_stream(&mut comp, HTML_STREAMS) {
                let html = {
                    let decoded = decode_stream_text(&html_bytes);
                    if decoded.is_empty() {
                        String::from_utf8_lossy(&html_bytes).into_owned()
                    } else {
                        decoded
                    }
                };
                body = strip_html_tags(&html).trim().to_string();
            }
        }

        if !subject.is_empty() || !body.is_empty() {
            let joined = format!("{}\n\n{}", subject.trim(), body.trim());
            return Ok(joined.split_whitespace().collect::<Vec<_>>().join(" "));
        }
    }

    // Not a compound file (or one with no usable streams).
    Ok(decode_loose(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn utf16le(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    fn build_msg(streams: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let cursor = Cursor::new(Vec::new());
        let mut comp = cfb::CompoundFile::create(cursor).unwrap();
        for (name, data) in streams {
            let mut stream = comp.create_stream(format!("/{name}")).unwrap();
            stream.write_all(data).unwrap();
        }
        comp.into_inner().into_inner()
    }

    #[test]
    fn prefers_unicode_subject_and_body() {
        let data = build_msg(&[
            ("__substg1.0_0037001F", utf16le("quarterly report")),
            ("__substg1.0_1000001F", utf16le("the numbers look good")),
        ]);
        let text = extract(&data).unwrap();
        assert_eq!(text, "quarterly report the numbers look good");
    }

    #[test]
    fn html_body_is_stripped_when_plain_body_missing() {
        let data = build_msg(&[
            ("__substg1.0_0037001F", utf16le("html mail")),
            (
                "__substg1.0_1013001F",
                utf16le("<html><body>rich <b>content</b></body></html>"),
            ),
        ]);
        let text = extract(&data).unwrap();
        assert!(text.contains("rich content"));
        assert!(!text.contains("<b>"));
    }

    #[test]
    fn invalid_compound_file_salvages_ascii() {
        let text = extract(b"not an ole file but has words inside").unwrap();
        assert!(text.contains("has words inside"));
    }
}
