//! DOCX / ODT (ZIP + XML entry) text extraction

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::error::Result;

use super::markup::strip_xml_tags;

/// DOCX: the document body lives in `word/document.xml`.
pub fn extract_docx(data: &[u8]) -> Result<String> {
    extract_zip_entry(data, "word/document.xml")
}

/// ODT: the document body lives in `content.xml`.
pub fn extract_odt(data: &[u8]) -> Result<String> {
    extract_zip_entry(data, "content.xml")
}

/// Open the bytes as a ZIP, read the target XML entry, and strip its tags.
/// A broken archive or a missing entry falls back to the raw bytes as
/// lossy text.
fn extract_zip_entry(data: &[u8], entry_name: &str) -> Result<String> {
    let mut archive = match ZipArchive::new(Cursor::new(data)) {
        Ok(archive) => archive,
        Err(_) => return Ok(String::from_utf8_lossy(data).into_owned()),
    };

    let mut xml = Vec::new();
    match archive.by_name(entry_name) {
        Ok(mut entry) => {
            if entry.read_to_end(&mut xml).is_err() {
                return Ok(String::from_utf8_lossy(data).into_owned());
            }
        }
        Err(_) => return Ok(String::from_utf8_lossy(data).into_owned()),
    }

    Ok(strip_xml_tags(&String::from_utf8_lossy(&xml))
        .trim()
        .to_string())
}
