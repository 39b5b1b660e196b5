//! Format-dispatched bounded prefilters
//!
//! A prefilter answers "could this file possibly contain all the terms?"
//! from a capped read, without extraction. Only a read to the end of the
//! relevant stream can conclude absence; every budget, error, or missing
//! structure inside a container leaves the file undecided so it proceeds
//! to the real check.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::config::extensions::{
    read_budget, DOC_OLE_PREFILTER_CAP, EMAIL_PREFILTER_CAP, OFFICE_XML_PREFILTER_CAP,
    RTF_PREFILTER_CAP,
};
use crate::extractors::{encoding, FileFormat};
use crate::matcher::TermSet;
use crate::scanner::{scan_for_terms, PrefilterOutcome};

/// Default byte cap applied to a format's prefilter stream.
#[must_use]
pub fn default_cap(format: FileFormat) -> Option<u64> {
    match format {
        FileFormat::Eml | FileFormat::Msg | FileFormat::Mbox => Some(EMAIL_PREFILTER_CAP),
        FileFormat::Rtf => Some(RTF_PREFILTER_CAP),
        FileFormat::Docx | FileFormat::Odt => Some(OFFICE_XML_PREFILTER_CAP),
        FileFormat::Doc => Some(DOC_OLE_PREFILTER_CAP),
        _ => None,
    }
}

/// Run the format-appropriate prefilter for `path`.
///
/// `cap_override` tightens the read budget (discovery uses smaller caps
/// than the filter stage). PDFs are not prefiltered here — the governor
/// owns every PDF read — and always come back undecided.
pub fn prefilter_file(
    path: &Path,
    format: FileFormat,
    terms: &TermSet,
    cap_override: Option<u64>,
) -> PrefilterOutcome {
    if terms.is_empty() {
        return PrefilterOutcome::found();
    }

    let cap = cap_override.or_else(|| default_cap(format));

    match format {
        FileFormat::Text | FileFormat::Html | FileFormat::Xml => raw_stream(path, terms, cap),
        FileFormat::Eml | FileFormat::Msg | FileFormat::Mbox | FileFormat::Rtf => {
            raw_stream(path, terms, cap)
        }
        FileFormat::Docx => zip_entry_stream(path, "word/document.xml", terms, cap),
        FileFormat::Odt => zip_entry_stream(path, "content.xml", terms, cap),
        FileFormat::Doc => ole_streams(path, terms, cap.unwrap_or(DOC_OLE_PREFILTER_CAP)),
        FileFormat::Pdf => PrefilterOutcome::undecided(),
    }
}

/// Stream the raw file bytes under the budget tiers.
fn raw_stream(path: &Path, terms: &TermSet, cap: Option<u64>) -> PrefilterOutcome {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(_) => return PrefilterOutcome::absent(),
    };
    let natural = file
        .metadata()
        .map(|m| read_budget(m.len()))
        .unwrap_or(10 * 1024 * 1024);
    let max_bytes = cap.map_or(natural, |c| c.min(natural)).max(1);

    scan_for_terms(file, terms.byte_patterns(), max_bytes)
}

/// Open the file as a ZIP and stream the named XML entry. Any structural
/// problem is undecided: a broken archive says nothing about content.
fn zip_entry_stream(
    path: &Path,
    entry_name: &str,
    terms: &TermSet,
    cap: Option<u64>,
) -> PrefilterOutcome {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(_) => return PrefilterOutcome::undecided(),
    };
    let mut archive = match zip::ZipArchive::new(file) {
        Ok(archive) => archive,
        Err(_) => return PrefilterOutcome::undecided(),
    };
    let entry = match archive.by_name(entry_name) {
        Ok(entry) => entry,
        Err(_) => return PrefilterOutcome::undecided(),
    };

    let max_bytes = cap.unwrap_or(OFFICE_XML_PREFILTER_CAP).max(1);
    scan_for_terms(entry, terms.byte_patterns(), max_bytes)
}

/// Legacy `.doc`: read the text-bearing OLE streams under a shared budget
/// and salvage text from them. Never concludes absence — the streams are
/// an incomplete view of the document.
fn ole_streams(path: &Path, terms: &TermSet, cap: u64) -> PrefilterOutcome {
    const TARGET_STREAMS: [&str; 3] = ["WordDocument", "1Table", "0Table"];

    let file = match File::open(path) {
        Ok(file) => file,
        Err(_) => return PrefilterOutcome::undecided(),
    };
    let mut comp = match cfb::CompoundFile::open(file) {
        Ok(comp) => comp,
        Err(_) => return PrefilterOutcome::undecided(),
    };

    let mut found = vec![false; terms.len()];
    let mut remaining_terms = terms.len();
    let mut budget = cap;

    for name in TARGET_STREAMS {
        if budget == 0 {
            break;
        }
        let mut stream = match comp.open_stream(format!("/{name}")) {
            Ok(stream) => stream,
            Err(_) => continue,
        };
        let mut data = Vec::new();
        if stream.by_ref().take(budget).read_to_end(&mut data).is_err() {
            continue;
        }
        budget = budget.saturating_sub(data.len() as u64);
        if data.is_empty() {
            continue;
        }

        let text = encoding::decode_loose(&data);
        for (i, pattern) in terms.text_patterns().iter().enumerate() {
            if !found[i] && pattern.is_match(&text) {
                found[i] = true;
                remaining_terms -= 1;
                if remaining_terms == 0 {
                    return PrefilterOutcome::found();
                }
            }
        }
    }

    PrefilterOutcome::undecided()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn terms(words: &[&str]) -> TermSet {
        TermSet::compile(&words.iter().map(|w| (*w).to_string()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn text_file_read_to_eof_decides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "contract here but nothing else").unwrap();

        let hit = prefilter_file(&path, FileFormat::Text, &terms(&["contract"]), None);
        assert!(hit.found);

        let miss = prefilter_file(&path, FileFormat::Text, &terms(&["payment"]), None);
        assert!(miss.is_conclusive_miss());
    }

    #[test]
    fn cap_exhaustion_is_undecided() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.eml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&vec![b'x'; 2048]).unwrap();
        file.write_all(b" payment at the end").unwrap();

        let outcome = prefilter_file(&path, FileFormat::Eml, &terms(&["payment"]), Some(1024));
        assert!(!outcome.found);
        assert!(!outcome.decided);
    }

    #[test]
    fn docx_prefilter_reads_document_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.docx");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(b"<w:t>contract and payment</w:t>")
            .unwrap();
        writer.finish().unwrap();

        let hit = prefilter_file(
            &path,
            FileFormat::Docx,
            &terms(&["contract", "payment"]),
            None,
        );
        assert!(hit.found);

        let miss = prefilter_file(&path, FileFormat::Docx, &terms(&["absent"]), None);
        assert!(miss.is_conclusive_miss());
    }

    #[test]
    fn broken_zip_is_undecided() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"not a zip archive").unwrap();
        let outcome = prefilter_file(&path, FileFormat::Docx, &terms(&["anything"]), None);
        assert!(!outcome.decided);
    }

    #[test]
    fn doc_never_decides_absence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.doc");
        std::fs::write(&path, b"not an ole file").unwrap();
        let outcome = prefilter_file(&path, FileFormat::Doc, &terms(&["anything"]), None);
        assert!(!outcome.decided);
        assert!(!outcome.found);
    }
}
