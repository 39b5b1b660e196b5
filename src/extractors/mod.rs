//! Format detection and text extraction for binary/container formats
//!
//! One extractor per recognised format, each mapping raw file bytes to
//! plain text. Extractors degrade instead of failing: a broken container
//! falls back to rawer and rawer readings of the bytes, and only an
//! invalid outermost envelope is reported as an error. Callers must still
//! assume any extractor can panic deep inside a third-party decoder and
//! wrap invocations accordingly.

pub mod encoding;
mod eml;
mod markup;
mod mbox;
mod msg;
mod office;
pub mod pdf;
mod rtf;

pub use markup::strip_html_tags;

use std::path::Path;

use crate::error::Result;

/// Recognised file formats, keyed by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Plain text, code, config — anything read as-is.
    Text,
    Html,
    Xml,
    Eml,
    Mbox,
    Msg,
    Doc,
    Docx,
    Odt,
    Rtf,
    Pdf,
}

impl FileFormat {
    /// Detect the format from the last `.segment` of the file name,
    /// case-insensitively.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map_or(Self::Text, |ext| Self::from_extension(&ext.to_lowercase()))
    }

    /// Detect the format from a lowercased extension without dot.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "html" | "htm" | "xhtml" | "shtml" => Self::Html,
            "xml" => Self::Xml,
            "eml" => Self::Eml,
            "mbox" => Self::Mbox,
            "msg" => Self::Msg,
            "doc" => Self::Doc,
            "docx" => Self::Docx,
            "odt" => Self::Odt,
            "rtf" => Self::Rtf,
            "pdf" => Self::Pdf,
            _ => Self::Text,
        }
    }

    /// Whether this format needs extraction before its text is readable.
    #[must_use]
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Self::Eml | Self::Mbox | Self::Msg | Self::Doc | Self::Docx | Self::Odt | Self::Rtf
                | Self::Pdf
        )
    }

    /// Heavy formats: candidates at discovery without a content scan,
    /// gated behind the conservative prefilter instead.
    #[must_use]
    pub fn is_heavy(self) -> bool {
        matches!(
            self,
            Self::Pdf | Self::Docx | Self::Odt | Self::Msg | Self::Eml | Self::Mbox
        )
    }

    /// Short label for logs and metrics.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Html => "html",
            Self::Xml => "xml",
            Self::Eml => "eml",
            Self::Mbox => "mbox",
            Self::Msg => "msg",
            Self::Doc => "doc",
            Self::Docx => "docx",
            Self::Odt => "odt",
            Self::Rtf => "rtf",
            Self::Pdf => "pdf",
        }
    }
}

/// Extract plain text from raw file bytes according to format.
///
/// Text formats decode lossily; container formats dispatch to their
/// extractor. The PDF arm requires the `pdf` feature.
///
/// # Errors
///
/// Returns an error only when the outermost envelope is rejected (EML) or
/// the format is disabled in this build (PDF without the feature). All
/// other failures degrade to a rawer reading of the bytes.
pub fn extract_text(format: FileFormat, data: &[u8]) -> Result<String> {
    match format {
        FileFormat::Text => Ok(String::from_utf8_lossy(data).into_owned()),
        FileFormat::Html => Ok(markup::extract_html(data)),
        FileFormat::Xml => Ok(markup::extract_xml(data)),
        FileFormat::Eml => eml::extract(data),
        FileFormat::Mbox => mbox::extract(data),
        FileFormat::Msg => msg::extract(data),
        FileFormat::Doc => Ok(encoding::decode_loose(data)),
        FileFormat::Docx => office::extract_docx(data),
        FileFormat::Odt => office::extract_odt(data),
        FileFormat::Rtf => rtf::extract(data),
        FileFormat::Pdf => pdf::extract(data),
    }
}
