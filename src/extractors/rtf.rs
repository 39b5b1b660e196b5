//! RTF text extraction: control-word stripping

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;

static CONTROL_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[a-z]+-?\d*").expect("static pattern"));

/// Strip RTF control words and group braces, collapse whitespace.
pub fn extract(data: &[u8]) -> Result<String> {
    let text = String::from_utf8_lossy(data);
    let text = CONTROL_WORD.replace_all(&text, "");
    let text = text.replace(['{', '}'], "");
    Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
}
