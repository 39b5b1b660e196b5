//! Tag and entity stripping for HTML and XML payloads

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("static pattern"));
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&[a-zA-Z0-9#]*;").expect("static pattern"));

/// Strip HTML tags and decode the canonical entities; every other entity
/// becomes a space.
#[must_use]
pub fn strip_html_tags(html: &str) -> String {
    let text = TAG.replace_all(html, " ");
    ENTITY
        .replace_all(&text, |caps: &Captures<'_>| match &caps[0] {
            "&amp;" => "&",
            "&lt;" => "<",
            "&gt;" => ">",
            "&quot;" => "\"",
            "&apos;" => "'",
            _ => " ",
        })
        .into_owned()
}

/// Strip XML tags; entities are left alone.
#[must_use]
pub fn strip_xml_tags(xml: &str) -> String {
    TAG.replace_all(xml, " ").into_owned()
}

pub(super) fn extract_html(data: &[u8]) -> String {
    strip_html_tags(&String::from_utf8_lossy(data))
        .trim()
        .to_string()
}

pub(super) fn extract_xml(data: &[u8]) -> String {
    strip_xml_tags(&String::from_utf8_lossy(data))
        .trim()
        .to_string()
}
