//! EML (MIME message) text extraction

use mail_parser::MessageParser;

use crate::error::{Result, SearchError};

use super::markup::strip_html_tags;

/// Extract the readable body of a MIME message.
///
/// Prefers the plain-text body; when that is empty, falls back to the HTML
/// body stripped of tags. Only an unparseable outermost envelope is an
/// error — any inner MIME trouble degrades to an empty body.
pub fn extract(data: &[u8]) -> Result<String> {
    let message = MessageParser::default()
        .parse(data)
        .ok_or_else(|| SearchError::Parse {
            format: "eml",
            message: "invalid MIME envelope".into(),
        })?;

    let mut text = message
        .body_text(0)
        .map(|body| body.trim().to_string())
        .unwrap_or_default();

    if text.is_empty() {
        if let Some(html) = message.body_html(0) {
            text = strip_html_tags(&html);
        }
    }

    Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: &str = "From: alice@example.com\r\n\
                         To: bob@example.com\r\n\
                         Subject: signatures\r\n\
                         Date: Mon, 1 Jan 2024 10:00:00 +0000\r\n\
                         Content-Type: text/plain\r\n\
                         \r\n\
                         please sign the agreement\r\n";

    const HTML_ONLY: &str = "From: alice@example.com\r\n\
                             Subject: signatures\r\n\
                             MIME-Version: 1.0\r\n\
                             Content-Type: text/html\r\n\
                             \r\n\
                             <p>please sign the <b>agreement</b></p>\r\n";

    #[test]
    fn prefers_plain_text_body() {
        let text = extract(PLAIN.as_bytes()).unwrap();
        assert_eq!(text, "please sign the agreement");
        assert!(!text.contains("Subject"));
    }

    #[test]
    fn falls_back_to_stripped_html() {
        let text = extract(HTML_ONLY.as_bytes()).unwrap();
        assert!(text.contains("please sign the agreement"));
        assert!(!text.contains("<p>"));
    }
}
