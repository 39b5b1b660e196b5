//! Content cleaning: the canonical text form for matching and excerpting
//!
//! Raw extracted text is full of markup remnants, control bytes, and email
//! quoting noise. `clean_content` normalises all of it in a fixed order so
//! the proximity predicate and the excerpt builder always operate on the
//! same canonical form. Line structure survives cleaning — sentence and
//! header boundaries are needed later when excerpts are expanded.

use once_cell::sync::Lazy;
use regex::Regex;

static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("static pattern"));
static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("static pattern"));
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("static pattern"));
static HTML_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&[a-zA-Z0-9#]*;").expect("static pattern"));
static GT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r">+").expect("static pattern"));
static HORIZONTAL_WS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\r]+").expect("static pattern"));
static SPACE_AROUND_NEWLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" ?\n ?").expect("static pattern"));
static NEWLINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("static pattern"));
static LETTER_THEN_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z])([0-9])").expect("static pattern"));
static DIGIT_THEN_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9])([A-Za-z])").expect("static pattern"));
static COMMA_NO_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r",(\S)").expect("static pattern"));

static EMAIL_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(Content-Type|Content-Transfer-Encoding|MIME-Version|Date|From|To|Subject|Message-ID|Return-Path|Received|X-[^:\s]*|Authentication-Results):",
    )
    .expect("static pattern")
});

/// Whether a line starts with a known email header token followed by `:`.
///
/// Used as an excerpt boundary — an excerpt expanding leftwards through an
/// email body must stop before running into the header block.
#[must_use]
pub fn is_email_header_line(line: &str) -> bool {
    EMAIL_HEADER.is_match(line)
}

/// Whether a line is a horizontal-rule filler of five or more `=` or `#`.
fn is_rule_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 5 && trimmed.chars().all(|c| c == '=' || c == '#')
}

/// Clean raw content into the canonical form used by matching and
/// excerpting.
///
/// Transformations, in order: strip `<style>`/`<script>` blocks, replace
/// tags and entities with spaces, drop control characters, drop `=`/`#`
/// rule lines and `>`-quoted lines, collapse quote markers and whitespace,
/// separate letter/digit transitions, and ensure a space after commas.
/// Newlines are preserved (runs collapsed to a blank line at most) so
/// later stages can still see paragraph and header boundaries.
#[must_use]
pub fn clean_content(content: &str) -> String {
    let text = STYLE_BLOCK.replace_all(content, "");
    let text = SCRIPT_BLOCK.replace_all(&text, "");
    let text = HTML_TAG.replace_all(&text, " ");
    let text = HTML_ENTITY.replace_all(&text, " ");

    // Control characters, keeping the whitespace the line passes rely on.
    let text: String = text
        .chars()
        .filter(|&c| {
            let code = c as u32;
            !(code <= 0x1F || (0x7F..=0x9F).contains(&code)) || c == '\t' || c == '\n' || c == '\r'
        })
        .collect();

    let mut kept_lines: Vec<&str> = Vec::new();
    for line in text.lines() {
        if is_rule_line(line) {
            continue;
        }
        if line.trim_start().starts_with('>') {
            continue;
        }
        kept_lines.push(line);
    }
    let text = kept_lines.join("\n");

    let text = GT_RUN.replace_all(&text, " ");
    let text = HORIZONTAL_WS.replace_all(&text, " ");
    let text = SPACE_AROUND_NEWLINE.replace_all(&text, "\n");
    let text = NEWLINE_RUN.replace_all(&text, "\n\n");
    let text = LETTER_THEN_DIGIT.replace_all(&text, "$1 $2");
    let text = DIGIT_THEN_LETTER.replace_all(&text, "$1 $2");
    let text = COMMA_NO_SPACE.replace_all(&text, ", $1");

    text.trim().to_string()
}

/// Collapse all whitespace runs to single spaces. Applied to final excerpt
/// strings, where line structure no longer matters.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
