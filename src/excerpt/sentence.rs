//! Sentence boundary detection for excerpt construction
//!
//! A period, `!`, or `?` ends a sentence unless it sits inside a decimal
//! number or follows a known abbreviation. A blank line always ends one.
//! The terminator must be followed by whitespace, an uppercase letter, or
//! the end of input before it counts.

/// Abbreviations whose trailing period does not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "no", "inc", "ltd", "co", "u.s",
    "u.k", "e.g", "i.e",
];

/// Longest token worth considering as an abbreviation.
const MAX_TOKEN: usize = 12;

/// The word-ish token immediately before `pos`, lowercased. Walks back
/// through letters, digits, and interior dots so `U.S.` yields `u.s`.
fn preceding_token(text: &str, pos: usize) -> Option<String> {
    let mut chars: Vec<char> = Vec::new();
    for c in text[..pos].chars().rev() {
        if c.is_ascii_alphanumeric() || c == '.' {
            chars.push(c.to_ascii_lowercase());
            if chars.len() > MAX_TOKEN {
                return None;
            }
        } else {
            break;
        }
    }
    if chars.is_empty() {
        return None;
    }
    chars.reverse();
    let token: String = chars.into_iter().collect();
    Some(token.trim_matches('.').to_string())
}

/// Whether the terminator `c` at byte `pos` ends a sentence.
pub(crate) fn is_boundary(text: &str, pos: usize, c: char) -> bool {
    let after = text[pos + c.len_utf8()..].chars().next();

    match after {
        None => {}
        Some(a) if a.is_whitespace() || a.is_uppercase() => {}
        Some(_) => return false,
    }

    let before = text[..pos].chars().next_back();
    if let (Some(b), Some(a)) = (before, after) {
        if b.is_ascii_digit() && a.is_ascii_digit() {
            return false;
        }
    }

    if c == '.' {
        if let Some(token) = preceding_token(text, pos) {
            if ABBREVIATIONS.contains(&token.as_str()) {
                return false;
            }
            // Single-letter tokens are initials or the inner dots of
            // dotted abbreviations; never sentence ends.
            if token.len() == 1 && token.chars().all(char::is_alphabetic) {
                return false;
            }
        }
    }

    true
}

/// Split text into sentence byte ranges. Ranges cover the original text in
/// order; whitespace-only stretches are dropped.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<(usize, usize)> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0usize;

    let mut push = |s: usize, e: usize, out: &mut Vec<(usize, usize)>| {
        if e > s && !text[s..e].trim().is_empty() {
            out.push((s, e));
        }
    };

    let mut i = 0usize;
    while i < chars.len() {
        let (pos, c) = chars[i];
        match c {
            '.' | '!' | '?' if is_boundary(text, pos, c) => {
                let end = pos + c.len_utf8();
                push(start, end, &mut sentences);
                start = end;
            }
            '\n' if i + 1 < chars.len() && chars[i + 1].1 == '\n' => {
                push(start, pos, &mut sentences);
                // Skip the whole newline run.
                while i + 1 < chars.len() && chars[i + 1].1 == '\n' {
                    i += 1;
                }
                start = chars.get(i + 1).map_or(text.len(), |&(p, _)| p);
            }
            _ => {}
        }
        i += 1;
    }

    push(start, text.len(), &mut sentences);
    sentences
}
