//! ASCII whole-word matching primitive
//!
//! The base predicate behind every scan: does a byte buffer contain a
//! whole-word occurrence of a lowercase ASCII word, case-insensitively,
//! tolerating a trailing `s` or `es`?

/// A byte is a word character iff it is an ASCII letter, digit, or `_`.
#[inline]
#[must_use]
pub fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[inline]
fn ascii_lower(b: u8) -> u8 {
    if b.is_ascii_uppercase() {
        b | 0x20
    } else {
        b
    }
}

/// Whether `buf` contains `word_lower` as a whole word, case-insensitively,
/// allowing a plural `s`/`es` suffix.
///
/// `word_lower` must already be lowercase ASCII. The candidate span matches
/// when the byte before it is not a word character, the span equals the word
/// case-insensitively, and the bytes after it are either a non-word byte,
/// `s` + non-word, or `es` + non-word (or end of buffer).
#[must_use]
pub fn contains_whole_word(buf: &[u8], word_lower: &[u8]) -> bool {
    let wl = word_lower.len();
    if wl == 0 || buf.len() < wl {
        return false;
    }

    let limit = buf.len() - wl;
    for i in 0..=limit {
        if i > 0 && is_word_byte(buf[i - 1]) {
            continue;
        }

        if !buf[i..i + wl]
            .iter()
            .zip(word_lower)
            .all(|(&b, &w)| ascii_lower(b) == w)
        {
            continue;
        }

        let end = i + wl;
        if end >= buf.len() || !is_word_byte(buf[end]) {
            return true;
        }
        // plural 's'
        if ascii_lower(buf[end]) == b's' && (end + 1 >= buf.len() || !is_word_byte(buf[end + 1])) {
            return true;
        }
        // plural 'es'
        if end + 1 < buf.len()
            && ascii_lower(buf[end]) == b'e'
            && ascii_lower(buf[end + 1]) == b's'
            && (end + 2 >= buf.len() || !is_word_byte(buf[end + 2]))
        {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_whole_word_case_insensitively() {
        assert!(contains_whole_word(b"the CAT sat", b"cat"));
        assert!(contains_whole_word(b"cat", b"cat"));
        assert!(contains_whole_word(b"a cat.", b"cat"));
    }

    #[test]
    fn rejects_embedded_occurrences() {
        assert!(!contains_whole_word(b"concatenate", b"cat"));
        assert!(!contains_whole_word(b"cat_flap", b"cat"));
        assert!(!contains_whole_word(b"bobcat", b"cat"));
    }

    #[test]
    fn tolerates_plural_suffixes() {
        assert!(contains_whole_word(b"two cats here", b"cat"));
        assert!(contains_whole_word(b"three boxes", b"box"));
        assert!(!contains_whole_word(b"catsup", b"cat"));
        assert!(!contains_whole_word(b"boxess", b"box"));
    }

    #[test]
    fn matches_at_buffer_edges() {
        assert!(contains_whole_word(b"cats", b"cat"));
        assert!(contains_whole_word(b"boxes", b"box"));
        assert!(!contains_whole_word(b"ca", b"cat"));
    }
}
