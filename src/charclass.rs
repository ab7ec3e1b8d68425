//! Character classification and case-folding helpers.
//!
//! Ported from `re_char_traits<char>` in regexp-cpp's `traits.h`, kept as
//! free functions rather than a trait object: this crate is `char`-only (no
//! wide-character specialization), so the original's trait indirection
//! buys nothing here.

/// Is `c` a "word" character for `\w`/`\b` purposes: alphanumeric or
/// underscore.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

pub fn is_space(c: char) -> bool {
    c.is_whitespace()
}

/// Case fold a character per the two modes spec.md §4.1 distinguishes:
///
/// - `case_insensitive`: both sides are uppercased before compare (a pattern
///   'a' matches text 'A' and vice versa).
/// - `lower_only_insensitive`: only a *lowercase* pattern letter folds to
///   match either case; an uppercase pattern letter matches only itself.
pub fn chars_equal(pattern_char: char, text_char: char, case_insensitive: bool, lower_only_insensitive: bool) -> bool {
    if pattern_char == text_char {
        return true;
    }
    if case_insensitive {
        return pattern_char.to_ascii_uppercase() == text_char.to_ascii_uppercase();
    }
    if lower_only_insensitive && pattern_char.is_ascii_lowercase() {
        return pattern_char.to_ascii_uppercase() == text_char.to_ascii_uppercase();
    }
    false
}

/// A word boundary exists between `before` and `after` (either may be
/// `None` at the start/end of text) iff exactly one side is a word
/// character.
pub fn is_word_boundary(before: Option<char>, after: Option<char>) -> bool {
    let b = before.map(is_word_char).unwrap_or(false);
    let a = after.map(is_word_char).unwrap_or(false);
    b != a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_folds_both_ways() {
        assert!(chars_equal('a', 'A', true, false));
        assert!(chars_equal('A', 'a', true, false));
    }

    #[test]
    fn lower_only_insensitive_is_asymmetric() {
        assert!(chars_equal('a', 'A', false, true));
        assert!(!chars_equal('A', 'a', false, true));
    }

    #[test]
    fn word_boundary_requires_exactly_one_side() {
        assert!(is_word_boundary(None, Some('a')));
        assert!(is_word_boundary(Some('a'), None));
        assert!(!is_word_boundary(Some('a'), Some('b')));
        assert!(!is_word_boundary(Some(' '), Some('\t')));
        assert!(is_word_boundary(Some(' '), Some('a')));
    }
}
