//! End-to-end tests exercising the compiler and VM together across all
//! five dialects.

use bregex::{DialectKind, ExecLimits, Regex};

#[test]
fn basic_exact_match() {
    let regex = Regex::compile("hello", DialectKind::Generic).unwrap();
    assert!(regex.is_match("hello"));
    assert!(regex.is_match("hello world"));
    assert!(!regex.is_match("hi"));
}

#[test]
fn dot_matches_any_char_but_newline() {
    let regex = Regex::compile("h.llo", DialectKind::Generic).unwrap();
    assert!(regex.is_match("hello"));
    assert!(regex.is_match("hallo"));
    assert!(!regex.is_match("hllo"));
    assert!(!regex.is_match("h\nllo"));
}

#[test]
fn star_quantifier() {
    let regex = Regex::compile("ab*c", DialectKind::Generic).unwrap();
    assert!(regex.is_match("ac"));
    assert!(regex.is_match("abc"));
    assert!(regex.is_match("abbc"));
    assert!(regex.is_match("abbbc"));
    assert!(regex.is_match("acc"));

    assert!(!regex.is_match("def"));
    assert!(!regex.is_match("a"));
    assert!(!regex.is_match("ab"));
    assert!(!regex.is_match("bc"));
}

#[test]
fn plus_quantifier_egrep_syntax() {
    let regex = Regex::compile("ab+c", DialectKind::Egrep).unwrap();
    assert!(!regex.is_match("ac"));
    assert!(regex.is_match("abc"));
    assert!(regex.is_match("abbc"));
    assert!(!regex.is_match("acc"));
}

#[test]
fn optional_quantifier_egrep_syntax() {
    let regex = Regex::compile("ab?c", DialectKind::Egrep).unwrap();
    assert!(regex.is_match("ac"));
    assert!(regex.is_match("abc"));
    assert!(!regex.is_match("abbc"));
}

#[test]
fn character_sets() {
    let regex = Regex::compile("[abc]", DialectKind::Generic).unwrap();
    assert!(regex.is_match("a"));
    assert!(regex.is_match("b"));
    assert!(regex.is_match("c"));
    assert!(!regex.is_match("d"));

    let regex = Regex::compile("[^abc]", DialectKind::Generic).unwrap();
    assert!(!regex.is_match("a"));
    assert!(!regex.is_match("b"));
    assert!(!regex.is_match("c"));
    assert!(regex.is_match("d"));
}

#[test]
fn character_ranges() {
    let regex = Regex::compile("[a-z]", DialectKind::Generic).unwrap();
    assert!(regex.is_match("a"));
    assert!(regex.is_match("m"));
    assert!(regex.is_match("z"));
    assert!(!regex.is_match("A"));
    assert!(!regex.is_match("0"));
}

#[test]
fn class_escapes_digit_space_word() {
    let regex = Regex::compile("[\\d]+", DialectKind::Perl).unwrap();
    assert!(regex.is_match("42"));
    assert!(!regex.is_match("xx"));

    let regex = Regex::compile("[\\s]+", DialectKind::Perl).unwrap();
    assert!(regex.is_match("  \t"));

    let regex = Regex::compile("[\\w]+", DialectKind::Perl).unwrap();
    assert!(regex.is_match("var_1"));
}

#[test]
fn anchors() {
    let regex = Regex::compile("^hello", DialectKind::Generic).unwrap();
    assert!(regex.is_match("hello world"));
    assert!(!regex.is_match("say hello"));

    let regex = Regex::compile("world$", DialectKind::Generic).unwrap();
    assert!(regex.is_match("hello world"));
    assert!(!regex.is_match("world peace"));
}

#[test]
fn alternation_egrep_syntax() {
    let regex = Regex::compile("cat|dog", DialectKind::Egrep).unwrap();
    assert!(regex.is_match("cat"));
    assert!(regex.is_match("dog"));
    assert!(regex.is_match("I have a cat"));
    assert!(regex.is_match("My dog barks"));
    assert!(!regex.is_match("bird"));
}

#[test]
fn groups_egrep_syntax() {
    let regex = Regex::compile("(ab)+", DialectKind::Egrep).unwrap();
    assert!(regex.is_match("ab"));
    assert!(regex.is_match("abab"));
    assert!(regex.is_match("ababab"));
    assert!(!regex.is_match("a"));
    assert!(regex.is_match("aba"));
}

#[test]
fn backreferences() {
    let regex = Regex::compile("\\([a-z]*\\) \\1", DialectKind::Generic).unwrap();
    assert!(regex.is_match("hello hello"));
    assert!(!regex.is_match("hello world"));
}

#[test]
fn backreference_to_unclosed_group_is_an_error() {
    assert!(Regex::compile("\\(a\\2", DialectKind::Generic).is_err());
}

#[test]
fn word_boundaries_generic_uses_angle_escapes() {
    let regex = Regex::compile("\\<word\\>", DialectKind::Generic).unwrap();
    assert!(regex.is_match("a word here"));
    assert!(regex.is_match("word"));
    assert!(!regex.is_match("password"));
    assert!(!regex.is_match("wordy"));
}

#[test]
fn word_boundaries_egrep_uses_b() {
    let regex = Regex::compile("\\bword\\b", DialectKind::Egrep).unwrap();
    assert!(regex.is_match("a word here"));
    assert!(regex.is_match("word"));
    assert!(!regex.is_match("password"));
    assert!(!regex.is_match("wordy"));
}

#[test]
fn perl_word_boundary_negation() {
    let regex = Regex::compile("\\Bpass", DialectKind::Perl).unwrap();
    assert!(!regex.is_match("pass"));
    assert!(regex.is_match("compass"));
}

#[test]
fn dialect_emacs_requires_backslash_for_groups() {
    let regex = Regex::compile("\\(abc\\)", DialectKind::Generic).unwrap();
    assert!(regex.is_match("abc"));
}

#[test]
fn dialect_egrep_groups_are_bare() {
    let regex = Regex::compile("(abc)", DialectKind::Egrep).unwrap();
    assert!(regex.is_match("abc"));
}

#[test]
fn dialect_grep_tolerates_misplaced_operators() {
    // A leading `*` can never be a quantifier (nothing precedes it); `grep`
    // accepts it as a literal instead of erroring the way `egrep` would.
    let regex = Regex::compile("*abc", DialectKind::Grep).unwrap();
    assert!(regex.is_match("*abc"));
}

#[test]
fn dialect_egrep_rejects_misplaced_operators() {
    assert!(Regex::compile("*abc", DialectKind::Egrep).is_err());
}

#[test]
fn execution_limits_bound_catastrophic_backtracking() {
    let regex = Regex::compile("(a+a+)+b", DialectKind::Egrep)
        .unwrap()
        .with_limits(ExecLimits {
            max_closure_stack_depth: 64,
            ..ExecLimits::default()
        });
    let text = "aaaaaaaaaaaaaaac";
    // Either the bounded stack trips `ClosureStackOverflow`, or backtracking
    // exhausts on its own; either way this terminates instead of hanging.
    match regex.match_at(text, 0) {
        Ok(m) => assert!(m.is_none()),
        Err(_) => {}
    }
}

#[test]
fn captures_report_spans() {
    let regex = Regex::compile("([a-z]+) ([0-9]+)", DialectKind::Egrep).unwrap();
    let caps = regex.captures("hello 123").unwrap();

    assert_eq!(caps.get(0), Some("hello 123"));
    assert_eq!(caps.get(1), Some("hello"));
    assert_eq!(caps.get(2), Some("123"));
}

#[test]
fn find_returns_leftmost_match() {
    let regex = Regex::compile("test", DialectKind::Generic).unwrap();
    assert_eq!(regex.find("this is a test"), Some("test"));
    assert_eq!(regex.find("no match"), None);
}

#[test]
fn control_char_escapes() {
    let regex = Regex::compile("\\n", DialectKind::Generic).unwrap();
    assert!(regex.is_match("line1\nline2"));

    let regex = Regex::compile("\\t", DialectKind::Generic).unwrap();
    assert!(regex.is_match("tab\there"));
}

#[test]
fn hex_escapes() {
    let regex = Regex::compile("\\x41", DialectKind::Generic).unwrap();
    assert!(regex.is_match("ABC"));
}

#[test]
fn case_insensitive_folds_both_directions() {
    let regex = Regex::compile("abc", DialectKind::Generic)
        .unwrap()
        .with_limits(ExecLimits {
            case_insensitive: true,
            ..ExecLimits::default()
        });
    assert!(regex.is_match("ABC"));
    assert!(regex.is_match("abc"));
}

#[test]
fn lower_only_insensitive_is_asymmetric() {
    let regex = Regex::compile("abc", DialectKind::Generic)
        .unwrap()
        .with_limits(ExecLimits {
            lower_only_insensitive: true,
            ..ExecLimits::default()
        });
    assert!(regex.is_match("ABC"));
    let regex = Regex::compile("ABC", DialectKind::Generic)
        .unwrap()
        .with_limits(ExecLimits {
            lower_only_insensitive: true,
            ..ExecLimits::default()
        });
    assert!(!regex.is_match("abc"));
}

#[test]
fn empty_pattern_matches_anywhere() {
    let regex = Regex::compile("", DialectKind::Generic).unwrap();
    assert!(regex.is_match(""));
    assert!(regex.is_match("anything"));
}

#[test]
fn complex_pattern_with_anchors_classes_and_groups() {
    let regex = Regex::compile("^([a-zA-Z][a-zA-Z0-9_]*):.*=.*$", DialectKind::Egrep).unwrap();

    assert!(regex.is_match("variable: foo = bar"));
    assert!(regex.is_match("x: a = b"));
    assert!(!regex.is_match("123invalid: foo = bar"));
    assert!(!regex.is_match("variable foo = bar"));
}

#[test]
fn unmatched_parens_tolerated_unmatched_brackets_rejected() {
    assert!(Regex::compile("\\(unclosed", DialectKind::Generic).is_err());
    assert!(Regex::compile("unmatched\\)", DialectKind::Generic).is_err());

    assert!(Regex::compile("[unclosed", DialectKind::Generic).is_err());
    assert!(Regex::compile("\\", DialectKind::Generic).is_err());
}

#[test]
fn bare_star_outside_repeat_position_is_a_literal() {
    let regex = Regex::compile("*", DialectKind::Generic).unwrap();
    assert!(regex.is_match("*"));
}

#[test]
fn bol_eol_at_both_ends() {
    let regex = Regex::compile("^$", DialectKind::Generic).unwrap();
    assert!(regex.is_match(""));
    assert!(regex.is_match("\n"));
}

#[test]
fn utf8_literal_matching() {
    let regex = Regex::compile("café", DialectKind::Generic).unwrap();
    assert!(regex.is_match("café"));
    assert!(regex.is_match("I love café au lait"));
    assert!(!regex.is_match("cafe"));
}

#[test]
fn utf8_in_character_classes_and_ranges() {
    let regex = Regex::compile("[αβγ]", DialectKind::Generic).unwrap();
    assert!(regex.is_match("α"));
    assert!(regex.is_match("β"));
    assert!(regex.is_match("γ"));
    assert!(!regex.is_match("a"));

    let regex = Regex::compile("[α-ω]", DialectKind::Generic).unwrap();
    assert!(regex.is_match("α"));
    assert!(regex.is_match("λ"));
    assert!(regex.is_match("ω"));
    assert!(!regex.is_match("Α"));
}

#[test]
fn counted_repetition_bounds() {
    let regex = Regex::compile("a{2,3}", DialectKind::Egrep).unwrap();
    assert!(!regex.is_match("a"));
    assert!(regex.is_match("aa"));
    assert!(regex.is_match("aaa"));

    let regex = Regex::compile("a{2,}", DialectKind::Egrep).unwrap();
    assert!(!regex.is_match("a"));
    assert!(regex.is_match("aaaaaa"));

    let regex = Regex::compile("a{3}", DialectKind::Egrep).unwrap();
    assert!(regex.is_match("aaa"));
    assert!(!regex.is_match("aa"));
}

#[test]
fn malformed_counted_repetition_is_an_error() {
    assert!(Regex::compile("a{3,2}", DialectKind::Egrep).is_err());
    assert!(Regex::compile("a{", DialectKind::Egrep).is_err());
}

#[test]
fn perl_reluctant_quantifiers_pick_shortest_span() {
    let regex = Regex::compile("<.+?>", DialectKind::Perl).unwrap();
    assert_eq!(regex.find("<a><b>"), Some("<a>"));

    let regex = Regex::compile("<.+>", DialectKind::Egrep).unwrap();
    assert_eq!(regex.find("<a><b>"), Some("<a><b>"));
}

#[test]
fn awk_dialect_matches_egrep_operator_set() {
    let regex = Regex::compile("(foo|bar)+", DialectKind::Awk).unwrap();
    assert!(regex.is_match("foobar"));
    assert!(!regex.is_match("baz"));
}
