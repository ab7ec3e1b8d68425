//! Basic usage examples for the bregex crate.

use bregex::{DialectKind, ExecLimits, Regex};

fn main() {
    println!("=== Basic Pattern Matching ===");
    basic_matching();

    println!("\n=== Dialects ===");
    dialects();

    println!("\n=== Execution Limits ===");
    execution_limits();

    println!("\n=== Capture Groups ===");
    capture_groups();

    println!("\n=== Character Sets and Ranges ===");
    character_sets();

    println!("\n=== Anchoring ===");
    anchoring();

    println!("\n=== Perl Reluctant Quantifiers ===");
    reluctant_quantifiers();
}

fn basic_matching() {
    let regex = Regex::compile("hello", DialectKind::Generic).unwrap();

    println!("Pattern: 'hello'");
    println!("  'hello world' -> {}", regex.is_match("hello world"));
    println!("  'hi there' -> {}", regex.is_match("hi there"));

    // Dot matches any character except newline
    let regex = Regex::compile("h.llo", DialectKind::Generic).unwrap();
    println!("\nPattern: 'h.llo'");
    println!("  'hello' -> {}", regex.is_match("hello"));
    println!("  'hallo' -> {}", regex.is_match("hallo"));
    println!("  'h\\nllo' -> {}", regex.is_match("h\nllo"));

    // Bare star is already a quantifier in the Generic dialect.
    let regex = Regex::compile("ab*c", DialectKind::Generic).unwrap();
    println!("\nPattern: 'ab*c'");
    println!("  'ac' -> {}", regex.is_match("ac"));
    println!("  'abc' -> {}", regex.is_match("abc"));
    println!("  'abbbbc' -> {}", regex.is_match("abbbbc"));
}

fn dialects() {
    // Generic (BSD basic) style - grouping needs a leading backslash, and
    // there's no alternation operator at all.
    let regex = Regex::compile("\\(foo\\)\\1", DialectKind::Generic).unwrap();
    println!("Generic style '\\(foo\\)\\1' (group + backreference):");
    println!("  'foofoo' -> {}", regex.is_match("foofoo"));
    println!("  'foobar' -> {}", regex.is_match("foobar"));

    // Egrep/Awk style - no backslashes needed.
    let regex = Regex::compile("(foo|bar)", DialectKind::Egrep).unwrap();
    println!("\nEgrep style '(foo|bar)':");
    println!("  'foo' -> {}", regex.is_match("foo"));
    println!("  'bar' -> {}", regex.is_match("bar"));

    // Egrep style with bare plus quantifier.
    let regex = Regex::compile("ab+c", DialectKind::Egrep).unwrap();
    println!("\nEgrep style 'ab+c':");
    println!("  'ac' -> {}", regex.is_match("ac")); // Should be false
    println!("  'abc' -> {}", regex.is_match("abc")); // Should be true
    println!("  'abbc' -> {}", regex.is_match("abbc")); // Should be true

    // Grep style - a misplaced operator is a literal, not an error.
    let regex = Regex::compile("*abc", DialectKind::Grep).unwrap();
    println!("\nGrep style '*abc' (leading '*' is literal):");
    println!("  '*abc' -> {}", regex.is_match("*abc"));
}

fn execution_limits() {
    // Catastrophic-backtracking-shaped pattern that still terminates because
    // the engine bounds its backtracking depth.
    let regex = Regex::compile("a*a*a*a*a*a*a*a*a*a*", DialectKind::Egrep)
        .unwrap()
        .with_limits(ExecLimits {
            max_closure_stack_depth: 256,
            ..ExecLimits::default()
        });
    let text = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaab"; // Doesn't match - will backtrack

    println!("Testing catastrophic backtracking pattern:");
    println!("Pattern: 'a*a*a*a*a*a*a*a*a*a*'");
    println!("Text: 'aaaa...aaab' (30 a's + b)");

    let start = std::time::Instant::now();
    let result = regex.is_match(text);
    let elapsed = start.elapsed();

    println!("  Result: {result} (completed in {elapsed:?})");
    println!("  -> A bounded closure stack keeps runaway backtracking from hanging.");
}

fn capture_groups() {
    let regex = Regex::compile("([a-z]+)\\s+([0-9]+)", DialectKind::Egrep).unwrap();
    let text = "hello 123";

    println!("Pattern: '([a-z]+)\\s+([0-9]+)'");
    println!("Text: '{text}'");

    if let Some(captures) = regex.captures(text) {
        println!("Captures:");
        if let Some(whole) = captures.get(0) {
            println!("  Group 0 (full match): '{whole}'");
        }
        if let Some(word) = captures.get(1) {
            println!("  Group 1 (word): '{word}'");
        }
        if let Some(number) = captures.get(2) {
            println!("  Group 2 (number): '{number}'");
        }
    }
}

fn character_sets() {
    // Basic character set
    let regex = Regex::compile("[abc]", DialectKind::Generic).unwrap();
    println!("Pattern: '[abc]'");
    println!("  'a' -> {}", regex.is_match("a"));
    println!("  'b' -> {}", regex.is_match("b"));
    println!("  'd' -> {}", regex.is_match("d"));

    // Negated character set
    let regex = Regex::compile("[^abc]", DialectKind::Generic).unwrap();
    println!("\nPattern: '[^abc]'");
    println!("  'a' -> {}", regex.is_match("a"));
    println!("  'd' -> {}", regex.is_match("d"));

    // Character range
    let regex = Regex::compile("[a-z]", DialectKind::Generic).unwrap();
    println!("\nPattern: '[a-z]'");
    println!("  'm' -> {}", regex.is_match("m"));
    println!("  'A' -> {}", regex.is_match("A"));
    println!("  '5' -> {}", regex.is_match("5"));
}

fn anchoring() {
    // Beginning of line
    let regex = Regex::compile("^hello", DialectKind::Generic).unwrap();
    println!("Pattern: '^hello'");
    println!("  'hello world' -> {}", regex.is_match("hello world"));
    println!("  'say hello' -> {}", regex.is_match("say hello"));

    // End of line
    let regex = Regex::compile("world$", DialectKind::Generic).unwrap();
    println!("\nPattern: 'world$'");
    println!("  'hello world' -> {}", regex.is_match("hello world"));
    println!("  'world peace' -> {}", regex.is_match("world peace"));

    // Both anchors - exact match
    let regex = Regex::compile("^hello$", DialectKind::Generic).unwrap();
    println!("\nPattern: '^hello$'");
    println!("  'hello' -> {}", regex.is_match("hello"));
    println!("  'hello world' -> {}", regex.is_match("hello world"));
}

fn reluctant_quantifiers() {
    let regex = Regex::compile("<.+?>", DialectKind::Perl).unwrap();
    let text = "<a><b>";
    println!("Pattern: '<.+?>' (reluctant)");
    println!("  '{text}' -> {:?}", regex.find(text));

    let regex = Regex::compile("<.+>", DialectKind::Egrep).unwrap();
    println!("Pattern: '<.+>' (greedy, for comparison)");
    println!("  '{text}' -> {:?}", regex.find(text));
}
