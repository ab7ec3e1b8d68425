//! A multi-dialect (BSD `grep`/`egrep`/`awk`/Perl-flavored) backtracking
//! regular expression engine.
//!
//! The crate is split into a syntax-directed compiler (`driver`, `dialect`,
//! `precedence`, `code`, `cursor`, `state`) that turns a pattern into a
//! linear byte-code program, and a backtracking execution VM (`vm`) that
//! runs that program against text. [`Regex`] is the facade tying the two
//! together; most callers only need it plus a [`DialectKind`].

pub mod charclass;
pub mod code;
pub mod cursor;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod opcodes;
pub mod optimize;
pub mod precedence;
pub mod state;
pub mod vm;

pub use dialect::awk::Awk;
pub use dialect::egrep::Egrep;
pub use dialect::generic::Generic;
pub use dialect::grep::Grep;
pub use dialect::perl::Perl;
pub use dialect::Dialect;
pub use error::{RegexError, Result};
pub use vm::{ExecLimits, MatchResult};

use std::sync::Arc;

/// Which of the five supported syntaxes a pattern should be parsed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectKind {
    /// BSD's baseline basic syntax: `\(`/`\)`/`\{n,m\}`/`\1`-`\9`, bare `*`.
    Generic,
    /// `grep`: generic syntax, but a misplaced operator is a literal, not
    /// an error.
    Grep,
    /// `egrep`: `(`, `)`, `{`, `}`, `|`, `+`, `?` as bare operators.
    Egrep,
    /// `awk`: `egrep`'s hook table under another name.
    Awk,
    /// Perl-flavored: `egrep`'s operators, plus `\d`/`\s`/`\w`/`\b`/`\B` and
    /// reluctant quantifiers.
    Perl,
}

impl DialectKind {
    fn build(self) -> Box<dyn Dialect> {
        match self {
            DialectKind::Generic => Box::new(Generic),
            DialectKind::Grep => Box::new(Grep),
            DialectKind::Egrep => Box::new(Egrep),
            DialectKind::Awk => Box::new(Awk::default()),
            DialectKind::Perl => Box::new(Perl),
        }
    }
}

struct Program {
    code: Vec<u8>,
    num_captures: usize,
    #[allow(dead_code)]
    num_backrefs: usize,
}

/// A compiled pattern. Cheap to clone (an `Arc` bump): clones share the
/// compiled program until [`Regex::optimize`] is called on one of them,
/// which detaches a freshly optimized copy rather than mutating the shared
/// program out from under other handles.
#[derive(Clone)]
pub struct Regex {
    inner: Arc<Program>,
    limits: ExecLimits,
}

impl Regex {
    /// Compile `pattern` under `dialect` with default execution limits.
    pub fn compile(pattern: &str, dialect: DialectKind) -> Result<Regex> {
        let d = dialect.build();
        let (code, num_captures, num_backrefs) = driver::compile(pattern, d.as_ref())?;
        Ok(Regex {
            inner: Arc::new(Program {
                code,
                num_captures,
                num_backrefs,
            }),
            limits: ExecLimits::default(),
        })
    }

    /// Return a handle with different execution limits (case folding,
    /// backtracking depth). Does not recompile.
    pub fn with_limits(mut self, limits: ExecLimits) -> Regex {
        self.limits = limits;
        self
    }

    /// Collapse runs of literal characters into `STRING` opcodes. A no-op
    /// if the program doesn't have the right shape (anything but a run of
    /// `CHAR`s terminated by `END`).
    pub fn optimize(&mut self) -> Result<()> {
        let mut code = self.inner.code.clone();
        if optimize::optimize(&mut code)? {
            self.inner = Arc::new(Program {
                code,
                num_captures: self.inner.num_captures,
                num_backrefs: self.inner.num_backrefs,
            });
        }
        Ok(())
    }

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    /// Require the match to begin exactly at character offset `at`.
    pub fn match_at(&self, text: &str, at: usize) -> Result<Option<MatchResult>> {
        let chars = Self::chars(text);
        let mut vm = vm::Vm::new(&self.inner.code, &chars, &self.limits, self.inner.num_captures);
        vm.run(at)
    }

    /// Same as [`Regex::match_at`]; kept as a distinct name because callers
    /// that only want the boolean result of `match_at` (via [`Regex::is_match`])
    /// shouldn't have to think about captures, while callers who want
    /// [`MatchResult::captures`] can reach for this one explicitly.
    pub fn match_with_captures(&self, text: &str, at: usize) -> Result<Option<MatchResult>> {
        self.match_at(text, at)
    }

    /// Try every start position from `at` onward and return the first
    /// match, i.e. an implicit leading "anything" before the pattern.
    pub fn partial_match(&self, text: &str, at: usize) -> Result<Option<MatchResult>> {
        let chars = Self::chars(text);
        for start in at..=chars.len() {
            let mut vm = vm::Vm::new(&self.inner.code, &chars, &self.limits, self.inner.num_captures);
            if let Some(m) = vm.run(start)? {
                return Ok(Some(m));
            }
        }
        Ok(None)
    }

    /// Scan for the first match within `range`, walking forward if
    /// `range.0 <= range.1` and backward otherwise.
    pub fn search(&self, text: &str, range: (isize, isize)) -> Result<Option<MatchResult>> {
        let chars = Self::chars(text);
        let len = chars.len() as isize;
        let (from, to) = range;
        let positions: Box<dyn Iterator<Item = isize>> = if from <= to {
            Box::new(from..=to)
        } else {
            Box::new((to..=from).rev())
        };
        for p in positions {
            if p < 0 || p > len {
                continue;
            }
            let mut vm = vm::Vm::new(&self.inner.code, &chars, &self.limits, self.inner.num_captures);
            if let Some(m) = vm.run(p as usize)? {
                return Ok(Some(m));
            }
        }
        Ok(None)
    }

    /// True if the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        matches!(self.partial_match(text, 0), Ok(Some(_)))
    }

    /// The text of the first (leftmost) match, if any.
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        let m = self.partial_match(text, 0).ok().flatten()?;
        byte_slice_for_char_range(text, m.start, m.end)
    }

    /// The first match along with its capturing groups.
    pub fn captures(&self, text: &str) -> Option<Captures> {
        let m = self.partial_match(text, 0).ok().flatten()?;
        Some(Captures {
            text: text.to_string(),
            m,
        })
    }
}

/// A successful match's overall span plus its capturing groups, each
/// addressable as a `&str` slice of the original text.
pub struct Captures {
    text: String,
    m: MatchResult,
}

impl Captures {
    /// Group 0 is the whole match; group `n` (`n >= 1`) is the `n`th
    /// capturing group, `None` if the match path never entered it.
    pub fn get(&self, index: usize) -> Option<&str> {
        if index == 0 {
            return byte_slice_for_char_range(&self.text, self.m.start, self.m.end);
        }
        let (s, e) = self.m.captures.get(index - 1).copied().flatten()?;
        byte_slice_for_char_range(&self.text, s, e)
    }

    /// Number of addressable groups, including group 0.
    pub fn len(&self) -> usize {
        self.m.captures.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

fn char_to_byte(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

fn byte_slice_for_char_range(text: &str, start: usize, end: usize) -> Option<&str> {
    text.get(char_to_byte(text, start)..char_to_byte(text, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_pattern_matches() {
        let re = Regex::compile("abc", DialectKind::Generic).unwrap();
        assert!(re.is_match("xxabcxx"));
        assert_eq!(re.find("xxabcxx"), Some("abc"));
    }

    #[test]
    fn egrep_alternation_and_group() {
        let re = Regex::compile("(foo|bar)baz", DialectKind::Egrep).unwrap();
        assert!(re.is_match("foobaz"));
        assert!(re.is_match("barbaz"));
        assert!(!re.is_match("quxbaz"));
        let caps = re.captures("foobaz").unwrap();
        assert_eq!(caps.get(0), Some("foobaz"));
        assert_eq!(caps.get(1), Some("foo"));
    }

    #[test]
    fn counted_repetition() {
        let re = Regex::compile("a{2,3}", DialectKind::Egrep).unwrap();
        assert!(!re.is_match("a"));
        assert!(re.is_match("aa"));
        assert!(re.is_match("aaa"));
    }

    #[test]
    fn optimize_is_a_noop_for_non_literal_programs() {
        let mut re = Regex::compile("a|b", DialectKind::Egrep).unwrap();
        re.optimize().unwrap();
        assert!(re.is_match("b"));
    }

    #[test]
    fn perl_reluctant_question_prefers_skip() {
        let re = Regex::compile("a??b", DialectKind::Perl).unwrap();
        assert_eq!(re.find("b"), Some("b"));
        assert_eq!(re.find("ab"), Some("ab"));
    }

    #[test]
    fn perl_reluctant_star_prefers_fewest_repeats() {
        let re = Regex::compile("a*?b", DialectKind::Perl).unwrap();
        assert_eq!(re.find("aaab"), Some("aaab"));
        assert_eq!(re.find("b"), Some("b"));
    }

    #[test]
    fn perl_reluctant_plus_requires_at_least_one() {
        let re = Regex::compile("a+?b", DialectKind::Perl).unwrap();
        assert!(!re.is_match("b"));
        assert_eq!(re.find("aaab"), Some("aaab"));
    }

    #[test]
    fn greedy_plus_and_question_match() {
        let re = Regex::compile("a+b?", DialectKind::Egrep).unwrap();
        assert_eq!(re.find("aaa"), Some("aaa"));
        assert_eq!(re.find("aaab"), Some("aaab"));
    }

    #[test]
    fn case_insensitive_limit() {
        let re = Regex::compile("abc", DialectKind::Generic)
            .unwrap()
            .with_limits(ExecLimits {
                case_insensitive: true,
                ..ExecLimits::default()
            });
        assert!(re.is_match("ABC"));
    }
}
