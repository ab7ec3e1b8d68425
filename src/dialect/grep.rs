//! BSD `grep`'s dialect: the generic basic syntax, plus a leading `*` or
//! `^` mid-pattern is tolerated as a literal instead of an error (`grep`
//! historically never enforced context-independence the way `egrep` does).
//!
//! Ported from `syntax_grep` in regexp-cpp's `syntax_grep.h`, which
//! inherits `syntax_generic` and overrides nothing but
//! `context_independent_ops`.

use crate::dialect::{Dialect, Token};
use crate::state::CompileState;

#[derive(Debug, Default, Clone, Copy)]
pub struct Grep;

impl Dialect for Grep {
    fn context_independent_ops(&self) -> bool {
        false
    }

    fn incomplete_eoi(&self, _cs: &CompileState) -> bool {
        false
    }

    fn translate_plain_op(&self, ch: char) -> Token {
        super::generic::Generic.translate_plain_op(ch)
    }

    fn translate_escaped_op(&self, ch: char) -> Token {
        super::generic::Generic.translate_escaped_op(ch)
    }
}
