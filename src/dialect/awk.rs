//! `awk`'s ERE dialect, identical to `egrep`'s once `NO_BK_PARENS`/
//! `NO_BK_VBAR`/`CONTEXT_INDEP_OPS` are baked in — the original source
//! literally reuses `syntax_egrep`'s hook table for `awk` rather than
//! deriving a separate class, so this wraps it by value instead of
//! duplicating its match arms.

use crate::dialect::egrep::Egrep;
use crate::dialect::{Dialect, Token};
use crate::state::CompileState;

#[derive(Debug, Default, Clone, Copy)]
pub struct Awk(Egrep);

impl Dialect for Awk {
    fn context_independent_ops(&self) -> bool {
        self.0.context_independent_ops()
    }

    fn precedence(&self, token: &Token) -> usize {
        self.0.precedence(token)
    }

    fn incomplete_eoi(&self, cs: &CompileState) -> bool {
        self.0.incomplete_eoi(cs)
    }

    fn translate_plain_op(&self, ch: char) -> Token {
        self.0.translate_plain_op(ch)
    }

    fn translate_escaped_op(&self, ch: char) -> Token {
        self.0.translate_escaped_op(ch)
    }
}
