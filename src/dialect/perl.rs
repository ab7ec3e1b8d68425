//! A Perl-flavored dialect: `egrep`'s operator set plus `\d`/`\s`/`\w`/`\b`/
//! `\B` escapes outside character classes, and reluctant quantifiers
//! (`*?`, `+?`, `??`) that prefer the shortest match before backtracking
//! into a longer one.
//!
//! Ported from `syntax_perl` in regexp-cpp's `syntax_perl.h`; the stingy
//! ("non-greedy") branch of its `compile_opcode` override is what
//! `compile_reluctant_repeat` below reproduces.

use crate::dialect::{Dialect, Token};
use crate::error::Result;
use crate::opcodes::Opcode;
use crate::state::CompileState;

#[derive(Debug, Default, Clone, Copy)]
pub struct Perl;

impl Dialect for Perl {
    fn context_independent_ops(&self) -> bool {
        true
    }

    fn translate_plain_op(&self, ch: char) -> Token {
        super::egrep::Egrep.translate_plain_op(ch)
    }

    fn translate_escaped_op(&self, ch: char) -> Token {
        match ch {
            'd' | 'D' | 's' | 'S' | 'w' | 'W' => Token::ClassEscape(ch),
            _ => super::egrep::Egrep.translate_escaped_op(ch),
        }
    }

    fn compile_opcode(&self, cs: &mut CompileState, token: Token) -> Result<()> {
        if matches!(token, Token::Star | Token::Plus | Token::Question) && cs.cursor.peek() == Some('?') {
            cs.cursor.advance(1);
            return compile_reluctant_repeat(self, cs, token);
        }
        crate::dialect::default_compile_opcode(self, cs, token)
    }
}

/// The mirror image of the greedy form: the entry `PUSH_FAIL`/`GOTO` pair
/// trades places with the greedy version's, so the forward path skips the
/// operand (preferring fewer repeats) and a failed continuation backtracks
/// into trying it. `PUSH_FAIL` (not `PushFail2`) is used deliberately: a
/// retry needs the text cursor restored to where the skip happened.
fn compile_reluctant_repeat(dialect: &Perl, cs: &mut CompileState, token: Token) -> Result<()> {
    let operand_start = cs.precedence.start(cs.precedence.current());
    if operand_start == cs.code.len() {
        return Ok(());
    }
    let _ = dialect;
    match token {
        Token::Question => {
            // `GOTO` is spliced first so the later `PUSH_FAIL` splice lands
            // ahead of it: [PUSH_FAIL][GOTO][operand]. Patching GOTO's own
            // target right away, before anything else splices ahead of it,
            // means its field never goes stale.
            let goto_disp = cs.code.store_jump(operand_start, Opcode::Goto);
            cs.code.put_address(goto_disp, cs.code.len());
            let push_disp = cs.code.store_jump(operand_start, Opcode::PushFail);
            cs.code.put_address(push_disp, operand_start + 6);
        }
        Token::Star | Token::Plus => {
            let goto_disp = cs.code.store_jump(operand_start, Opcode::Goto);
            let push_disp = cs.code.store_jump(operand_start, Opcode::PushFail);
            // The PUSH_FAIL splice above landed ahead of GOTO, shifting its
            // displacement field 3 bytes further along.
            let goto_disp = goto_disp + 3;
            cs.code.put_address(push_disp, operand_start + 6);
            let loop_goto_at = cs.code.store_opcode(Opcode::Goto);
            let loop_goto_disp = cs.code.reserve_address();
            debug_assert_eq!(loop_goto_disp, loop_goto_at + 1);
            let after_loop = cs.code.len();
            cs.code.put_address(goto_disp, after_loop);
            cs.code.put_address(loop_goto_disp, operand_start);
            if token == Token::Plus {
                // Mandatory first iteration: skip straight past the entry
                // PUSH_FAIL/GOTO pair into the body.
                let fake_disp = cs.code.store_jump(operand_start, Opcode::FakeFailGoto);
                cs.code.put_address(fake_disp, operand_start + 9);
            }
        }
        _ => unreachable!(),
    }
    Ok(())
}
