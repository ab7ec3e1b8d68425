//! The "Syntax Dispatcher": a small hook table that gives each of the five
//! supported dialects its own view of which characters are operators, and
//! in what order those operators bind.
//!
//! Ported from `syntax_base<T>` in regexp-cpp's `syntax_base.h`. The
//! original builds a `generic <- egrep <- awk <- perl` class hierarchy of
//! virtual-method overrides; this spec uses a trait object instead, so each
//! dialect just implements the hooks it needs to differ on and inherits
//! `compile_opcode`'s default body for everything else.

pub mod awk;
pub mod egrep;
pub mod generic;
pub mod grep;
pub mod perl;

use crate::error::{RegexError, Result};
use crate::opcodes::Opcode;
use crate::state::CompileState;

/// A syntactic token, the result of translating one (possibly escaped)
/// input character through a dialect's hook table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    End,
    Char(char),
    AnyChar,
    Bol,
    Eol,
    Star,
    Plus,
    Question,
    Alternate,
    OpenGroup,
    CloseGroup,
    OpenClass,
    OpenBrace,
    /// `\1`..`\9`: a backreference to an already-closed group.
    Backref(u8),
    /// An escape the dialect doesn't special-case: treated as a literal of
    /// the escaped character (after control-character translation).
    Literal(char),
    /// A bare `\` just consumed from a plain-character dispatch: the driver
    /// reads one more character and re-dispatches through
    /// `translate_escaped_op`.
    Escape,
    /// `\<`/`\b` at start of word, `\>`/`\b` at end of word, `\B` non-boundary.
    WordBoundary { negate: bool },
    Bow,
    Eow,
    Bob,
    Eob,
    /// `\d`/`\D`/`\s`/`\S`/`\w`/`\W` used outside a `[...]` class (Perl).
    /// Uppercase letters negate the class.
    ClassEscape(char),
}

/// The six-hook dispatch table spec.md's "Syntax Dispatcher" names.
pub trait Dialect: Send + Sync {
    /// If true, operators (`*`, `+`, `?`, `^`, `$`) used where they can't
    /// apply (e.g. a leading `*`) are a syntax error rather than silently
    /// treated as literals.
    fn context_independent_ops(&self) -> bool {
        false
    }

    /// Binding precedence of a token: higher binds tighter. Used to decide
    /// when a new operand opens a fresh precedence band versus continuing
    /// the current one.
    fn precedence(&self, token: &Token) -> usize {
        match token {
            Token::End | Token::CloseGroup => 0,
            Token::Alternate => 1,
            Token::OpenGroup => 2,
            _ => 4,
        }
    }

    /// True if a `$` at the current position is not actually "end of
    /// pattern/group" (so it should be treated as a literal `$` rather than
    /// the end-of-line anchor). Perl's `$)` inside a group is the classic
    /// case.
    fn incomplete_eoi(&self, _cs: &CompileState) -> bool {
        false
    }

    /// Classify a plain (non-escaped) input character.
    fn translate_plain_op(&self, ch: char) -> Token;

    /// Classify the character immediately following a backslash.
    fn translate_escaped_op(&self, ch: char) -> Token;

    /// Emit the byte code for `ch` inside a `[...]` class escape (`\w`,
    /// `\s`, `\d` and their negations). Returns `Ok(true)` if it consumed
    /// the escape, `Ok(false)` if `ch` isn't a class escape this dialect
    /// recognizes (caller falls back to a literal class member).
    fn translate_char_class_escaped_op(
        &self,
        cs: &mut CompileState,
        ch: char,
        class_negated: bool,
    ) -> Result<bool> {
        let flag = if class_negated { 1u8 } else { 0u8 };
        let op = match ch {
            'w' => Opcode::Word,
            's' => Opcode::Space,
            'd' => Opcode::Digit,
            _ => return Ok(false),
        };
        cs.code.store_opcode(op);
        cs.code.store_byte(flag);
        Ok(true)
    }

    /// Emit the byte code for one already-classified token. Dialects
    /// override this only when they need opcode emission to differ (Perl's
    /// reluctant quantifiers); everything else shares `default_compile_opcode`.
    fn compile_opcode(&self, cs: &mut CompileState, token: Token) -> Result<()> {
        default_compile_opcode(self, cs, token)
    }
}

/// The shared opcode-emission body every dialect inherits, ported from
/// `syntax_base<T>::compile_opcode`.
pub fn default_compile_opcode(
    dialect: &(impl Dialect + ?Sized),
    cs: &mut CompileState,
    token: Token,
) -> Result<()> {
    match token {
        Token::End => {
            cs.code.store_opcode(Opcode::End);
        }
        Token::Char(c) | Token::Literal(c) => {
            store_literal(cs, c);
        }
        Token::AnyChar => {
            cs.precedence.set_current_start(cs.code.len());
            cs.code.store_opcode(Opcode::Any);
        }
        Token::Bol => {
            if !cs.at_beginning_context {
                if dialect.context_independent_ops() {
                    return Err(RegexError::IllegalOperator(cs.cursor.offset()));
                }
                store_literal(cs, '^');
                return Ok(());
            }
            cs.precedence.set_current_start(cs.code.len());
            cs.code.store_opcode(Opcode::Bol);
        }
        Token::Eol => {
            if !(cs.cursor.at_end() || dialect.incomplete_eoi(cs)) {
                if dialect.context_independent_ops() {
                    return Err(RegexError::IllegalOperator(cs.cursor.offset()));
                }
                store_literal(cs, '$');
                return Ok(());
            }
            cs.precedence.set_current_start(cs.code.len());
            cs.code.store_opcode(Opcode::Eol);
        }
        Token::Star | Token::Plus | Token::Question => {
            compile_repeat(dialect, cs, token, false)?;
        }
        Token::OpenClass => {
            crate::driver::compile_class(cs, dialect)?;
        }
        Token::OpenBrace => {
            crate::driver::compile_counted_repetition(cs)?;
        }
        Token::Backref(n) => {
            if n == 0 || (n as usize) > cs.next_capture_index {
                return Err(RegexError::IllegalBackref(cs.cursor.offset()));
            }
            // A backreference's operand start is deliberately left alone
            // here (not tracked as an atom): the original doesn't update it
            // for a digit backreference either, so `\1*` quantifies
            // whatever atom preceded the backreference rather than the
            // backreference itself.
            cs.code.store_opcode(Opcode::Backref);
            cs.code.store_byte(n);
            cs.backref_count += 1;
        }
        Token::OpenGroup => {
            let begin_at = cs.code.len();
            // Record this group's start in whichever band is active in the
            // enclosing context before opening a fresh, independent band
            // set for its contents.
            cs.precedence.set_current_start(begin_at);
            cs.code.store_opcode(Opcode::GroupBegin);
            let idx = cs.open_capture(begin_at);
            cs.code.store_byte(idx as u8);
            cs.precedence.push_level(cs.code.len());
        }
        Token::CloseGroup => {
            let open = cs.close_capture()?;
            cs.precedence.pop_level();
            // A closed group is a single atom: rejoin the band ordinary
            // atoms use and point it at the group's own start, so a
            // following `*`/`+`/`?` wraps the whole group rather than
            // whatever was pending in the enclosing context's own band.
            cs.precedence.set_current(crate::precedence::ATOM_BAND);
            cs.precedence.set_current_start(open.begin_at);
            cs.code.store_opcode(Opcode::GroupEnd);
            cs.code.store_byte(open.index as u8);
        }
        Token::Alternate => {
            crate::driver::compile_alternate(cs)?;
        }
        Token::Bow => {
            cs.precedence.set_current_start(cs.code.len());
            cs.code.store_opcode(Opcode::Bow);
        }
        Token::Eow => {
            cs.precedence.set_current_start(cs.code.len());
            cs.code.store_opcode(Opcode::Eow);
        }
        Token::Bob => {
            cs.precedence.set_current_start(cs.code.len());
            cs.code.store_opcode(Opcode::Bob);
        }
        Token::Eob => {
            cs.precedence.set_current_start(cs.code.len());
            cs.code.store_opcode(Opcode::Eob);
        }
        Token::WordBoundary { negate } => {
            cs.precedence.set_current_start(cs.code.len());
            cs.code.store_opcode(Opcode::WordBoundary);
            cs.code.store_byte(if negate { 1 } else { 0 });
        }
        Token::ClassEscape(c) => {
            cs.precedence.set_current_start(cs.code.len());
            let negated = c.is_ascii_uppercase();
            dialect.translate_char_class_escaped_op(cs, c.to_ascii_lowercase(), negated)?;
        }
        Token::Escape => {
            // The driver always resolves `Escape` via `translate_escaped_op`
            // before calling into opcode emission.
            return Err(RegexError::IllegalOperator(cs.cursor.offset()));
        }
    }
    Ok(())
}

fn store_literal(cs: &mut CompileState, c: char) {
    // Every literal char updates the active band's operand start, not just
    // ones that follow a precedence-level change — a run of plain chars at
    // the same band (the common case) still needs a following quantifier
    // to find *this* char's start, not the run's.
    cs.precedence.set_current_start(cs.code.len());
    cs.code.store_opcode(Opcode::Char);
    let mut buf = [0u8; 4];
    cs.code.store_chars(c.encode_utf8(&mut buf));
}

/// `*`/`+`/`?`: splice a `PUSH_FAIL` (and, for `*`/`+`, a trailing `GOTO`
/// back to the operand start) in before the already-emitted operand. `+`
/// additionally needs a `FAKE_FAIL_GOTO` so the mandatory first iteration
/// doesn't consult the failure stack. `reluctant` flips `PUSH_FAIL`'s
/// implicit "prefer more" bias (Perl's `*?`/`+?`/`??`), handled by dialects
/// that override this via `compile_repeat_reluctant` in `driver.rs`.
pub(crate) fn compile_repeat(
    dialect: &(impl Dialect + ?Sized),
    cs: &mut CompileState,
    token: Token,
    reluctant: bool,
) -> Result<()> {
    if cs.at_beginning_context {
        if dialect.context_independent_ops() {
            return Err(RegexError::IllegalOperator(cs.cursor.offset()));
        }
        let c = match token {
            Token::Star => '*',
            Token::Plus => '+',
            Token::Question => '?',
            _ => unreachable!(),
        };
        store_literal(cs, c);
        return Ok(());
    }
    let operand_start = cs.precedence.start(cs.precedence.current());
    if operand_start == cs.code.len() {
        // empty operand: `**`, `(a|)*`'s empty branch, etc. — a no-op.
        return Ok(());
    }
    crate::driver::emit_repeat(cs, token, operand_start, reluctant)
}
