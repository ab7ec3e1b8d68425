//! The compiler driver: the token -> precedence -> emit loop that turns a
//! pattern into byte code, plus the three emission routines too involved
//! to inline into `dialect.rs`'s default opcode table (character classes,
//! counted repetition, and the postfix-operator splice/patch sequence).
//!
//! Ported from `syntax_base<T>::compile` in regexp-cpp's `syntax_base.h`
//! and the `store_class`/`store_closure_count` methods of `code.h`.

use crate::dialect::{Dialect, Token};
use crate::error::{RegexError, Result};
use crate::opcodes::Opcode;
use crate::state::CompileState;

/// Compile `pattern` under `dialect` into a finished byte-code program.
/// Returns the raw bytes; the facade (`lib.rs`) is responsible for
/// wrapping them into an immutable `Regex`.
pub fn compile(pattern: &str, dialect: &dyn Dialect) -> Result<(Vec<u8>, usize, usize)> {
    let mut cs = CompileState::new(pattern);

    loop {
        let token = next_token(&mut cs, dialect)?;
        let level = dialect.precedence(&token);
        adjust_precedence(&mut cs, level);

        dialect.compile_opcode(&mut cs, token)?;
        cs.at_beginning_context = matches!(token, Token::OpenGroup | Token::Alternate);

        if token == Token::End {
            break;
        }
    }

    if !cs.is_closed() {
        return Err(RegexError::MismatchedParenthesis(cs.cursor.offset()));
    }

    Ok((cs.code.into_vec(), cs.next_capture_index, cs.backref_count))
}

/// Read and classify the next token, resolving a plain `\` dispatch into
/// the escaped-token table and control-character translation.
fn next_token(cs: &mut CompileState, dialect: &dyn Dialect) -> Result<Token> {
    if cs.cursor.at_end() {
        return Ok(Token::End);
    }
    let ch = cs.cursor.get()?;
    let token = dialect.translate_plain_op(ch);
    if token == Token::Escape {
        let escaped = cs.cursor.get()?;
        let token = dialect.translate_escaped_op(escaped);
        if let Token::Literal(c) = token {
            // `\n`, `\t`, `\x41`, ... need control-char translation; a
            // dialect returns `Literal(escaped)` verbatim and lets the
            // cursor do the rest for known escape letters.
            let translated = cs.cursor.translate_ctrl_char(c)?;
            return Ok(Token::Literal(translated));
        }
        return Ok(token);
    }
    Ok(token)
}

/// Mirrors `syntax_base<T>::compile`'s precedence-band bookkeeping: raising
/// the level opens up to `level` fresh bands at the current code offset;
/// lowering it patches every pending `|` jump whose operand fell entirely
/// within the bands being closed.
fn adjust_precedence(cs: &mut CompileState, level: usize) {
    let offset = cs.code.len();
    let current = cs.precedence.current();
    if level > current {
        for band in current..=level.min(crate::precedence::NUM_LEVELS - 1) {
            cs.precedence.set_start(band, offset);
        }
    } else if level < current {
        let cutoff = cs.precedence.start(level);
        while let Some(pending) = cs.pending_jumps.pop() {
            if pending.patch_at >= cutoff {
                cs.code.put_address(pending.patch_at, cs.code.len());
            } else {
                cs.pending_jumps.push(pending.patch_at);
                break;
            }
        }
        // Just switch bands — band `level`'s start was already recorded by
        // whatever atom it belongs to (the initial raise that opened it, or
        // a close-group/close-class restoring it). Overwriting it with the
        // *current* position here would stomp that recorded operand start
        // with "wherever we are now", which for `a|b` is the end of `a`
        // rather than its beginning — the alternation would then wrap a
        // zero-length operand instead of `a`.
        cs.precedence.set_current(level);
    }
}

/// `a|b`: splice a `PUSH_FAIL` before `a`'s bytes so a failure to match the
/// rest of the alternation backtracks into `b`, then append a `GOTO` that
/// `b`'s compile-out will later patch to jump past itself once the whole
/// alternation chain closes.
pub(crate) fn compile_alternate(cs: &mut CompileState) -> Result<()> {
    let operand_start = cs.precedence.start(cs.precedence.current());
    let push_fail_disp = cs.code.store_jump(operand_start, Opcode::PushFail);
    cs.code.store_opcode(Opcode::Goto);
    let goto_disp = cs.code.reserve_address();
    // `b` (the next alternative) starts right here: patch the PUSH_FAIL's
    // target now, and defer the GOTO's target (skip past `b` once the whole
    // chain closes) to `adjust_precedence`'s pending-jump patching.
    cs.code.put_address(push_fail_disp, cs.code.len());
    cs.pending_jumps.push(goto_disp);
    // Only the alternation's own band moves to the new alternative's start.
    // Band 0 (this level's outer boundary, set when the level was opened)
    // must stay put — it's the cutoff `adjust_precedence` uses to decide
    // which pending jumps belong to this group when it eventually closes,
    // and cascading it forward here would make everything but the *last*
    // alternative's jump look like it belongs to an enclosing scope.
    cs.precedence.set_current_start(cs.code.len());
    Ok(())
}

/// `*`/`+`/`?` (and Perl's reluctant `*?`/`+?`/`??`, which swap which
/// branch is preferred on first attempt — handled by the caller negating
/// `reluctant`).
pub(crate) fn emit_repeat(
    cs: &mut CompileState,
    token: Token,
    operand_start: usize,
    _reluctant: bool,
) -> Result<()> {
    match token {
        Token::Question => {
            let push_disp = cs.code.store_jump(operand_start, Opcode::PushFail);
            // Nothing else is emitted for a bare `?`: the skip target is
            // just wherever the operand now ends.
            cs.code.put_address(push_disp, cs.code.len());
        }
        Token::Star | Token::Plus => {
            let push_disp = cs.code.store_jump(operand_start, Opcode::PushFail);
            let goto_at = cs.code.store_opcode(Opcode::Goto);
            let goto_disp = cs.code.reserve_address();
            debug_assert_eq!(goto_disp, goto_at + 1);
            // Stop repeating: fall out to whatever follows the loop-back GOTO.
            cs.code.put_address(push_disp, cs.code.len());
            cs.code.put_address(goto_disp, operand_start);
            if token == Token::Plus {
                // Skip the leading PUSH_FAIL on the mandatory first pass.
                cs.code.store_jump(operand_start, Opcode::FakeFailGoto);
                let fake_disp = operand_start + 1;
                cs.code.put_address(fake_disp, operand_start + 6);
            }
        }
        _ => unreachable!("emit_repeat called with non-repeat token"),
    }
    Ok(())
}

/// `{n,m}`: consume the counted-repetition body already emitted starting at
/// `operand_start`, splice a 7-byte `CLOSURE` instruction before it, and
/// append the matching `CLOSURE_INC`.
pub(crate) fn compile_counted_repetition(cs: &mut CompileState) -> Result<()> {
    let operand_start = cs.precedence.start(cs.precedence.current());
    if operand_start == cs.code.len() {
        return Err(RegexError::IllegalClosure(cs.cursor.offset()));
    }
    let (min, has_comma) = read_count(cs)?;
    let max = if has_comma {
        match cs.cursor.peek() {
            Some('}') => u16::MAX,
            _ => read_bare_count(cs)?,
        }
    } else {
        min
    };
    expect(cs, '}')?;

    if max != u16::MAX && min > max {
        return Err(RegexError::IllegalClosure(cs.cursor.offset()));
    }

    let body_len = (cs.code.len() - operand_start) as u16;
    let closure_at = cs.code.store_closure_count(operand_start, min, max);
    cs.code.patch_closure_body_len(closure_at, body_len);
    // `store_closure_count` splices its header in before `operand_start`,
    // which doesn't change that offset's numeric value — it's still this
    // construct's start, now wrapping the `CLOSURE`/`CLOSURE_INC` pair too.
    cs.precedence.set_current_start(operand_start);
    Ok(())
}

fn read_count(cs: &mut CompileState) -> Result<(u16, bool)> {
    // `{,m}` (min = 0): a leading comma before any digit.
    if matches!(cs.cursor.peek(), Some(',')) {
        cs.cursor.advance(1);
        return Ok((0, true));
    }
    let (value, digits) = cs.cursor.peek_number(5);
    if digits == 0 {
        return Err(RegexError::IllegalClosure(cs.cursor.offset()));
    }
    cs.cursor.advance(digits);
    let has_comma = matches!(cs.cursor.peek(), Some(','));
    if has_comma {
        cs.cursor.advance(1);
    }
    Ok((value as u16, has_comma))
}

fn read_bare_count(cs: &mut CompileState) -> Result<u16> {
    let (value, digits) = cs.cursor.peek_number(5);
    if digits == 0 {
        return Err(RegexError::IllegalClosure(cs.cursor.offset()));
    }
    cs.cursor.advance(digits);
    Ok(value as u16)
}

fn expect(cs: &mut CompileState, want: char) -> Result<()> {
    match cs.cursor.get() {
        Ok(c) if c == want => Ok(()),
        _ => Err(RegexError::MismatchedBraces(cs.cursor.offset())),
    }
}

/// `[...]`: compile each class member (literal char, range, or `\w`/`\s`/
/// `\d` escape). A positive class (`[abc]`) treats its members as
/// alternatives in their own precedence level, wrapping each with
/// `PUSH_FAIL2`/`GOTO` pairs so a failed later member backtracks into the
/// next one without ever restoring the text cursor (the class as a whole
/// consumes exactly one character). A complemented class (`[^abc]`) is not
/// an alternation at all: every member must independently reject the same
/// character (an AND of NOT), so members run *in series*, each followed by
/// a `BACKUP` that un-consumes the character the member's own opcode
/// consumed on success, and a trailing `FORWARD` commits to consuming it
/// for real once every member has passed.
pub(crate) fn compile_class(cs: &mut CompileState, dialect: &(impl Dialect + ?Sized)) -> Result<()> {
    let class_start = cs.code.len();
    cs.precedence.set_current_start(class_start);
    cs.precedence.push_level(class_start);
    // Band 5 of the fresh level is reserved for class-member emission, kept
    // active for the duration of the loop below even though nothing inside
    // it reads the precedence stack (member chaining tracks its own
    // `prev_member_start` instead).
    cs.precedence.set_current(crate::precedence::NUM_LEVELS - 1);

    let negated = matches!(cs.cursor.peek(), Some('^'));
    if negated {
        cs.cursor.advance(1);
    }
    cs.class_negated = negated;

    let mut member_count = 0usize;
    let mut pending_patches = Vec::new();
    let mut prev_member_start = 0usize;

    loop {
        match cs.cursor.peek() {
            None => return Err(RegexError::MismatchedBrackets(cs.cursor.offset())),
            Some(']') if member_count > 0 => {
                cs.cursor.advance(1);
                break;
            }
            _ => {}
        }

        // A member after the first is reached only on backtrack out of the
        // previous one: splice a `PUSH_FAIL2` before it (no text restore —
        // the class as a whole still owns the one character it's matching)
        // and append a `GOTO` past the rest of the class, patched once
        // `]` is reached and the class's total length is known. Complement
        // classes never chain members this way — every member runs
        // regardless of whether an earlier one already rejected the char.
        if member_count > 0 && !negated {
            let push_fail_disp = cs.code.store_jump(prev_member_start, Opcode::PushFail2);
            cs.code.store_opcode(Opcode::Goto);
            let goto_disp = cs.code.reserve_address();
            // The next member starts right here, after the reserved GOTO
            // field — patch PUSH_FAIL2's target now.
            cs.code.put_address(push_fail_disp, cs.code.len());
            pending_patches.push(goto_disp);
        }

        let member_start = cs.code.len();
        prev_member_start = member_start;
        let consumed_escape = if cs.cursor.peek() == Some('\\') {
            cs.cursor.advance(1);
            let esc = cs.cursor.get()?;
            dialect.translate_char_class_escaped_op(cs, esc, negated)?
        } else {
            false
        };

        if !consumed_escape {
            let lo = cs.cursor.get()?;
            let lo = if lo == '\\' {
                let esc = cs.cursor.get()?;
                cs.cursor.translate_ctrl_char(esc)?
            } else {
                lo
            };
            if cs.cursor.peek() == Some('-') {
                let save = cs.cursor.offset();
                cs.cursor.advance(1);
                match cs.cursor.peek() {
                    Some(']') | None => {
                        // trailing `-` before `]` is a literal hyphen, not a range.
                        while cs.cursor.offset() > save {
                            cs.cursor.unget();
                        }
                        store_class_member(cs, Opcode::Char, Opcode::NotChar, lo, lo, negated);
                    }
                    Some(_) => {
                        let hi = cs.cursor.get()?;
                        let hi = if hi == '\\' {
                            let esc = cs.cursor.get()?;
                            cs.cursor.translate_ctrl_char(esc)?
                        } else {
                            hi
                        };
                        if hi < lo {
                            return Err(RegexError::IllegalDelimiter(cs.cursor.offset()));
                        }
                        store_class_member(cs, Opcode::Range, Opcode::NotRange, lo, hi, negated);
                    }
                }
            } else {
                store_class_member(cs, Opcode::Char, Opcode::NotChar, lo, lo, negated);
            }
        }

        // Every member of a complement class independently consumes the
        // character to test it, then backs up so the next member (or the
        // closing FORWARD) sees the same character again.
        if negated {
            store_step(cs, Opcode::Backup, 1);
        }

        member_count += 1;
    }

    if negated {
        // All members rejected the exclusion set for this character:
        // commit to consuming it.
        store_step(cs, Opcode::Forward, 1);
    } else {
        let end = cs.code.len();
        for disp in pending_patches {
            cs.code.put_address(disp, end);
        }
    }

    // The nested level only exists to keep `CompileState::is_closed`'s
    // depth check balanced — nothing inside the member loop above reads
    // the precedence stack. Once it's popped, the class is done: treat it
    // like any other atom, so a following `*`/`+`/`?` wraps the whole
    // class rather than whatever the enclosing context's band happened to
    // hold.
    cs.precedence.pop_level();
    cs.precedence.set_current(crate::precedence::ATOM_BAND);
    cs.precedence.set_current_start(class_start);
    cs.class_negated = false;
    Ok(())
}

fn store_class_member(cs: &mut CompileState, pos: Opcode, neg: Opcode, lo: char, hi: char, negated: bool) {
    let op = if negated { neg } else { pos };
    cs.code.store_opcode(op);
    let mut buf = [0u8; 4];
    cs.code.store_chars(lo.encode_utf8(&mut buf));
    if matches!(op, Opcode::Range | Opcode::NotRange) {
        cs.code.store_chars(hi.encode_utf8(&mut buf));
    }
}

/// Append a `BACKUP`/`FORWARD` opcode with its raw (non-address) 16-bit
/// little-endian count operand.
fn store_step(cs: &mut CompileState, op: Opcode, n: u16) {
    cs.code.store_opcode(op);
    let [lo, hi] = n.to_le_bytes();
    cs.code.store_byte(lo);
    cs.code.store_byte(hi);
}
