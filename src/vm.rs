//! The backtracking execution VM.
//!
//! Ported from `re_engine::exec_match`/`exec_search` in regexp-cpp's
//! `engine.h`, and `re_closure`'s `closed()`/`can_continue()` pair for
//! `{n,m}` bookkeeping. Failure frames, the per-capture undo log, and the
//! closure-count table are kept as three small stacks instead of the
//! original's single combined failure stack, since Rust's ownership rules
//! make "restore whatever this frame captured" clearer as a tagged log than
//! as a union of frame shapes.

use crate::charclass;
use crate::error::{RegexError, Result};
use crate::opcodes::Opcode;

/// Runtime knobs that don't change the compiled program, only how it's
/// executed. Ported from the teacher's `ExecLimits`, generalized with the
/// two case-folding modes spec.md §4.1 distinguishes.
#[derive(Debug, Clone, Copy)]
pub struct ExecLimits {
    /// Fold both pattern and text to uppercase before comparing.
    pub case_insensitive: bool,
    /// Fold only a lowercase pattern letter; an uppercase pattern letter
    /// matches only itself.
    pub lower_only_insensitive: bool,
    /// Backtracking depth at which a match attempt aborts with
    /// `ClosureStackOverflow` instead of exhausting memory on a
    /// catastrophic pattern.
    pub max_closure_stack_depth: usize,
}

impl Default for ExecLimits {
    fn default() -> Self {
        ExecLimits {
            case_insensitive: false,
            lower_only_insensitive: false,
            max_closure_stack_depth: 4096,
        }
    }
}

/// The result of a successful match: the overall span plus each capturing
/// group's span (`None` for a group the match path never entered).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub start: usize,
    pub end: usize,
    pub captures: Vec<Option<(usize, usize)>>,
}

struct FailFrame {
    code_pos: usize,
    /// `None` reproduces `PUSH_FAIL2`'s "don't restore the text cursor on
    /// backtrack" behavior.
    text_pos: Option<usize>,
    undo_len: usize,
}

enum Undo {
    Capture(usize, Option<(usize, usize)>),
    Closure(usize, u32),
}

/// One match attempt against `text`, starting the program over from byte 0
/// anchored at a caller-chosen text position.
pub struct Vm<'a> {
    code: &'a [u8],
    text: &'a [char],
    limits: &'a ExecLimits,
    fail_stack: Vec<FailFrame>,
    undo_log: Vec<Undo>,
    closure_counts: std::collections::HashMap<usize, u32>,
    captures: Vec<Option<(usize, usize)>>,
    open_starts: Vec<Option<usize>>,
}

impl<'a> Vm<'a> {
    pub fn new(code: &'a [u8], text: &'a [char], limits: &'a ExecLimits, num_captures: usize) -> Self {
        Vm {
            code,
            text,
            limits,
            fail_stack: Vec::new(),
            undo_log: Vec::new(),
            closure_counts: std::collections::HashMap::new(),
            captures: vec![None; num_captures],
            open_starts: vec![None; num_captures],
        }
    }

    /// Attempt the program anchored exactly at `start`. `None` means the
    /// program ran to exhaustion of its failure stack without reaching
    /// `END`; `Some` is a successful match.
    pub fn run(&mut self, start: usize) -> Result<Option<MatchResult>> {
        let mut pc = 0usize;
        let mut pos = start;

        loop {
            let op = Opcode::from_u8(*self.code.get(pc).ok_or(RegexError::InvalidProgram)?)
                .ok_or(RegexError::InvalidProgram)?;

            let advanced = match op {
                Opcode::End => {
                    return Ok(Some(MatchResult {
                        start,
                        end: pos,
                        captures: self.captures.clone(),
                    }));
                }
                Opcode::Noop => {
                    pc += 1;
                    true
                }
                Opcode::Bol => {
                    if pos == 0 || self.text[pos - 1] == '\n' {
                        pc += 1;
                        true
                    } else {
                        false
                    }
                }
                Opcode::Eol => {
                    if pos == self.text.len() || self.text[pos] == '\n' {
                        pc += 1;
                        true
                    } else {
                        false
                    }
                }
                Opcode::Bob => {
                    if pos == 0 {
                        pc += 1;
                        true
                    } else {
                        false
                    }
                }
                Opcode::Eob => {
                    if pos == self.text.len() {
                        pc += 1;
                        true
                    } else {
                        false
                    }
                }
                Opcode::Bow => {
                    let before = pos.checked_sub(1).map(|i| self.text[i]);
                    let after = self.text.get(pos).copied();
                    if charclass::is_word_boundary(before, after) && after.map(charclass::is_word_char).unwrap_or(false) {
                        pc += 1;
                        true
                    } else {
                        false
                    }
                }
                Opcode::Eow => {
                    let before = pos.checked_sub(1).map(|i| self.text[i]);
                    let after = self.text.get(pos).copied();
                    if charclass::is_word_boundary(before, after) && before.map(charclass::is_word_char).unwrap_or(false) {
                        pc += 1;
                        true
                    } else {
                        false
                    }
                }
                Opcode::WordBoundary => {
                    let negate = *self.code.get(pc + 1).ok_or(RegexError::InvalidProgram)? != 0;
                    let before = pos.checked_sub(1).map(|i| self.text[i]);
                    let after = self.text.get(pos).copied();
                    let at_boundary = charclass::is_word_boundary(before, after);
                    if at_boundary != negate {
                        pc += 2;
                        true
                    } else {
                        false
                    }
                }
                Opcode::Any => {
                    if pos < self.text.len() && self.text[pos] != '\n' {
                        pos += 1;
                        pc += 1;
                        true
                    } else {
                        false
                    }
                }
                Opcode::Char | Opcode::NotChar => {
                    let len = *self.code.get(pc + 1).ok_or(RegexError::InvalidProgram)? as usize;
                    let c = self.decode_char(pc + 2, len)?;
                    let matched = pos < self.text.len() && self.char_eq(c, self.text[pos]);
                    let matched = if op == Opcode::NotChar { !matched } else { matched };
                    if matched && pos < self.text.len() {
                        pos += 1;
                        pc += 2 + len;
                        true
                    } else {
                        false
                    }
                }
                Opcode::String => {
                    let len = *self.code.get(pc + 1).ok_or(RegexError::InvalidProgram)? as usize;
                    let bytes = self
                        .code
                        .get(pc + 2..pc + 2 + len)
                        .ok_or(RegexError::InvalidProgram)?;
                    let s = std::str::from_utf8(bytes).map_err(|_| RegexError::InvalidProgram)?;
                    let n = s.chars().count();
                    if pos + n <= self.text.len()
                        && s.chars().zip(&self.text[pos..pos + n]).all(|(a, b)| self.char_eq(a, *b))
                    {
                        pos += n;
                        pc += 2 + len;
                        true
                    } else {
                        false
                    }
                }
                Opcode::BinChar | Opcode::NotBinChar => {
                    let len = *self.code.get(pc + 1).ok_or(RegexError::InvalidProgram)? as usize;
                    let c = self.decode_char(pc + 2, len)?;
                    // Unlike CHAR/NOT_CHAR, these never fold case — an exact
                    // byte-for-byte compare regardless of ExecLimits.
                    let matched = pos < self.text.len() && c == self.text[pos];
                    let matched = if op == Opcode::NotBinChar { !matched } else { matched };
                    if matched && pos < self.text.len() {
                        pos += 1;
                        pc += 2 + len;
                        true
                    } else {
                        false
                    }
                }
                Opcode::Range | Opcode::NotRange => {
                    let lo_len = *self.code.get(pc + 1).ok_or(RegexError::InvalidProgram)? as usize;
                    let lo = self.decode_char(pc + 2, lo_len)?;
                    let hi_off = pc + 2 + lo_len;
                    let hi_len = *self.code.get(hi_off).ok_or(RegexError::InvalidProgram)? as usize;
                    let hi = self.decode_char(hi_off + 1, hi_len)?;
                    let total = 2 + lo_len + 1 + hi_len;
                    let matched = pos < self.text.len() && self.in_range(self.text[pos], lo, hi);
                    let matched = if op == Opcode::NotRange { !matched } else { matched };
                    if matched && pos < self.text.len() {
                        pos += 1;
                        pc += total;
                        true
                    } else {
                        false
                    }
                }
                Opcode::Digit | Opcode::Space | Opcode::Word => {
                    let negate = *self.code.get(pc + 1).ok_or(RegexError::InvalidProgram)? != 0;
                    let c = self.text.get(pos).copied();
                    let class_match = match (op, c) {
                        (Opcode::Digit, Some(c)) => charclass::is_digit(c),
                        (Opcode::Space, Some(c)) => charclass::is_space(c),
                        (Opcode::Word, Some(c)) => charclass::is_word_char(c),
                        (_, None) => false,
                        _ => unreachable!(),
                    };
                    let matched = class_match != negate;
                    if matched && c.is_some() {
                        pos += 1;
                        pc += 2;
                        true
                    } else {
                        false
                    }
                }
                Opcode::GroupBegin => {
                    let idx = *self.code.get(pc + 1).ok_or(RegexError::InvalidProgram)? as usize;
                    if idx < self.open_starts.len() {
                        self.open_starts[idx] = Some(pos);
                    }
                    pc += 2;
                    true
                }
                Opcode::GroupEnd => {
                    let idx = *self.code.get(pc + 1).ok_or(RegexError::InvalidProgram)? as usize;
                    if let Some(start_pos) = self.open_starts.get(idx).copied().flatten() {
                        let old = self.captures[idx];
                        self.undo_log.push(Undo::Capture(idx, old));
                        self.captures[idx] = Some((start_pos, pos));
                    }
                    pc += 2;
                    true
                }
                Opcode::Backref => {
                    let idx = *self.code.get(pc + 1).ok_or(RegexError::InvalidProgram)? as usize;
                    match self.captures.get(idx.saturating_sub(1)).copied().flatten() {
                        Some((s, e)) => {
                            let n = e - s;
                            let captured = &self.text[s..e];
                            if pos + n <= self.text.len()
                                && captured.iter().zip(&self.text[pos..pos + n]).all(|(a, b)| self.char_eq(*a, *b))
                            {
                                pos += n;
                                pc += 2;
                                true
                            } else {
                                false
                            }
                        }
                        None => false,
                    }
                }
                Opcode::Goto => {
                    pc = self.read_address(pc + 1)?;
                    true
                }
                Opcode::PushFail => {
                    let target = self.read_address(pc + 1)?;
                    self.push_fail(target, Some(pos))?;
                    pc += 3;
                    true
                }
                Opcode::PushFail2 => {
                    let target = self.read_address(pc + 1)?;
                    self.push_fail(target, None)?;
                    pc += 3;
                    true
                }
                Opcode::PopFail => {
                    self.fail_stack.pop();
                    pc += 1;
                    true
                }
                Opcode::PopFailGoto => {
                    self.fail_stack.pop();
                    pc = self.read_address(pc + 1)?;
                    true
                }
                Opcode::FakeFailGoto => {
                    pc = self.read_address(pc + 1)?;
                    true
                }
                Opcode::Closure => {
                    let addr = pc;
                    let min = self.read_u16(pc + 1)?;
                    let max = self.read_u16(pc + 3)?;
                    let body_len = self.read_u16(pc + 5)? as usize;
                    let body_start = pc + 7;
                    let after = body_start + body_len + 3; // ClosureInc opcode + 2-byte backref
                    let count = *self.closure_counts.get(&addr).unwrap_or(&0);
                    if count as u32 >= max as u32 {
                        pc = after;
                    } else if (count as u32) < min as u32 {
                        pc = body_start;
                    } else {
                        self.push_fail(after, Some(pos))?;
                        pc = body_start;
                    }
                    true
                }
                Opcode::ClosureInc => {
                    let closure_at = self.read_address(pc + 1)?;
                    let old = *self.closure_counts.get(&closure_at).unwrap_or(&0);
                    self.undo_log.push(Undo::Closure(closure_at, old));
                    self.closure_counts.insert(closure_at, old + 1);
                    pc = closure_at;
                    true
                }
                Opcode::Backup => {
                    let n = self.read_u16(pc + 1)? as usize;
                    pos = pos.saturating_sub(n);
                    pc += 3;
                    true
                }
                Opcode::Forward => {
                    let n = self.read_u16(pc + 1)? as usize;
                    if pos + n <= self.text.len() {
                        pos += n;
                        pc += 3;
                        true
                    } else {
                        false
                    }
                }
            };

            if !advanced && !self.backtrack(&mut pc, &mut pos) {
                return Ok(None);
            }
        }
    }

    fn push_fail(&mut self, target: usize, text_pos: Option<usize>) -> Result<()> {
        if self.fail_stack.len() >= self.limits.max_closure_stack_depth {
            return Err(RegexError::ClosureStackOverflow);
        }
        self.fail_stack.push(FailFrame {
            code_pos: target,
            text_pos,
            undo_len: self.undo_log.len(),
        });
        Ok(())
    }

    fn backtrack(&mut self, pc: &mut usize, pos: &mut usize) -> bool {
        let frame = match self.fail_stack.pop() {
            Some(f) => f,
            None => return false,
        };
        while self.undo_log.len() > frame.undo_len {
            match self.undo_log.pop().unwrap() {
                Undo::Capture(idx, old) => self.captures[idx] = old,
                Undo::Closure(addr, old) => {
                    self.closure_counts.insert(addr, old);
                }
            }
        }
        if let Some(text_pos) = frame.text_pos {
            *pos = text_pos;
        }
        *pc = frame.code_pos;
        true
    }

    fn decode_char(&self, at: usize, len: usize) -> Result<char> {
        let bytes = self.code.get(at..at + len).ok_or(RegexError::InvalidProgram)?;
        let s = std::str::from_utf8(bytes).map_err(|_| RegexError::InvalidProgram)?;
        s.chars().next().ok_or(RegexError::InvalidProgram)
    }

    fn read_u16(&self, at: usize) -> Result<u16> {
        let lo = *self.code.get(at).ok_or(RegexError::InvalidProgram)?;
        let hi = *self.code.get(at + 1).ok_or(RegexError::InvalidProgram)?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    fn read_address(&self, at: usize) -> Result<usize> {
        let disp = self.read_u16(at)? as i16;
        Ok((at as i64 + 2 + disp as i64) as usize)
    }

    fn char_eq(&self, pattern_char: char, text_char: char) -> bool {
        charclass::chars_equal(
            pattern_char,
            text_char,
            self.limits.case_insensitive,
            self.limits.lower_only_insensitive,
        )
    }

    fn in_range(&self, c: char, lo: char, hi: char) -> bool {
        if (lo..=hi).contains(&c) {
            return true;
        }
        if self.limits.case_insensitive || self.limits.lower_only_insensitive {
            let folded = c.to_ascii_uppercase();
            return (lo.to_ascii_uppercase()..=hi.to_ascii_uppercase()).contains(&folded);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::CodeBuffer;

    fn run_program(code: &[u8], text: &str, limits: &ExecLimits, n_captures: usize) -> Option<MatchResult> {
        let chars: Vec<char> = text.chars().collect();
        let mut vm = Vm::new(code, &chars, limits, n_captures);
        vm.run(0).unwrap()
    }

    #[test]
    fn matches_a_single_literal_char() {
        let mut c = CodeBuffer::new();
        c.store_opcode(Opcode::Char);
        c.store_chars("a");
        c.store_opcode(Opcode::End);
        let code = c.into_vec();
        let limits = ExecLimits::default();
        let m = run_program(&code, "a", &limits, 0).unwrap();
        assert_eq!((m.start, m.end), (0, 1));
    }

    #[test]
    fn fails_without_leftover_fail_frames() {
        let mut c = CodeBuffer::new();
        c.store_opcode(Opcode::Char);
        c.store_chars("a");
        c.store_opcode(Opcode::End);
        let code = c.into_vec();
        let limits = ExecLimits::default();
        assert!(run_program(&code, "b", &limits, 0).is_none());
    }

    #[test]
    fn star_backtracks_to_zero_repeats() {
        // Equivalent to `a*b` applied to "b": PUSH_FAIL skip-target wraps
        // CHAR 'a', then GOTO back, ending in CHAR 'b'.
        let mut c = CodeBuffer::new();
        let operand_start = c.len();
        c.store_opcode(Opcode::Char);
        c.store_chars("a");
        c.store_jump(operand_start, Opcode::PushFail);
        let goto_at = c.store_opcode(Opcode::Goto);
        let goto_disp = c.reserve_address();
        assert_eq!(goto_disp, goto_at + 1);
        c.put_address(goto_disp, operand_start);
        let push_disp = operand_start + 1;
        let after_loop = c.len();
        c.put_address(push_disp, after_loop);
        c.store_opcode(Opcode::Char);
        c.store_chars("b");
        c.store_opcode(Opcode::End);
        let code = c.into_vec();
        let limits = ExecLimits::default();
        let m = run_program(&code, "b", &limits, 0).unwrap();
        assert_eq!((m.start, m.end), (0, 1));
    }
}
