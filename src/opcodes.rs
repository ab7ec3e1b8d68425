//! The closed byte-code opcode set.
//!
//! Ported from the `enum opcodes` in regexp-cpp's `tokens.h`, widened where
//! the original packs multiple opcodes for a negated/non-negated pair into
//! one opcode-plus-flag-byte form (`Digit`/`Space`/`Word`/`WordBoundary`),
//! matching how `OP_DIGIT`/`OP_SPACE`/`OP_WORD` actually work there.

/// A single instruction tag in a compiled program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// Marks successful completion of the program.
    End = 0,
    /// No-op, used as a placeholder target for patched jumps.
    Noop,
    /// Step the text cursor backward by a fixed count (used by lookbehind-free
    /// reluctant-quantifier bookkeeping).
    Backup,
    /// Step the text cursor forward by a fixed count.
    Forward,
    /// Matches only at the beginning of a line.
    Bol,
    /// Matches only at the end of a line.
    Eol,
    /// A length-prefixed literal run of characters (optimizer's collapsed form).
    String,
    /// A single literal character.
    Char,
    /// A single literal character, case-insensitively negated.
    NotChar,
    /// Any character (except newline, dialect-dependent).
    Any,
    /// One character drawn from a bitmap-encoded class.
    BinChar,
    /// One character *not* drawn from a bitmap-encoded class.
    NotBinChar,
    /// One character within an inclusive range.
    Range,
    /// One character outside an inclusive range.
    NotRange,
    /// Marks the start of a capturing group.
    GroupBegin,
    /// Marks the end of a capturing group.
    GroupEnd,
    /// Matches the text previously captured by a capturing group.
    Backref,
    /// Unconditional jump.
    Goto,
    /// Pushes a failure frame capturing both code and text position.
    PushFail,
    /// Pushes a failure frame capturing only the code position (no text
    /// restore on backtrack) — see spec's `PUSH_FAIL2` semantics.
    PushFail2,
    /// Discards the top failure frame without backtracking.
    PopFail,
    /// Discards the top failure frame, then jumps.
    PopFailGoto,
    /// Jumps without consulting or altering the failure stack.
    FakeFailGoto,
    /// Begins a counted repetition, carrying (min, max, body length).
    Closure,
    /// Increments the active closure counter and loops if `can_continue()`.
    ClosureInc,
    /// Matches only at the very beginning of the text.
    Bob,
    /// Matches only at the very end of the text.
    Eob,
    /// Matches only at the beginning of a word.
    Bow,
    /// Matches only at the end of a word.
    Eow,
    /// One character, its "is a digit" sense controlled by a following flag
    /// byte (0 = digit, 1 = non-digit).
    Digit,
    /// One character, its "is whitespace" sense controlled by a following
    /// flag byte.
    Space,
    /// One character, its "is a word character" sense controlled by a
    /// following flag byte.
    Word,
    /// Zero-width word/non-word boundary, sense controlled by a following
    /// flag byte (0 = boundary, 1 = non-boundary).
    WordBoundary,
}

impl Opcode {
    /// Decode a raw byte into an `Opcode`, or `None` if it doesn't correspond
    /// to any variant (a corrupted/hand-built program).
    pub fn from_u8(b: u8) -> Option<Opcode> {
        use Opcode::*;
        const TABLE: [Opcode; 32] = [
            End, Noop, Backup, Forward, Bol, Eol, String, Char, NotChar, Any, BinChar, NotBinChar,
            Range, NotRange, GroupBegin, GroupEnd, Backref, Goto, PushFail, PushFail2, PopFail,
            PopFailGoto, FakeFailGoto, Closure, ClosureInc, Bob, Eob, Bow, Eow, Digit, Space,
            Word,
        ];
        // WordBoundary sits past the 32-entry const array above; handle it here.
        if b == WordBoundary as u8 {
            return Some(WordBoundary);
        }
        TABLE.get(b as usize).copied()
    }
}
