//! The compiler's shared workspace, threaded by reference through every
//! token-handling call.
//!
//! Ported from `re_compile_state` in regexp-cpp's `compile.h`: everything
//! the driver and the dialect hooks need to see and mutate in lock-step,
//! gathered into one struct instead of being passed as a dozen separate
//! arguments.

use crate::code::CodeBuffer;
use crate::cursor::Cursor;
use crate::error::{RegexError, Result};
use crate::precedence::{PendingJumpStack, PrecedenceStack};

/// One still-open capturing group: its index and the code offset where its
/// `GROUP_BEGIN` was emitted (needed to size the closure body for groups
/// inside `{n,m}`).
#[derive(Debug, Clone, Copy)]
pub struct OpenCapture {
    pub index: usize,
    pub begin_at: usize,
}

/// The full mutable state threaded through compilation of one pattern.
pub struct CompileState {
    pub cursor: Cursor,
    pub code: CodeBuffer,
    pub precedence: PrecedenceStack,
    pub pending_jumps: PendingJumpStack,
    /// True while nothing but zero-width/anchors have been emitted since
    /// the start of the pattern or the last `(`/`|` — controls whether `^`
    /// is an anchor or a literal in dialects where that's context-sensitive.
    pub at_beginning_context: bool,
    /// True while inside a `[^...]` class (negation toggles which opcode
    /// the class members compile to).
    pub class_negated: bool,
    pub next_capture_index: usize,
    pub open_captures: Vec<OpenCapture>,
    pub backref_count: usize,
}

impl CompileState {
    pub fn new(pattern: &str) -> Self {
        let cursor = Cursor::new(pattern);
        let start = 0;
        CompileState {
            cursor,
            code: CodeBuffer::new(),
            precedence: PrecedenceStack::new(start),
            pending_jumps: PendingJumpStack::new(),
            at_beginning_context: true,
            class_negated: false,
            next_capture_index: 0,
            open_captures: Vec::new(),
            backref_count: 0,
        }
    }

    /// Allocate the next capture-group index, pushing an `OpenCapture`
    /// record for the group currently being opened.
    pub fn open_capture(&mut self, begin_at: usize) -> usize {
        let index = self.next_capture_index;
        self.next_capture_index += 1;
        self.open_captures.push(OpenCapture { index, begin_at });
        index
    }

    /// Close the innermost open capture, returning its record.
    pub fn close_capture(&mut self) -> Result<OpenCapture> {
        self.open_captures
            .pop()
            .ok_or(RegexError::MismatchedParenthesis(self.cursor.offset()))
    }

    /// Spec.md's compile-closure invariant: a successful compile must leave
    /// the pending-jump stack empty, no open captures, and the precedence
    /// stack back to its single base level.
    pub fn is_closed(&self) -> bool {
        self.pending_jumps.is_empty() && self.open_captures.is_empty() && self.precedence.depth() == 1
    }
}
