//! Single-pass optimizer: collapse a run of two or more literal `CHAR`
//! opcodes into one length-prefixed `STRING` opcode.
//!
//! Ported from `exec_optimize` in regexp-cpp's `engine.h`. The original
//! also carried a secondary "already optimized" flag that never did
//! anything beyond memoizing a call that's idempotent anyway; per
//! spec.md's Design Notes this is deliberately not ported (see DESIGN.md).

use crate::error::{RegexError, Result};
use crate::opcodes::Opcode;

/// Scan `code` for a single leading run of two or more `CHAR` instructions
/// (opcode byte + 1-byte length + UTF-8 payload) followed immediately by
/// `END`, and collapse that run into one `STRING` instruction. Returns
/// `Ok(true)` if a collapse happened, `Ok(false)` if the program didn't
/// match that shape (nothing to optimize — not an error).
pub fn optimize(code: &mut Vec<u8>) -> Result<bool> {
    if code.is_empty() {
        return Err(RegexError::InvalidState);
    }

    let mut runs = Vec::new();
    let mut i = 0;
    while i < code.len() {
        let op = Opcode::from_u8(code[i]).ok_or(RegexError::InvalidProgram)?;
        match op {
            Opcode::Char => {
                let len = *code.get(i + 1).ok_or(RegexError::InvalidProgram)? as usize;
                runs.push((i, 2 + len));
                i += 2 + len;
            }
            Opcode::End => break,
            _ => return Ok(false),
        }
    }

    if runs.len() < 2 {
        return Ok(false);
    }

    let first = runs[0].0;
    let total_payload: usize = runs
        .iter()
        .map(|&(at, span)| {
            let len = code[at + 1] as usize;
            let _ = span;
            len
        })
        .sum();
    if total_payload > u8::MAX as usize {
        return Ok(false);
    }

    let mut merged = Vec::with_capacity(2 + total_payload);
    merged.push(Opcode::String as u8);
    merged.push(total_payload as u8);
    for &(at, _) in &runs {
        let len = code[at + 1] as usize;
        merged.extend_from_slice(&code[at + 2..at + 2 + len]);
    }

    let end = runs.last().unwrap().0 + runs.last().unwrap().1;
    code.splice(first..end, merged);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::CodeBuffer;

    #[test]
    fn collapses_three_chars_into_one_string() {
        let mut c = CodeBuffer::new();
        c.store_opcode(Opcode::Char);
        c.store_chars("a");
        c.store_opcode(Opcode::Char);
        c.store_chars("b");
        c.store_opcode(Opcode::Char);
        c.store_chars("c");
        c.store_opcode(Opcode::End);
        let mut bytes = c.into_vec();
        let changed = optimize(&mut bytes).unwrap();
        assert!(changed);
        assert_eq!(bytes[0], Opcode::String as u8);
        assert_eq!(bytes[1], 3);
        assert_eq!(&bytes[2..5], b"abc");
    }

    #[test]
    fn leaves_single_char_alone() {
        let mut c = CodeBuffer::new();
        c.store_opcode(Opcode::Char);
        c.store_chars("a");
        c.store_opcode(Opcode::End);
        let mut bytes = c.into_vec();
        assert!(!optimize(&mut bytes).unwrap());
    }

    #[test]
    fn rejects_empty_program() {
        let mut bytes = Vec::new();
        assert!(optimize(&mut bytes).is_err());
    }
}
