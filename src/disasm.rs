use std::fmt;

use crate::decode::decode;
use crate::op::ChipOp;

/// One decoded instruction of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub addr: usize,
    pub word: u16,
    pub op: ChipOp,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#05X}  {:04X}  {}", self.addr, self.word, self.op)
    }
}

/// Lazy listing over a byte buffer, see [`disassemble`].
#[derive(Debug, Clone)]
pub struct Disassembly<'a> {
    bytes: &'a [u8],
    addr: usize,
}

/// Walk `bytes` two at a time from offset `start`, decoding each word.
///
/// Addresses are offsets into `bytes`, so passing the whole of machine memory
/// yields real CHIP-8 addresses. A trailing odd byte is dropped.
pub fn disassemble(bytes: &[u8], start: usize) -> Disassembly<'_> {
    Disassembly { bytes, addr: start }
}

impl Iterator for Disassembly<'_> {
    type Item = Line;

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.addr.checked_add(2)?;
        let pair = self.bytes.get(self.addr..end)?;
        let word = u16::from_be_bytes([pair[0], pair[1]]);
        let line = Line {
            addr: self.addr,
            word,
            op: decode(word).op,
        };
        self.addr += 2;
        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.bytes.len().saturating_sub(self.addr) / 2;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Disassembly<'_> {}
