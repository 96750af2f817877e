use crate::consts::{ADDR_MASK, RAM_SIZE};

/// 4KB of CHIP-8 RAM. Every access through [`Memory::at`] and friends wraps
/// at 12 bits, so I and PC can never index past the end.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory(pub [u8; RAM_SIZE]);
impl Default for Memory {
    fn default() -> Self {
        Self([0; RAM_SIZE])
    }
}
impl std::ops::Deref for Memory {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl std::ops::DerefMut for Memory {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Memory {
    #[inline]
    pub fn at(&self, addr: u16) -> u8 {
        self.0[(addr & ADDR_MASK) as usize]
    }

    #[inline]
    pub fn at_mut(&mut self, addr: u16) -> &mut u8 {
        &mut self.0[(addr & ADDR_MASK) as usize]
    }

    /// Big-endian instruction word at `addr`.
    pub fn word(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.at(addr), self.at(addr.wrapping_add(1))])
    }
}
