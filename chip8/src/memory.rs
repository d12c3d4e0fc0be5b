//! Main memory.
use crate::constants::*;

/// Flat 4 KiB address space holding fonts, program and scratch data.
///
/// Addresses computed by instructions are masked to 12 bits, so reads
/// and writes wrap around the end of memory instead of panicking.
pub struct Memory {
    ram: Box<[u8; MEM_SIZE]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            ram: Box::new([0; MEM_SIZE]),
        }
    }
}

impl Memory {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline(always)]
    pub fn read(&self, addr: usize) -> u8 {
        self.ram[addr & ADDRESS_MASK as usize]
    }

    #[inline(always)]
    pub fn write(&mut self, addr: usize, value: u8) {
        self.ram[addr & ADDRESS_MASK as usize] = value;
    }

    /// Big-endian instruction word at the given address.
    #[inline(always)]
    pub fn word(&self, addr: usize) -> u16 {
        u16::from_be_bytes([self.read(addr), self.read(addr + 1)])
    }

    /// Borrow a range of memory, or `None` if it would run past the end.
    pub fn slice(&self, addr: usize, len: usize) -> Option<&[u8]> {
        self.ram.get(addr..addr.checked_add(len)?)
    }

    /// Copy bytes into memory starting at `offset`.
    ///
    /// Nothing is written when the data doesn't fit.
    pub fn load(&mut self, offset: usize, bytes: &[u8]) -> bool {
        match offset
            .checked_add(bytes.len())
            .and_then(|end| self.ram.get_mut(offset..end))
        {
            Some(dest) => {
                dest.copy_from_slice(bytes);
                true
            }
            None => false,
        }
    }

    /// Erase the entire address space.
    pub fn clear(&mut self) {
        self.ram.fill(0);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.ram[..]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_address_wraps() {
        let mut mem = Memory::new();
        mem.write(0x1000, 0xAB);
        assert_eq!(mem.read(0x000), 0xAB);
        mem.write(0xFFF, 0x12);
        assert_eq!(mem.word(0xFFF), 0x12AB);
    }

    #[test]
    fn test_load_bounds() {
        let mut mem = Memory::new();
        assert!(mem.load(MEM_START, &[0xFF; MAX_PROGRAM_SIZE]));
        assert_eq!(mem.read(MEM_SIZE - 1), 0xFF);

        mem.clear();
        assert!(!mem.load(MEM_START, &[0xFF; MAX_PROGRAM_SIZE + 1]));
        assert!(mem.as_slice().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_slice() {
        let mem = Memory::new();
        assert_eq!(mem.slice(MEM_SIZE - 2, 2).map(<[u8]>::len), Some(2));
        assert!(mem.slice(MEM_SIZE - 2, 3).is_none());
        assert!(mem.slice(usize::MAX, 2).is_none());
    }
}
