//! 6502 memory subsystem.
//!
//! A flat 64K byte array. Every 16-bit value is a valid address, so reads
//! and writes cannot fail; block operations wrap from 0xFFFF back to 0x0000.

/// The number of addressable bytes.
pub const MEMORY_SIZE: usize = 0x1_0000;

/// First byte of the stack page.
pub const STACK_BASE: u16 = 0x0100;

/// 64K of zero-filled RAM.
#[derive(Clone)]
pub struct Memory {
    cells: Vec<u8>,
}

impl Memory {
    /// Create a new memory with all bytes zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        self.cells[addr as usize]
    }

    #[inline]
    pub fn write(&mut self, addr: u16, value: u8) {
        self.cells[addr as usize] = value;
    }

    /// Read a little-endian word whose high byte sits at `addr + 1`.
    pub fn read_word(&self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Copy `bytes` in starting at `start`. Addresses past 0xFFFF wrap to 0x0000.
    pub fn load(&mut self, start: u16, bytes: &[u8]) {
        let mut addr = start;
        for &b in bytes {
            self.write(addr, b);
            addr = addr.wrapping_add(1);
        }
    }

    /// `count` bytes starting at `start`, wrapping past the top of memory.
    pub fn dump(&self, start: u16, count: usize) -> Vec<(u16, u8)> {
        (0..count.min(MEMORY_SIZE))
            .map(|i| {
                let addr = start.wrapping_add(i as u16);
                (addr, self.read(addr))
            })
            .collect()
    }

    /// One 256-byte page.
    pub fn page(&self, page: u8) -> &[u8] {
        let start = (page as usize) << 8;
        &self.cells[start..start + 0x100]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let non_zero = self.cells.iter().filter(|&&b| b != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_bytes", &non_zero)
            .field("total_bytes", &MEMORY_SIZE)
            .finish()
    }
}
