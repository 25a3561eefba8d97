//! Memory and I/O bus interface.

/// Memory and I/O bus interface.
///
/// The CPU reaches RAM, ROM and memory-mapped devices only through this
/// trait. The bus decodes the address, applies any device side effects and
/// returns the value driven on the data lines.
pub trait Bus {
    /// Read a byte, applying device side effects.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte, applying device side effects.
    fn write(&mut self, address: u16, value: u8);

    /// Read a byte without side effects (for tracing and inspection).
    fn peek(&self, address: u16) -> u8;

    /// Advance the system clock by `cycles` CPU cycles.
    ///
    /// Called once per instruction, after it completes. Buses without a
    /// clock can ignore it.
    fn tick(&mut self, cycles: u32) {
        let _ = cycles;
    }
}

/// Flat 64KB RAM with no devices. Used by CPU tests.
pub struct SimpleBus {
    ram: Box<[u8; 0x10000]>,
    cycles: u64,
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; 0x10000]),
            cycles: 0,
        }
    }

    /// Copy `data` into memory starting at `address`, wrapping at $FFFF.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.ram[usize::from(addr)] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Total cycles reported through [`Bus::tick`].
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.ram[usize::from(address)] = value;
    }

    fn peek(&self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }

    fn tick(&mut self, cycles: u32) {
        self.cycles += u64::from(cycles);
    }
}
