//! NES bus: CPU address routing.
//!
//! Every CPU access goes through one path: look up the page tag, perform the
//! access (catching the PPU up first if the page is the PPU window), then
//! drive the open-bus latch with the byte that ended up on the data bus.
//! Reads of unmapped pages return the latch unchanged.

use emu_core::{Bus, Coprocessor};
use nes_cartridge::Cartridge;
use tracing::trace;

use crate::NesError;
use crate::clock::Clock;
use crate::config::NesRegion;
use crate::memory::{Memory, Page, PageTable};
use crate::ppu::Ppu;

/// The NES bus, implementing `emu_core::Bus`.
pub struct NesBus {
    memory: Memory,
    pages: PageTable,
    ppu: Ppu,
    clock: Clock,
    /// Last value driven on the data bus.
    open_bus: u8,
}

impl NesBus {
    pub fn new(cartridge: &Cartridge, region: NesRegion) -> Result<Self, NesError> {
        let memory = Memory::new(cartridge)?;
        let pages = memory.page_table();
        Ok(Self {
            memory,
            pages,
            ppu: Ppu::new(cartridge, region),
            clock: Clock::new(region.clock_ratio()),
            open_bus: 0,
        })
    }

    #[must_use]
    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    #[must_use]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Current open-bus latch.
    #[must_use]
    pub fn open_bus(&self) -> u8 {
        self.open_bus
    }

    /// Bring the PPU up to the current CPU time. Never moves it backwards.
    fn sync_ppu(&mut self) {
        let target = self.clock.coprocessor_target();
        trace!(ppu = %self.ppu.now(), %target, "PPU catch-up");
        self.ppu.catch_up(target);
    }
}

impl Bus for NesBus {
    fn read(&mut self, address: u16) -> u8 {
        let value = match self.pages.page(address) {
            Page::Mapped { region, offset } => {
                self.memory.read(region, offset + usize::from(address & 0x00FF))
            }
            Page::Ppu => {
                self.sync_ppu();
                self.ppu.read_register(address, self.open_bus)
            }
            Page::OpenBus => self.open_bus,
        };
        self.open_bus = value;
        value
    }

    fn write(&mut self, address: u16, value: u8) {
        match self.pages.page(address) {
            Page::Mapped { region, offset } => {
                // ROM ignores the write
                self.memory
                    .write(region, offset + usize::from(address & 0x00FF), value);
            }
            Page::Ppu => {
                self.sync_ppu();
                self.ppu.write_register(address, value);
            }
            Page::OpenBus => {}
        }
        self.open_bus = value;
    }

    fn peek(&self, address: u16) -> u8 {
        match self.pages.resolve(address) {
            Some((region, offset)) => self.memory.read(region, offset),
            None => self.open_bus,
        }
    }

    fn tick(&mut self, cycles: u32) {
        self.clock.advance(cycles);
    }
}
