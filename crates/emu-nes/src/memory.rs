//! Memory regions and the CPU page table.
//!
//! The CPU address space is split into 256 pages of 256 bytes. Each page is
//! tagged once, at construction, with where it lives: an offset into one of
//! the owned regions, the PPU register window, or nothing (open bus). The
//! offset is `(page - window start) * 256` reduced modulo the region size, so
//! every mirror of a byte names the same storage.
//!
//! | Range         | Target                                         |
//! |---------------|------------------------------------------------|
//! | `$0000-$1FFF` | 2KB work RAM, mirrored four times              |
//! | `$2000-$3FFF` | PPU registers                                  |
//! | `$4000-$5FFF` | open bus                                       |
//! | `$6000-$7FFF` | save RAM if the cartridge has it, else open bus |
//! | `$8000-$FFFF` | PRG ROM, mirrored to fill 32KB                  |

use nes_cartridge::{Cartridge, PRG_BANK_SIZE};

use crate::NesError;

pub const RAM_SIZE: usize = 0x0800;
pub const PAGE_SIZE: usize = 0x0100;

const RAM_PAGES: std::ops::Range<usize> = 0x00..0x20;
const PPU_PAGES: std::ops::Range<usize> = 0x20..0x40;
const SAVE_RAM_PAGES: std::ops::Range<usize> = 0x60..0x80;
const PRG_PAGES: std::ops::Range<usize> = 0x80..0x100;

/// Owned storage a page can point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Ram,
    SaveRam,
    Prg,
}

/// What one 256-byte page of CPU address space maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Bytes `offset..offset + 256` of `region`.
    Mapped { region: Region, offset: usize },
    /// PPU registers, `$2000-$2007` repeated every 8 bytes.
    Ppu,
    /// Nothing drives the data bus.
    OpenBus,
}

/// The machine's RAM and ROM buffers. Sizes are fixed at construction.
#[derive(Debug)]
pub struct Memory {
    ram: Box<[u8; RAM_SIZE]>,
    /// Empty when the cartridge has no save RAM.
    save_ram: Vec<u8>,
    prg: Vec<u8>,
}

impl Memory {
    /// Allocate RAM and take a copy of the cartridge's PRG ROM.
    ///
    /// PRG ROM must be a non-zero number of whole 16KB banks.
    pub fn new(cartridge: &Cartridge) -> Result<Self, NesError> {
        let prg_len = cartridge.prg_rom.len();
        if prg_len == 0 || !prg_len.is_multiple_of(PRG_BANK_SIZE) {
            return Err(NesError::PrgSize(prg_len));
        }
        Ok(Self {
            ram: Box::new([0; RAM_SIZE]),
            save_ram: vec![0; cartridge.save_ram_size()],
            prg: cartridge.prg_rom.clone(),
        })
    }

    #[must_use]
    pub fn region(&self, region: Region) -> &[u8] {
        match region {
            Region::Ram => self.ram.as_slice(),
            Region::SaveRam => &self.save_ram,
            Region::Prg => &self.prg,
        }
    }

    /// Writable regions. PRG ROM is never handed out mutably.
    fn region_mut(&mut self, region: Region) -> Option<&mut [u8]> {
        match region {
            Region::Ram => Some(self.ram.as_mut_slice()),
            Region::SaveRam => Some(&mut self.save_ram),
            Region::Prg => None,
        }
    }

    #[must_use]
    pub fn read(&self, region: Region, offset: usize) -> u8 {
        self.region(region)[offset]
    }

    /// Store a byte. Returns `false` (and changes nothing) for ROM.
    pub fn write(&mut self, region: Region, offset: usize, value: u8) -> bool {
        match self.region_mut(region) {
            Some(bytes) => {
                bytes[offset] = value;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn ram(&self) -> &[u8] {
        self.ram.as_slice()
    }

    #[must_use]
    pub fn has_save_ram(&self) -> bool {
        !self.save_ram.is_empty()
    }

    /// Build the page table for these region sizes.
    #[must_use]
    pub fn page_table(&self) -> PageTable {
        PageTable::new(self.save_ram.len(), self.prg.len())
    }
}

/// 256 page tags covering `$0000-$FFFF`.
#[derive(Debug, Clone)]
pub struct PageTable {
    pages: [Page; 256],
}

impl PageTable {
    /// Region lengths must be non-zero multiples of the page size (or zero
    /// for absent save RAM).
    fn new(save_ram_len: usize, prg_len: usize) -> Self {
        let mut pages = [Page::OpenBus; 256];

        for page in RAM_PAGES {
            pages[page] = mirrored(Region::Ram, page - RAM_PAGES.start, RAM_SIZE);
        }
        for page in PPU_PAGES {
            pages[page] = Page::Ppu;
        }
        if save_ram_len > 0 {
            for page in SAVE_RAM_PAGES {
                pages[page] = mirrored(Region::SaveRam, page - SAVE_RAM_PAGES.start, save_ram_len);
            }
        }
        for page in PRG_PAGES {
            pages[page] = mirrored(Region::Prg, page - PRG_PAGES.start, prg_len);
        }

        Self { pages }
    }

    /// Tag of the page containing `address`.
    #[must_use]
    pub fn page(&self, address: u16) -> Page {
        self.pages[usize::from(address >> 8)]
    }

    /// Resolve `address` to a region and byte offset, if it maps to one.
    #[must_use]
    pub fn resolve(&self, address: u16) -> Option<(Region, usize)> {
        match self.page(address) {
            Page::Mapped { region, offset } => {
                Some((region, offset + usize::from(address & 0x00FF)))
            }
            Page::Ppu | Page::OpenBus => None,
        }
    }
}

fn mirrored(region: Region, index: usize, region_len: usize) -> Page {
    Page::Mapped {
        region,
        offset: (index * PAGE_SIZE) % region_len,
    }
}
