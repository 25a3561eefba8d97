//! Minimal 2C02 PPU.
//!
//! Models the parts of the PPU the CPU can observe through `$2000-$2007`:
//! the dot/scanline position, the vblank flag, the register file and the
//! VRAM data port. Nothing is rendered.
//!
//! The PPU runs on its own clock and is only ever stepped by the bus,
//! through [`Coprocessor::catch_up`], just before the CPU touches a PPU
//! register.
//!
//! Timing: 341 dots per scanline, 262 scanlines per frame on NTSC and 312
//! on PAL. Vblank is raised at scanline 241 dot 1 and cleared at the
//! pre-render line (the last one) dot 1.

use emu_core::{Coprocessor, Ticks};
use nes_cartridge::{CHR_BANK_SIZE, Cartridge, Mirroring};

use crate::config::NesRegion;

pub const DOTS_PER_SCANLINE: u16 = 341;
pub const VBLANK_SCANLINE: u16 = 241;

const STATUS_VBLANK: u8 = 0x80;
const CTRL_INCREMENT_32: u8 = 0x04;

/// Two physical nametables on the console; four-screen boards add two more.
const NAMETABLE_RAM_SIZE: usize = 0x1000;
const PALETTE_SIZE: usize = 32;
const OAM_SIZE: usize = 256;

pub struct Ppu {
    /// PPU cycles since power-on.
    cycles: Ticks,
    dot: u16,
    scanline: u16,
    frame: u64,
    region: NesRegion,

    // Registers
    ctrl: u8,
    mask: u8,
    status: u8,
    oam_addr: u8,

    // Loopy registers
    v: u16,
    t: u16,
    fine_x: u8,
    /// First/second write toggle shared by $2005 and $2006.
    w: bool,
    /// $2007 read delay buffer.
    read_buffer: u8,

    oam: [u8; OAM_SIZE],
    nametable_ram: [u8; NAMETABLE_RAM_SIZE],
    palette_ram: [u8; PALETTE_SIZE],
    chr: Vec<u8>,
    chr_is_ram: bool,
    mirroring: Mirroring,
}

impl Ppu {
    /// Power-on PPU wired to the cartridge's CHR ROM (or 8KB CHR RAM).
    #[must_use]
    pub fn new(cartridge: &Cartridge, region: NesRegion) -> Self {
        let chr_is_ram = cartridge.has_chr_ram();
        let chr = if chr_is_ram {
            vec![0; CHR_BANK_SIZE]
        } else {
            cartridge.chr_rom.clone()
        };
        Self {
            cycles: Ticks::ZERO,
            dot: 0,
            scanline: 0,
            frame: 0,
            region,
            ctrl: 0,
            mask: 0,
            status: 0,
            oam_addr: 0,
            v: 0,
            t: 0,
            fine_x: 0,
            w: false,
            read_buffer: 0,
            oam: [0; OAM_SIZE],
            nametable_ram: [0; NAMETABLE_RAM_SIZE],
            palette_ram: [0; PALETTE_SIZE],
            chr,
            chr_is_ram,
            mirroring: cartridge.mirroring,
        }
    }

    #[must_use]
    pub fn dot(&self) -> u16 {
        self.dot
    }

    #[must_use]
    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    #[must_use]
    pub fn region(&self) -> NesRegion {
        self.region
    }

    /// Completed frames.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[must_use]
    pub fn in_vblank(&self) -> bool {
        self.status & STATUS_VBLANK != 0
    }

    #[must_use]
    pub fn ctrl(&self) -> u8 {
        self.ctrl
    }

    #[must_use]
    pub fn mask(&self) -> u8 {
        self.mask
    }

    #[must_use]
    pub fn oam_addr(&self) -> u8 {
        self.oam_addr
    }

    /// Current VRAM address.
    #[must_use]
    pub fn vram_addr(&self) -> u16 {
        self.v
    }

    /// Staged scroll: temporary VRAM address and fine X.
    #[must_use]
    pub fn scroll(&self) -> (u16, u8) {
        (self.t, self.fine_x)
    }

    /// CPU read of register `reg` (0-7). Write-only registers return
    /// `open_bus`, the value last driven on the CPU data bus.
    pub fn read_register(&mut self, reg: u16, open_bus: u8) -> u8 {
        match reg & 0x07 {
            // $2002 - PPUSTATUS
            2 => {
                let result = (self.status & 0xE0) | (open_bus & 0x1F);
                self.status &= !STATUS_VBLANK;
                self.w = false;
                result
            }
            // $2004 - OAMDATA
            4 => self.oam[usize::from(self.oam_addr)],
            // $2007 - PPUDATA
            7 => {
                let addr = self.v & 0x3FFF;
                let mut result = self.read_buffer;
                self.read_buffer = self.vram_read(addr);
                // Palette reads are not buffered
                if addr >= 0x3F00 {
                    result = self.palette_ram[palette_index(addr)];
                    // Buffer gets the nametable byte "underneath"
                    self.read_buffer = self.vram_read(addr & 0x2FFF);
                }
                self.increment_v();
                result
            }
            _ => open_bus,
        }
    }

    /// CPU write to register `reg` (0-7).
    pub fn write_register(&mut self, reg: u16, val: u8) {
        match reg & 0x07 {
            // $2000 - PPUCTRL
            0 => {
                self.ctrl = val;
                // Nametable select bits go to t bits 10-11
                self.t = (self.t & !0x0C00) | (u16::from(val & 0x03) << 10);
            }
            // $2001 - PPUMASK
            1 => self.mask = val,
            // $2003 - OAMADDR
            3 => self.oam_addr = val,
            // $2004 - OAMDATA
            4 => {
                self.oam[usize::from(self.oam_addr)] = val;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            // $2005 - PPUSCROLL
            5 => {
                if self.w {
                    self.t = (self.t & !0x73E0)
                        | (u16::from(val & 0x07) << 12)
                        | (u16::from(val >> 3) << 5);
                } else {
                    self.t = (self.t & !0x001F) | (u16::from(val) >> 3);
                    self.fine_x = val & 0x07;
                }
                self.w = !self.w;
            }
            // $2006 - PPUADDR
            6 => {
                if self.w {
                    self.t = (self.t & 0xFF00) | u16::from(val);
                    self.v = self.t;
                } else {
                    self.t = (self.t & 0x00FF) | (u16::from(val & 0x3F) << 8);
                }
                self.w = !self.w;
            }
            // $2007 - PPUDATA
            7 => {
                let addr = self.v & 0x3FFF;
                self.vram_write(addr, val);
                self.increment_v();
            }
            // $2002 is read-only
            _ => {}
        }
    }

    fn increment_v(&mut self) {
        let step = if self.ctrl & CTRL_INCREMENT_32 != 0 { 32 } else { 1 };
        self.v = self.v.wrapping_add(step) & 0x7FFF;
    }

    fn vram_read(&self, addr: u16) -> u8 {
        match addr & 0x3FFF {
            a @ 0x0000..=0x1FFF => self.chr[usize::from(a) % self.chr.len()],
            a @ 0x2000..=0x3EFF => self.nametable_ram[self.nametable_index(a)],
            a => self.palette_ram[palette_index(a)],
        }
    }

    fn vram_write(&mut self, addr: u16, val: u8) {
        match addr & 0x3FFF {
            a @ 0x0000..=0x1FFF => {
                if self.chr_is_ram {
                    let len = self.chr.len();
                    self.chr[usize::from(a) % len] = val;
                }
            }
            a @ 0x2000..=0x3EFF => {
                let index = self.nametable_index(a);
                self.nametable_ram[index] = val;
            }
            a => self.palette_ram[palette_index(a)] = val,
        }
    }

    fn nametable_index(&self, addr: u16) -> usize {
        let nt_addr = usize::from((addr - 0x2000) & 0x0FFF);
        match self.mirroring {
            // Nametables 0,1 → page 0; 2,3 → page 1
            Mirroring::Horizontal => (nt_addr / 0x0800) * 0x0400 + (nt_addr & 0x03FF),
            // Nametables 0,2 → page 0; 1,3 → page 1
            Mirroring::Vertical => nt_addr & 0x07FF,
            Mirroring::FourScreen => nt_addr,
        }
    }
}

/// $3F10/$3F14/$3F18/$3F1C mirror $3F00/$3F04/$3F08/$3F0C.
fn palette_index(addr: u16) -> usize {
    let a = usize::from(addr & 0x1F);
    if a & 0x13 == 0x10 { a - 0x10 } else { a }
}

impl Coprocessor for Ppu {
    fn now(&self) -> Ticks {
        self.cycles
    }

    fn step(&mut self) {
        self.cycles += Ticks::new(1);
        self.dot += 1;
        if self.dot == DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline == self.region.scanlines_per_frame() {
                self.scanline = 0;
                self.frame += 1;
            }
        }

        if self.dot == 1 {
            if self.scanline == VBLANK_SCANLINE {
                self.status |= STATUS_VBLANK;
            } else if self.scanline == self.region.pre_render_line() {
                self.status &= !STATUS_VBLANK;
            }
        }
    }
}
