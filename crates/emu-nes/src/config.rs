//! NES configuration.

use emu_core::ClockRatio;
use mos_6502::{CpuConfig, IndirectJump};

/// Video region. Fixes the CPU/PPU clock ratio and the frame height.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum NesRegion {
    /// NTSC: 262 scanlines, 3 PPU dots per CPU cycle.
    #[default]
    Ntsc,
    /// PAL: 312 scanlines, 3.2 PPU dots per CPU cycle.
    Pal,
}

impl NesRegion {
    #[must_use]
    pub const fn clock_ratio(self) -> ClockRatio {
        match self {
            Self::Ntsc => ClockRatio::NTSC,
            Self::Pal => ClockRatio::PAL,
        }
    }

    /// Total scanlines per frame (including pre-render and vblank).
    #[must_use]
    pub const fn scanlines_per_frame(self) -> u16 {
        match self {
            Self::Ntsc => 262,
            Self::Pal => 312,
        }
    }

    /// Pre-render scanline number (last scanline of the frame).
    #[must_use]
    pub const fn pre_render_line(self) -> u16 {
        self.scanlines_per_frame() - 1
    }
}

/// NES configuration.
#[derive(Debug, Clone)]
pub struct NesConfig {
    /// iNES file contents.
    pub rom_data: Vec<u8>,
    /// Video region (NTSC or PAL). Defaults to NTSC.
    pub region: NesRegion,
    /// `JMP ($xxFF)` behaviour. Defaults to the hardware page wrap.
    pub indirect_jump: IndirectJump,
}

impl NesConfig {
    /// NTSC timing and hardware-accurate CPU quirks.
    #[must_use]
    pub fn new(rom_data: Vec<u8>) -> Self {
        Self {
            rom_data,
            region: NesRegion::default(),
            indirect_jump: IndirectJump::default(),
        }
    }

    /// PPU cycles per CPU cycle for the configured region.
    #[must_use]
    pub fn clock_ratio(&self) -> ClockRatio {
        self.region.clock_ratio()
    }

    #[must_use]
    pub fn cpu_config(&self) -> CpuConfig {
        CpuConfig {
            indirect_jump: self.indirect_jump,
        }
    }
}
