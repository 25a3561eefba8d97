//! NES machine: 2A03 CPU core, fixed-layout cartridge mapping and a lazily
//! synchronised PPU.
//!
//! The CPU runs one instruction at a time. After each instruction the bus
//! clock advances by its cycle cost. The PPU runs at 3 PPU cycles per CPU
//! cycle on NTSC (`ClockRatio::NTSC`, 3.2 on PAL) and is only stepped when
//! the CPU reads or writes `$2000-$3FFF`.
//!
//! One NTSC frame = 341 PPU dots × 262 scanlines = 89,342 PPU cycles.

mod bus;
mod clock;
mod config;
mod error;
pub mod memory;
mod nes;
pub mod ppu;

pub use bus::NesBus;
pub use clock::Clock;
pub use config::{NesConfig, NesRegion};
pub use error::NesError;
pub use nes::{Nes, RomInfo, RunSummary};
