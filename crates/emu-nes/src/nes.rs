//! Top-level NES system.
//!
//! Owns the CPU and the bus (which in turn owns memory, the PPU and the
//! clock). The CPU is the only driver: each step runs one instruction and
//! the bus advances the clock by its cost. The PPU runs only when the CPU
//! touches it.

use emu_core::{Bus, Coprocessor, Cpu, Observable, Value};
use mos_6502::{CpuConfig, CpuError, Disassembly, Mos6502, disassemble};
use nes_cartridge::Cartridge;
use tracing::debug;

use crate::NesError;
use crate::bus::NesBus;
use crate::config::{NesConfig, NesRegion};

/// Outcome of [`Nes::run_until`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// CPU cycle count when the run stopped.
    pub cycles: u64,
    /// Instructions executed during the run.
    pub instructions: u64,
}

/// Layout of the loaded cartridge, as read from its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomInfo {
    /// PRG ROM size in bytes.
    pub prg_rom: usize,
    /// CHR ROM size in bytes (0 for CHR RAM boards).
    pub chr_rom: usize,
    pub mapper: u8,
}

/// NES system.
pub struct Nes {
    cpu: Mos6502,
    bus: NesBus,
    rom: RomInfo,
    instructions: u64,
}

impl Nes {
    /// Create a new NES from the given configuration and reset it.
    pub fn new(config: &NesConfig) -> Result<Self, NesError> {
        let cartridge = Cartridge::from_ines(&config.rom_data)?;
        Self::from_cartridge(&cartridge, config.region, config.cpu_config())
    }

    /// Create a new NES from an already-loaded cartridge and reset it.
    pub fn from_cartridge(
        cartridge: &Cartridge,
        region: NesRegion,
        cpu_config: CpuConfig,
    ) -> Result<Self, NesError> {
        let bus = NesBus::new(cartridge, region)?;
        let mut nes = Self {
            cpu: Mos6502::with_config(cpu_config),
            bus,
            rom: RomInfo {
                prg_rom: cartridge.prg_rom.len(),
                chr_rom: cartridge.chr_rom.len(),
                mapper: cartridge.mapper,
            },
            instructions: 0,
        };
        nes.reset();
        Ok(nes)
    }

    /// Reset the CPU through the reset vector. Memory and clocks are kept.
    pub fn reset(&mut self) {
        self.cpu.reset(&mut self.bus);
        debug!(
            "NES reset at CPU cycle {}, PC=${:04X}",
            self.cycles(),
            self.cpu.pc()
        );
    }

    /// Execute one instruction, returning its cycle cost.
    pub fn step(&mut self) -> Result<u32, CpuError> {
        let cycles = self.cpu.step(&mut self.bus)?;
        self.instructions += 1;
        Ok(cycles)
    }

    /// Run until the CPU cycle count reaches `cycle`.
    ///
    /// The bound is checked between instructions, so the run can overshoot
    /// by up to one instruction.
    pub fn run_until(&mut self, cycle: u64) -> Result<RunSummary, CpuError> {
        let start = self.instructions;
        while self.cycles() < cycle {
            self.step()?;
        }
        Ok(RunSummary {
            cycles: self.cycles(),
            instructions: self.instructions - start,
        })
    }

    /// The instruction at PC, decoded without side effects.
    #[must_use]
    pub fn next_instruction(&self) -> Disassembly {
        disassemble(&self.bus, self.cpu.pc())
    }

    /// CPU cycles since power-on.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.bus.clock().cpu().get()
    }

    /// Instructions executed since power-on.
    #[must_use]
    pub fn instructions(&self) -> u64 {
        self.instructions
    }

    #[must_use]
    pub fn rom_info(&self) -> RomInfo {
        self.rom
    }

    /// Mapper id from the cartridge header.
    #[must_use]
    pub fn mapper(&self) -> u8 {
        self.rom.mapper
    }

    #[must_use]
    pub fn cpu(&self) -> &Mos6502 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Mos6502 {
        &mut self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &NesBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut NesBus {
        &mut self.bus
    }
}

fn parse_address(text: &str) -> Option<u16> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).ok()
    } else if let Some(hex) = text.strip_prefix('$') {
        u16::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

impl Observable for Nes {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("ppu.") {
            let ppu = self.bus.ppu();
            match rest {
                "scanline" => Some(ppu.scanline().into()),
                "dot" => Some(ppu.dot().into()),
                "frame" => Some(ppu.frame().into()),
                "cycles" => Some(ppu.now().get().into()),
                "vblank" => Some(ppu.in_vblank().into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("memory.") {
            parse_address(rest).map(|a| Value::U8(self.bus.peek(a)))
        } else {
            match path {
                "cycles" => Some(self.cycles().into()),
                "instructions" => Some(self.instructions.into()),
                "open_bus" => Some(self.bus.open_bus().into()),
                _ => self.cpu.query(path),
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.<6502_paths>",
            "ppu.scanline",
            "ppu.dot",
            "ppu.frame",
            "ppu.cycles",
            "ppu.vblank",
            "memory.<address>",
            "cycles",
            "instructions",
            "open_bus",
        ]
    }
}
