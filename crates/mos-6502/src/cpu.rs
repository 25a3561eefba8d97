//! 6502 execution engine.
//!
//! Instruction-granular: each step fetches, decodes, resolves and executes
//! one whole instruction, then charges its full cycle cost at once. Bus
//! accesses made during an instruction therefore all see the clock as it
//! stood when the instruction began.

use emu_core::{Bus, Cpu, Observable, Value};
use tracing::{debug, error};

use crate::addressing::{self, IndirectJump};
use crate::flags::{C, D, I, N, V, Z};
use crate::table::decode;
use crate::{CpuError, Registers};

/// Reset vector ($FFFC-$FFFD).
pub const RESET_VECTOR: u16 = 0xFFFC;

/// IRQ/BRK vector ($FFFE-$FFFF).
pub const IRQ_BRK_VECTOR: u16 = 0xFFFE;

/// CPU options that pick between hardware quirks and corrected behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuConfig {
    /// Page-boundary behaviour of `JMP ($nnnn)`.
    pub indirect_jump: IndirectJump,
}

/// The MOS 6502 CPU.
#[derive(Debug)]
pub struct Mos6502 {
    /// CPU registers.
    pub regs: Registers,

    config: CpuConfig,

    /// Set once an invalid opcode has been fetched.
    fault: Option<CpuError>,
}

impl Default for Mos6502 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mos6502 {
    /// Create a CPU in the power-on state with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CpuConfig::default())
    }

    #[must_use]
    pub fn with_config(config: CpuConfig) -> Self {
        Self {
            regs: Registers::new(),
            config,
            fault: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> CpuConfig {
        self.config
    }

    /// The fault that halted the CPU, if any.
    #[must_use]
    pub fn fault(&self) -> Option<CpuError> {
        self.fault
    }

    /// Read a little-endian vector.
    fn read_vector<B: Bus>(bus: &mut B, vector: u16) -> u16 {
        let lo = bus.read(vector);
        let hi = bus.read(vector.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn push<B: Bus>(&mut self, bus: &mut B, value: u8) {
        let addr = self.regs.push();
        bus.write(addr, value);
    }

    pub(crate) fn pull<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let addr = self.regs.pop();
        bus.read(addr)
    }

    /// Push a 16-bit word (high byte first).
    pub(crate) fn push_word<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.push(bus, hi);
        self.push(bus, lo);
    }

    /// Pull a 16-bit word (low byte first).
    pub(crate) fn pull_word<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.pull(bus);
        let hi = self.pull(bus);
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn irq_brk_target<B: Bus>(bus: &mut B) -> u16 {
        Self::read_vector(bus, IRQ_BRK_VECTOR)
    }
}

impl Cpu for Mos6502 {
    type Registers = Registers;
    type Fault = CpuError;

    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, CpuError> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }

        let address = self.regs.pc;
        let opcode = bus.read(address);
        let Some(instr) = decode(opcode) else {
            let fault = CpuError::InvalidOpcode { address, opcode };
            error!("CPU halted: {fault}");
            self.fault = Some(fault);
            return Err(fault);
        };

        let resolved = addressing::resolve(instr, &self.regs, bus, self.config.indirect_jump);
        self.regs.pc = address
            .wrapping_add(1)
            .wrapping_add(u16::from(resolved.len));

        let branch_cycles = self.execute(instr.mnemonic, resolved.operand, bus);

        let cycles = u32::from(instr.cycles)
            + u32::from(resolved.extra_cycles)
            + u32::from(branch_cycles);
        // The bus owns the cycle count.
        bus.tick(cycles);
        Ok(cycles)
    }

    fn reset<B: Bus>(&mut self, bus: &mut B) {
        self.regs = Registers::new();
        self.fault = None;
        self.regs.pc = Self::read_vector(bus, RESET_VECTOR);
        debug!("reset: PC=${:04X}", self.regs.pc);
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.fault.is_some()
    }
}

impl Observable for Mos6502 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "s" | "sp" => Some(self.regs.s.into()),
            "p" | "status" => Some(self.regs.p.0.into()),
            "flags.c" => Some(self.regs.p.is_set(C).into()),
            "flags.z" => Some(self.regs.p.is_set(Z).into()),
            "flags.i" => Some(self.regs.p.is_set(I).into()),
            "flags.d" => Some(self.regs.p.is_set(D).into()),
            "flags.v" => Some(self.regs.p.is_set(V).into()),
            "flags.n" => Some(self.regs.p.is_set(N).into()),
            "halted" => Some(self.is_halted().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc", "a", "x", "y", "s", "p", "flags.c", "flags.z", "flags.i", "flags.d", "flags.v",
            "flags.n", "halted",
        ]
    }
}
