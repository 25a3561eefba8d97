//! MOS 6502 CPU core, emulated one whole instruction at a time.
//!
//! Each [`step`](emu_core::Cpu::step) fetches an opcode, decodes it through
//! the static [`table`], resolves the operand with the [`addressing`]
//! resolver and then executes the mnemonic. The cycle cost is charged after
//! the instruction completes.
//!
//! Only the 151 documented opcodes exist. Anything else halts the CPU with
//! [`CpuError::InvalidOpcode`]. Decimal mode is stored in P but, as on the
//! 2A03, never changes arithmetic.

pub mod addressing;
mod cpu;
pub mod disasm;
mod error;
mod execute;
pub mod flags;
mod registers;
pub mod table;

pub use addressing::{IndirectJump, Operand, Resolved};
pub use cpu::{CpuConfig, IRQ_BRK_VECTOR, Mos6502, RESET_VECTOR};
pub use disasm::{Disassembly, disassemble};
pub use error::CpuError;
pub use flags::Status;
pub use registers::Registers;
pub use table::{Access, AddressingMode, Instruction, Mnemonic, decode};
