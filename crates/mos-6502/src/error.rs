//! CPU faults.

use thiserror::Error;

/// Why the CPU stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    /// The byte at `address` is not a documented opcode.
    #[error("invalid opcode ${opcode:02X} at ${address:04X}")]
    InvalidOpcode { address: u16, opcode: u8 },
}
