use mos_6502::CpuError;
use nes_cartridge::CartridgeError;
use thiserror::Error;

/// Errors from building or running the machine.
#[derive(Debug, Error)]
pub enum NesError {
    #[error("cartridge: {0}")]
    Cartridge(#[from] CartridgeError),

    #[error("PRG ROM is {0} bytes, expected a non-zero multiple of 16KB")]
    PrgSize(usize),

    #[error("CPU: {0}")]
    Cpu(#[from] CpuError),
}
