use thiserror::Error;

/// Reasons an iNES image cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartridgeError {
    #[error("iNES image too short for a header ({0} bytes, need 16)")]
    HeaderTooShort(usize),

    #[error("iNES image truncated: header promises {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("iNES image has no PRG ROM")]
    NoPrgRom,
}
