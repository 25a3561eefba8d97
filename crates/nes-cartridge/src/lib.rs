//! iNES cartridge images.
//!
//! Parses the 16-byte iNES header and splits the image into PRG ROM and CHR
//! ROM. Bank switching is not modelled: every mapper id is accepted and the
//! machine maps the image with the fixed NROM layout.

mod cartridge;
mod error;
mod size;

pub use cartridge::{
    CHR_BANK_SIZE, Cartridge, HEADER_SIZE, INES_MAGIC, Mirroring, PRG_BANK_SIZE, SAVE_RAM_SIZE,
    TRAINER_SIZE,
};
pub use error::CartridgeError;
pub use size::format_size;
