use tracing::{debug, warn};

use crate::CartridgeError;

/// "NES" followed by MS-DOS end-of-file.
pub const INES_MAGIC: [u8; 4] = *b"NES\x1a";
pub const HEADER_SIZE: usize = 16;
pub const TRAINER_SIZE: usize = 512;
pub const PRG_BANK_SIZE: usize = 16 * 1024;
pub const CHR_BANK_SIZE: usize = 8 * 1024;
/// Battery-backed work RAM at $6000-$7FFF.
pub const SAVE_RAM_SIZE: usize = 8 * 1024;

const FLAG_VERTICAL: u8 = 0x01;
const FLAG_BATTERY: u8 = 0x02;
const FLAG_TRAINER: u8 = 0x04;
const FLAG_FOUR_SCREEN: u8 = 0x08;

/// Nametable mirroring mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mirroring {
    #[default]
    Horizontal,
    Vertical,
    FourScreen,
}

/// A loaded cartridge: ROM contents plus the header fields the machine uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cartridge {
    pub prg_rom: Vec<u8>,
    /// CHR ROM. Empty means the board carries 8KB of CHR RAM instead.
    pub chr_rom: Vec<u8>,
    pub mapper: u8,
    pub mirroring: Mirroring,
    /// Battery flag: the board has save RAM at $6000-$7FFF.
    pub has_battery: bool,
}

impl Cartridge {
    /// Wrap raw buffers: horizontal mirroring, no save RAM.
    #[must_use]
    pub fn new(prg_rom: Vec<u8>, chr_rom: Vec<u8>, mapper: u8) -> Self {
        Self {
            prg_rom,
            chr_rom,
            mapper,
            mirroring: Mirroring::Horizontal,
            has_battery: false,
        }
    }

    /// Parse an iNES image.
    ///
    /// A bad magic number is logged and otherwise ignored. A trainer, if
    /// flagged, is skipped.
    pub fn from_ines(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_SIZE {
            return Err(CartridgeError::HeaderTooShort(data.len()));
        }

        if data[0..4] != INES_MAGIC {
            warn!("bad magic number in ROM file: {:02X?}", &data[0..4]);
        }

        let prg_banks = data[4];
        let chr_banks = data[5];
        let flags6 = data[6];
        let flags7 = data[7];

        let mapper = (flags6 >> 4) | (flags7 & 0xF0);
        let mirroring = if flags6 & FLAG_FOUR_SCREEN != 0 {
            Mirroring::FourScreen
        } else if flags6 & FLAG_VERTICAL != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        let has_battery = flags6 & FLAG_BATTERY != 0;
        let has_trainer = flags6 & FLAG_TRAINER != 0;

        let prg_size = usize::from(prg_banks) * PRG_BANK_SIZE;
        let chr_size = usize::from(chr_banks) * CHR_BANK_SIZE;
        let prg_start = HEADER_SIZE + if has_trainer { TRAINER_SIZE } else { 0 };
        let chr_start = prg_start + prg_size;
        let expected = chr_start + chr_size;

        if data.len() < expected {
            return Err(CartridgeError::Truncated {
                expected,
                actual: data.len(),
            });
        }
        if prg_size == 0 {
            return Err(CartridgeError::NoPrgRom);
        }
        if mapper != 0 {
            warn!("mapper {mapper} not supported, using the fixed NROM layout");
        }

        debug!(
            prg_banks,
            chr_banks,
            mapper,
            ?mirroring,
            has_battery,
            has_trainer,
            "parsed iNES header"
        );

        Ok(Self {
            prg_rom: data[prg_start..chr_start].to_vec(),
            chr_rom: data[chr_start..expected].to_vec(),
            mapper,
            mirroring,
            has_battery,
        })
    }

    /// Save RAM size: 8KB when battery-backed, otherwise none.
    #[must_use]
    pub fn save_ram_size(&self) -> usize {
        if self.has_battery { SAVE_RAM_SIZE } else { 0 }
    }

    #[must_use]
    pub fn has_chr_ram(&self) -> bool {
        self.chr_rom.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_ines(prg_banks: u8, chr_banks: u8, flags6: u8) -> Vec<u8> {
        let prg_size = usize::from(prg_banks) * PRG_BANK_SIZE;
        let chr_size = usize::from(chr_banks) * CHR_BANK_SIZE;
        let mut data = vec![0u8; HEADER_SIZE + prg_size + chr_size];
        data[0..4].copy_from_slice(&INES_MAGIC);
        data[4] = prg_banks;
        data[5] = chr_banks;
        data[6] = flags6;
        for i in 0..prg_size {
            data[HEADER_SIZE + i] = (i & 0xFF) as u8;
        }
        for i in 0..chr_size {
            data[HEADER_SIZE + prg_size + i] = ((i + 0x80) & 0xFF) as u8;
        }
        data
    }

    #[test]
    fn parse_nrom_16k() {
        let cart = Cartridge::from_ines(&make_ines(1, 1, 0x00)).expect("parse failed");
        assert_eq!(cart.prg_rom.len(), PRG_BANK_SIZE);
        assert_eq!(cart.chr_rom.len(), CHR_BANK_SIZE);
        assert_eq!(cart.mapper, 0);
        assert_eq!(cart.mirroring, Mirroring::Horizontal);
        assert_eq!(cart.prg_rom[1], 0x01);
        assert_eq!(cart.chr_rom[0], 0x80);
        assert_eq!(cart.save_ram_size(), 0);
    }

    #[test]
    fn mirroring_and_battery_flags() {
        let cart = Cartridge::from_ines(&make_ines(2, 1, 0x03)).expect("parse failed");
        assert_eq!(cart.mirroring, Mirroring::Vertical);
        assert!(cart.has_battery);
        assert_eq!(cart.save_ram_size(), SAVE_RAM_SIZE);

        let cart = Cartridge::from_ines(&make_ines(1, 1, 0x09)).expect("parse failed");
        assert_eq!(cart.mirroring, Mirroring::FourScreen);
    }

    #[test]
    fn mapper_id_combines_both_nibbles() {
        let mut data = make_ines(1, 0, 0x40);
        data[7] = 0x10;
        let cart = Cartridge::from_ines(&data).expect("parse failed");
        assert_eq!(cart.mapper, 0x14);
        assert!(cart.has_chr_ram());
    }

    #[test]
    fn trainer_is_skipped() {
        let plain = make_ines(1, 0, 0x00);
        let mut data = plain[..HEADER_SIZE].to_vec();
        data[6] |= FLAG_TRAINER;
        data.extend(std::iter::repeat_n(0xEE, TRAINER_SIZE));
        data.extend_from_slice(&plain[HEADER_SIZE..]);

        let cart = Cartridge::from_ines(&data).expect("parse failed");
        assert_eq!(cart.prg_rom[0], 0x00);
        assert_eq!(cart.prg_rom[0x42], 0x42);
    }

    #[test]
    fn bad_magic_still_loads() {
        let mut data = make_ines(1, 1, 0x00);
        data[0..4].copy_from_slice(b"XXXX");
        assert!(Cartridge::from_ines(&data).is_ok());
    }

    #[test]
    fn short_header_rejected() {
        assert_eq!(
            Cartridge::from_ines(&[0x4E, 0x45, 0x53]),
            Err(CartridgeError::HeaderTooShort(3))
        );
    }

    #[test]
    fn truncated_body_rejected() {
        let mut data = make_ines(2, 1, 0x00);
        data.truncate(HEADER_SIZE + PRG_BANK_SIZE);
        assert_eq!(
            Cartridge::from_ines(&data),
            Err(CartridgeError::Truncated {
                expected: HEADER_SIZE + 2 * PRG_BANK_SIZE + CHR_BANK_SIZE,
                actual: HEADER_SIZE + PRG_BANK_SIZE,
            })
        );
    }

    #[test]
    fn empty_prg_rejected() {
        assert_eq!(
            Cartridge::from_ines(&make_ines(0, 1, 0x00)),
            Err(CartridgeError::NoPrgRom)
        );
    }

    #[test]
    fn new_uses_defaults() {
        let cart = Cartridge::new(vec![0; PRG_BANK_SIZE], Vec::new(), 3);
        assert_eq!(cart.mapper, 3);
        assert_eq!(cart.mirroring, Mirroring::Horizontal);
        assert!(!cart.has_battery);
        assert!(cart.has_chr_ram());
    }
}
