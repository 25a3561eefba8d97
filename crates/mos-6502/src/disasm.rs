//! Side-effect-free disassembly for trace output.
//!
//! Reads through [`Bus::peek`], so tracing an instruction never disturbs
//! open-bus latches or co-processor state.

use std::fmt;

use emu_core::Bus;

use crate::table::{AddressingMode, Instruction, decode};

/// One decoded instruction, ready to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disassembly {
    pub address: u16,
    pub opcode: u8,
    /// `None` for an unassigned opcode.
    pub instruction: Option<Instruction>,
    /// Operand bytes, little-endian. Only the first `size() - 1` are meaningful.
    pub operand: [u8; 2],
}

impl Disassembly {
    /// Total instruction length in bytes, opcode included.
    #[must_use]
    pub fn size(&self) -> u16 {
        match self.instruction {
            Some(instr) => 1 + u16::from(instr.mode.operand_len()),
            None => 1,
        }
    }

    /// Address of the following instruction.
    #[must_use]
    pub fn next_address(&self) -> u16 {
        self.address.wrapping_add(self.size())
    }

    fn word(&self) -> u16 {
        u16::from_le_bytes(self.operand)
    }
}

/// Decode the instruction at `address` without side effects.
pub fn disassemble<B: Bus + ?Sized>(bus: &B, address: u16) -> Disassembly {
    let opcode = bus.peek(address);
    let instruction = decode(opcode);
    let len = instruction.map_or(0, |i| i.mode.operand_len());
    let mut operand = [0; 2];
    for (i, byte) in operand.iter_mut().enumerate().take(usize::from(len)) {
        *byte = bus.peek(address.wrapping_add(1 + i as u16));
    }
    Disassembly {
        address,
        opcode,
        instruction,
        operand,
    }
}

impl fmt::Display for Disassembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}\t", self.address)?;
        let Some(instr) = self.instruction else {
            return write!(f, ".byte ${:02X}", self.opcode);
        };
        let name = instr.mnemonic.name();
        let lo = self.operand[0];
        let word = self.word();
        match instr.mode {
            AddressingMode::Implied => write!(f, "{name}"),
            AddressingMode::Accumulator => write!(f, "{name} A"),
            AddressingMode::Immediate => write!(f, "{name} #${lo:02X}"),
            AddressingMode::ZeroPage => write!(f, "{name} ${lo:02X}"),
            AddressingMode::ZeroPageX => write!(f, "{name} ${lo:02X},X"),
            AddressingMode::ZeroPageY => write!(f, "{name} ${lo:02X},Y"),
            AddressingMode::Relative => write!(f, "{name} {:+}", lo as i8),
            AddressingMode::Absolute => write!(f, "{name} ${word:04X}"),
            AddressingMode::AbsoluteX => write!(f, "{name} ${word:04X},X"),
            AddressingMode::AbsoluteY => write!(f, "{name} ${word:04X},Y"),
            AddressingMode::Indirect => write!(f, "{name} (${word:04X})"),
            AddressingMode::IndexedIndirect => write!(f, "{name} (${lo:02X},X)"),
            AddressingMode::IndirectIndexed => write!(f, "{name} (${lo:02X}),Y"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleBus;

    fn line(bytes: &[u8]) -> String {
        let mut bus = SimpleBus::new();
        bus.load(0x8000, bytes);
        disassemble(&bus, 0x8000).to_string()
    }

    #[test]
    fn formats_each_mode() {
        assert_eq!(line(&[0xEA]), "8000\tNOP");
        assert_eq!(line(&[0x0A]), "8000\tASL A");
        assert_eq!(line(&[0xA9, 0x42]), "8000\tLDA #$42");
        assert_eq!(line(&[0xA5, 0x10]), "8000\tLDA $10");
        assert_eq!(line(&[0xB5, 0x10]), "8000\tLDA $10,X");
        assert_eq!(line(&[0xB6, 0x10]), "8000\tLDX $10,Y");
        assert_eq!(line(&[0xAD, 0x34, 0x12]), "8000\tLDA $1234");
        assert_eq!(line(&[0xBD, 0x34, 0x12]), "8000\tLDA $1234,X");
        assert_eq!(line(&[0xB9, 0x34, 0x12]), "8000\tLDA $1234,Y");
        assert_eq!(line(&[0x6C, 0xFC, 0xFF]), "8000\tJMP ($FFFC)");
        assert_eq!(line(&[0xA1, 0x20]), "8000\tLDA ($20,X)");
        assert_eq!(line(&[0xB1, 0x20]), "8000\tLDA ($20),Y");
    }

    #[test]
    fn relative_operand_is_signed() {
        assert_eq!(line(&[0xD0, 0x05]), "8000\tBNE +5");
        assert_eq!(line(&[0xF0, 0xFD]), "8000\tBEQ -3");
    }

    #[test]
    fn invalid_opcode_prints_raw_byte() {
        let mut bus = SimpleBus::new();
        bus.load(0x8000, &[0x02, 0xFF]);
        let d = disassemble(&bus, 0x8000);
        assert_eq!(d.instruction, None);
        assert_eq!(d.size(), 1);
        assert_eq!(d.to_string(), "8000\t.byte $02");
    }

    #[test]
    fn next_address_skips_operands() {
        let mut bus = SimpleBus::new();
        bus.load(0x8000, &[0x20, 0x00, 0x90, 0xEA]);
        let jsr = disassemble(&bus, 0x8000);
        assert_eq!(jsr.next_address(), 0x8003);
        assert_eq!(disassemble(&bus, jsr.next_address()).to_string(), "8003\tNOP");
    }
}
