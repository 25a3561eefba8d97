//! Addressing-mode resolver.
//!
//! Turns an instruction's addressing mode plus the current registers into
//! a structured operand: how many operand bytes were consumed, the value or
//! effective address, and any page-cross penalty. The resolver reads
//! operand bytes (and, for read-class instructions, the operand itself)
//! through the bus but never touches the registers, so resolving twice from
//! the same state gives the same result.
//!
//! Indexed modes:
//! - Zero Page,X / Zero Page,Y: the sum wraps within page zero
//! - Absolute,X / Absolute,Y: carry into the high byte, +1 cycle on a page
//!   cross for read-class instructions
//! - ($nn,X): X is added to the pointer before the dereference, in page zero
//! - ($nn),Y: the pointer is dereferenced first, then Y is added

use emu_core::Bus;

use crate::Registers;
use crate::table::{Access, AddressingMode, Instruction};

/// How `JMP ($nnnn)` fetches the high byte of its target when the pointer
/// sits on the last byte of a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndirectJump {
    /// Hardware behaviour: the pointer's low byte wraps and the high byte
    /// is read from the start of the same page (`$10FF` → `$10FF`/`$1000`).
    #[default]
    PageWrap,
    /// Corrected behaviour: the high byte comes from the next page
    /// (`$10FF` → `$10FF`/`$1100`).
    CrossPage,
}

/// The operand an instruction acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// No operand.
    None,
    /// The accumulator.
    Accumulator,
    /// A value already fetched (immediate, or memory for read-class).
    Value(u8),
    /// An effective address: store target, read-modify-write target, jump
    /// target or branch target.
    Address(u16),
}

/// Result of resolving one instruction's operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    /// Operand bytes consumed after the opcode.
    pub len: u8,
    pub operand: Operand,
    /// Page-cross penalty cycles (0 or 1).
    pub extra_cycles: u8,
}

/// Resolve the operand of `instr`, whose opcode byte is at `regs.pc`.
pub fn resolve<B: Bus>(
    instr: Instruction,
    regs: &Registers,
    bus: &mut B,
    indirect_jump: IndirectJump,
) -> Resolved {
    let operand_pc = regs.pc.wrapping_add(1);
    let access = instr.mnemonic.access();
    let len = instr.mode.operand_len();

    let (address, page_crossed) = match instr.mode {
        AddressingMode::Implied => return resolved(len, Operand::None, 0),
        AddressingMode::Accumulator => return resolved(len, Operand::Accumulator, 0),
        AddressingMode::Immediate => {
            let value = bus.read(operand_pc);
            return resolved(len, Operand::Value(value), 0);
        }
        AddressingMode::Relative => {
            let offset = bus.read(operand_pc) as i8;
            let next = operand_pc.wrapping_add(1);
            let target = next.wrapping_add(offset as u16);
            return resolved(len, Operand::Address(target), 0);
        }
        AddressingMode::ZeroPage => (u16::from(bus.read(operand_pc)), false),
        AddressingMode::ZeroPageX => {
            let base = bus.read(operand_pc);
            (u16::from(base.wrapping_add(regs.x)), false)
        }
        AddressingMode::ZeroPageY => {
            let base = bus.read(operand_pc);
            (u16::from(base.wrapping_add(regs.y)), false)
        }
        AddressingMode::Absolute => (read_word(bus, operand_pc), false),
        AddressingMode::AbsoluteX => index(read_word(bus, operand_pc), regs.x),
        AddressingMode::AbsoluteY => index(read_word(bus, operand_pc), regs.y),
        AddressingMode::Indirect => {
            let pointer = read_word(bus, operand_pc);
            let target = match indirect_jump {
                IndirectJump::PageWrap => read_word_page_wrap(bus, pointer),
                IndirectJump::CrossPage => read_word(bus, pointer),
            };
            (target, false)
        }
        AddressingMode::IndexedIndirect => {
            let pointer = bus.read(operand_pc).wrapping_add(regs.x);
            (read_zero_page_word(bus, pointer), false)
        }
        AddressingMode::IndirectIndexed => {
            let pointer = bus.read(operand_pc);
            index(read_zero_page_word(bus, pointer), regs.y)
        }
    };

    match access {
        Access::Read => {
            let value = bus.read(address);
            let extra = u8::from(page_crossed);
            resolved(len, Operand::Value(value), extra)
        }
        // Write and RMW forms always take the fixup cycle; it is already in
        // the base cost.
        _ => resolved(len, Operand::Address(address), 0),
    }
}

const fn resolved(len: u8, operand: Operand, extra_cycles: u8) -> Resolved {
    Resolved {
        len,
        operand,
        extra_cycles,
    }
}

/// Add an index register to a base address. Returns (address, `page_crossed`).
fn index(base: u16, offset: u8) -> (u16, bool) {
    let addr = base.wrapping_add(u16::from(offset));
    (addr, (base & 0xFF00) != (addr & 0xFF00))
}

/// Read a 16-bit word (little-endian).
fn read_word<B: Bus>(bus: &mut B, addr: u16) -> u16 {
    let low = bus.read(addr);
    let high = bus.read(addr.wrapping_add(1));
    u16::from_le_bytes([low, high])
}

/// Read a 16-bit word whose high byte wraps within the page of `addr`.
fn read_word_page_wrap<B: Bus>(bus: &mut B, addr: u16) -> u16 {
    let low = bus.read(addr);
    let high_addr = (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF);
    let high = bus.read(high_addr);
    u16::from_le_bytes([low, high])
}

/// Read a pointer from page zero; `$FF` takes its high byte from `$00`.
fn read_zero_page_word<B: Bus>(bus: &mut B, pointer: u8) -> u16 {
    let low = bus.read(u16::from(pointer));
    let high = bus.read(u16::from(pointer.wrapping_add(1)));
    u16::from_le_bytes([low, high])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode;
    use emu_core::SimpleBus;

    fn regs_at(pc: u16) -> Registers {
        Registers {
            pc,
            ..Registers::new()
        }
    }

    fn run(bus: &mut SimpleBus, regs: &Registers, opcode: u8) -> Resolved {
        let instr = decode(opcode).expect("documented opcode");
        resolve(instr, regs, bus, IndirectJump::PageWrap)
    }

    #[test]
    fn operand_lengths_match_modes() {
        let expected = |mode: AddressingMode| -> u8 {
            match mode {
                AddressingMode::Implied | AddressingMode::Accumulator => 0,
                AddressingMode::Immediate
                | AddressingMode::ZeroPage
                | AddressingMode::ZeroPageX
                | AddressingMode::ZeroPageY
                | AddressingMode::Relative
                | AddressingMode::IndexedIndirect
                | AddressingMode::IndirectIndexed => 1,
                AddressingMode::Absolute
                | AddressingMode::AbsoluteX
                | AddressingMode::AbsoluteY
                | AddressingMode::Indirect => 2,
            }
        };
        let mut bus = SimpleBus::new();
        let regs = regs_at(0x0200);
        for opcode in 0..=255u8 {
            if let Some(instr) = decode(opcode) {
                let r = resolve(instr, &regs, &mut bus, IndirectJump::PageWrap);
                assert_eq!(r.len, expected(instr.mode), "${opcode:02X}");
            }
        }

        // Opcodes with known encodings.
        for (opcode, bytes) in [
            (0xEA, 0), // NOP
            (0x0A, 0), // ASL A
            (0xA9, 1), // LDA #
            (0xB1, 1), // LDA (zp),Y
            (0xD0, 1), // BNE
            (0x6C, 2), // JMP (abs)
            (0xBE, 2), // LDX abs,Y
        ] {
            assert_eq!(run(&mut bus, &regs, opcode).len, bytes, "${opcode:02X}");
        }
    }

    #[test]
    fn immediate_is_a_value() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0xA9, 0x42]);
        let r = run(&mut bus, &regs_at(0x0200), 0xA9);
        assert_eq!(r, resolved(1, Operand::Value(0x42), 0));
    }

    #[test]
    fn absolute_x_page_cross_costs_a_cycle() {
        let mut bus = SimpleBus::new();
        // LDA $12FF,X with X = 1 -> $1300
        bus.load(0x0200, &[0xBD, 0xFF, 0x12]);
        bus.load(0x1300, &[0x77]);
        let mut regs = regs_at(0x0200);
        regs.x = 0x01;
        let r = run(&mut bus, &regs, 0xBD);
        assert_eq!(r, resolved(2, Operand::Value(0x77), 1));
    }

    #[test]
    fn absolute_x_same_page_is_free() {
        let mut bus = SimpleBus::new();
        // LDA $1200,X with X = 1 -> $1201
        bus.load(0x0200, &[0xBD, 0x00, 0x12]);
        bus.load(0x1201, &[0x55]);
        let mut regs = regs_at(0x0200);
        regs.x = 0x01;
        let r = run(&mut bus, &regs, 0xBD);
        assert_eq!(r, resolved(2, Operand::Value(0x55), 0));
    }

    #[test]
    fn store_never_pays_page_cross_penalty() {
        let mut bus = SimpleBus::new();
        // STA $12FF,X
        bus.load(0x0200, &[0x9D, 0xFF, 0x12]);
        let mut regs = regs_at(0x0200);
        regs.x = 0x01;
        let r = run(&mut bus, &regs, 0x9D);
        assert_eq!(r, resolved(2, Operand::Address(0x1300), 0));
    }

    #[test]
    fn zero_page_x_wraps_in_page_zero() {
        let mut bus = SimpleBus::new();
        // STA $F0,X with X = $20 -> $0010
        bus.load(0x0200, &[0x95, 0xF0]);
        let mut regs = regs_at(0x0200);
        regs.x = 0x20;
        let r = run(&mut bus, &regs, 0x95);
        assert_eq!(r.operand, Operand::Address(0x0010));
    }

    #[test]
    fn zero_page_y_wraps_in_page_zero() {
        let mut bus = SimpleBus::new();
        // STX $FF,Y with Y = 2 -> $0001
        bus.load(0x0200, &[0x96, 0xFF]);
        let mut regs = regs_at(0x0200);
        regs.y = 0x02;
        let r = run(&mut bus, &regs, 0x96);
        assert_eq!(r.operand, Operand::Address(0x0001));
    }

    #[test]
    fn indexed_indirect_adds_x_before_dereference() {
        let mut bus = SimpleBus::new();
        // LDA ($20,X) with X = 4 -> pointer at $24 -> $0400
        bus.load(0x0200, &[0xA1, 0x20]);
        bus.load(0x0024, &[0x00, 0x04]);
        bus.load(0x0400, &[0x99]);
        let mut regs = regs_at(0x0200);
        regs.x = 0x04;
        let r = run(&mut bus, &regs, 0xA1);
        assert_eq!(r, resolved(1, Operand::Value(0x99), 0));
    }

    #[test]
    fn indexed_indirect_pointer_wraps_in_page_zero() {
        let mut bus = SimpleBus::new();
        // STA ($FE,X) with X = 1 -> pointer at $FF, high byte from $00
        bus.load(0x0200, &[0x81, 0xFE]);
        bus.load(0x00FF, &[0x34]);
        bus.load(0x0000, &[0x12]);
        let mut regs = regs_at(0x0200);
        regs.x = 0x01;
        let r = run(&mut bus, &regs, 0x81);
        assert_eq!(r.operand, Operand::Address(0x1234));
    }

    #[test]
    fn indirect_indexed_adds_y_after_dereference() {
        let mut bus = SimpleBus::new();
        // LDA ($40),Y with ($40) = $12FF and Y = 1 -> $1300, page cross
        bus.load(0x0200, &[0xB1, 0x40]);
        bus.load(0x0040, &[0xFF, 0x12]);
        bus.load(0x1300, &[0x80]);
        let mut regs = regs_at(0x0200);
        regs.y = 0x01;
        let r = run(&mut bus, &regs, 0xB1);
        assert_eq!(r, resolved(1, Operand::Value(0x80), 1));
    }

    #[test]
    fn relative_target_is_from_following_instruction() {
        let mut bus = SimpleBus::new();
        // BNE -3 at $0200 -> $0202 - 3 = $01FF
        bus.load(0x0200, &[0xD0, 0xFD]);
        let r = run(&mut bus, &regs_at(0x0200), 0xD0);
        assert_eq!(r, resolved(1, Operand::Address(0x01FF), 0));
    }

    #[test]
    fn indirect_jump_page_wrap() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0x6C, 0xFF, 0x10]);
        bus.load(0x10FF, &[0x34]);
        bus.load(0x1000, &[0x12]);
        bus.load(0x1100, &[0x56]);
        let instr = decode(0x6C).expect("JMP ind");
        let regs = regs_at(0x0200);

        let wrapped = resolve(instr, &regs, &mut bus, IndirectJump::PageWrap);
        assert_eq!(wrapped.operand, Operand::Address(0x1234));

        let fixed = resolve(instr, &regs, &mut bus, IndirectJump::CrossPage);
        assert_eq!(fixed.operand, Operand::Address(0x5634));
    }

    #[test]
    fn resolution_is_repeatable() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0xB9, 0xF0, 0x30]);
        let mut regs = regs_at(0x0200);
        regs.y = 0x20;
        let first = run(&mut bus, &regs, 0xB9);
        let second = run(&mut bus, &regs, 0xB9);
        assert_eq!(first, second);
        assert_eq!(regs.pc, 0x0200);
    }
}
