//! Per-mnemonic execution.
//!
//! Runs after the resolver, with PC already pointing at the next
//! instruction. Returns the branch penalty (0, 1 or 2 cycles); every other
//! cost is known before execution.

use emu_core::Bus;

use crate::addressing::Operand;
use crate::flags::{C, D, I, N, V, Z};
use crate::table::Mnemonic;
use crate::{Mos6502, Status};

impl Mos6502 {
    pub(crate) fn execute<B: Bus>(
        &mut self,
        mnemonic: Mnemonic,
        operand: Operand,
        bus: &mut B,
    ) -> u8 {
        match mnemonic {
            // Loads and stores
            Mnemonic::Lda => {
                self.regs.a = self.value(operand, bus);
                self.regs.p.update_nz(self.regs.a);
            }
            Mnemonic::Ldx => {
                self.regs.x = self.value(operand, bus);
                self.regs.p.update_nz(self.regs.x);
            }
            Mnemonic::Ldy => {
                self.regs.y = self.value(operand, bus);
                self.regs.p.update_nz(self.regs.y);
            }
            Mnemonic::Sta => self.store(operand, bus, self.regs.a),
            Mnemonic::Stx => self.store(operand, bus, self.regs.x),
            Mnemonic::Sty => self.store(operand, bus, self.regs.y),

            // Transfers (TXS is the only one that leaves flags alone)
            Mnemonic::Tax => {
                self.regs.x = self.regs.a;
                self.regs.p.update_nz(self.regs.x);
            }
            Mnemonic::Tay => {
                self.regs.y = self.regs.a;
                self.regs.p.update_nz(self.regs.y);
            }
            Mnemonic::Txa => {
                self.regs.a = self.regs.x;
                self.regs.p.update_nz(self.regs.a);
            }
            Mnemonic::Tya => {
                self.regs.a = self.regs.y;
                self.regs.p.update_nz(self.regs.a);
            }
            Mnemonic::Tsx => {
                self.regs.x = self.regs.s;
                self.regs.p.update_nz(self.regs.x);
            }
            Mnemonic::Txs => self.regs.s = self.regs.x,

            // Arithmetic and logic
            Mnemonic::Adc => {
                let val = self.value(operand, bus);
                self.do_adc(val);
            }
            Mnemonic::Sbc => {
                // SBC is ADC with inverted operand
                let val = self.value(operand, bus);
                self.do_adc(!val);
            }
            Mnemonic::And => {
                self.regs.a &= self.value(operand, bus);
                self.regs.p.update_nz(self.regs.a);
            }
            Mnemonic::Ora => {
                self.regs.a |= self.value(operand, bus);
                self.regs.p.update_nz(self.regs.a);
            }
            Mnemonic::Eor => {
                self.regs.a ^= self.value(operand, bus);
                self.regs.p.update_nz(self.regs.a);
            }
            Mnemonic::Bit => {
                let val = self.value(operand, bus);
                self.regs.p.set_if(Z, self.regs.a & val == 0);
                self.regs.p.set_if(N, val & 0x80 != 0);
                self.regs.p.set_if(V, val & 0x40 != 0);
            }
            Mnemonic::Cmp => {
                let val = self.value(operand, bus);
                self.compare(self.regs.a, val);
            }
            Mnemonic::Cpx => {
                let val = self.value(operand, bus);
                self.compare(self.regs.x, val);
            }
            Mnemonic::Cpy => {
                let val = self.value(operand, bus);
                self.compare(self.regs.y, val);
            }

            // Read-modify-write
            Mnemonic::Asl => self.modify(operand, bus, Self::do_asl),
            Mnemonic::Lsr => self.modify(operand, bus, Self::do_lsr),
            Mnemonic::Rol => self.modify(operand, bus, Self::do_rol),
            Mnemonic::Ror => self.modify(operand, bus, Self::do_ror),
            Mnemonic::Inc => self.modify(operand, bus, Self::do_inc),
            Mnemonic::Dec => self.modify(operand, bus, Self::do_dec),

            // Register increment/decrement
            Mnemonic::Inx => {
                self.regs.x = self.regs.x.wrapping_add(1);
                self.regs.p.update_nz(self.regs.x);
            }
            Mnemonic::Iny => {
                self.regs.y = self.regs.y.wrapping_add(1);
                self.regs.p.update_nz(self.regs.y);
            }
            Mnemonic::Dex => {
                self.regs.x = self.regs.x.wrapping_sub(1);
                self.regs.p.update_nz(self.regs.x);
            }
            Mnemonic::Dey => {
                self.regs.y = self.regs.y.wrapping_sub(1);
                self.regs.p.update_nz(self.regs.y);
            }

            // Branches
            Mnemonic::Bpl => return self.branch(operand, !self.regs.p.is_set(N)),
            Mnemonic::Bmi => return self.branch(operand, self.regs.p.is_set(N)),
            Mnemonic::Bvc => return self.branch(operand, !self.regs.p.is_set(V)),
            Mnemonic::Bvs => return self.branch(operand, self.regs.p.is_set(V)),
            Mnemonic::Bcc => return self.branch(operand, !self.regs.p.is_set(C)),
            Mnemonic::Bcs => return self.branch(operand, self.regs.p.is_set(C)),
            Mnemonic::Bne => return self.branch(operand, !self.regs.p.is_set(Z)),
            Mnemonic::Beq => return self.branch(operand, self.regs.p.is_set(Z)),

            // Jumps and subroutines
            Mnemonic::Jmp => {
                if let Operand::Address(target) = operand {
                    self.regs.pc = target;
                }
            }
            Mnemonic::Jsr => {
                if let Operand::Address(target) = operand {
                    // Pushes the address of the JSR's last byte.
                    let ret = self.regs.pc.wrapping_sub(1);
                    self.push_word(bus, ret);
                    self.regs.pc = target;
                }
            }
            Mnemonic::Rts => {
                self.regs.pc = self.pull_word(bus).wrapping_add(1);
            }
            Mnemonic::Brk => {
                // BRK skips a padding byte: the return address is BRK + 2.
                let ret = self.regs.pc.wrapping_add(1);
                self.push_word(bus, ret);
                let p = self.regs.p.to_pushed();
                self.push(bus, p);
                self.regs.p.set(I);
                self.regs.pc = Self::irq_brk_target(bus);
            }
            Mnemonic::Rti => {
                let p = self.pull(bus);
                self.regs.p = Status::from_pulled(p);
                self.regs.pc = self.pull_word(bus);
            }

            // Stack
            Mnemonic::Pha => self.push(bus, self.regs.a),
            Mnemonic::Php => {
                let p = self.regs.p.to_pushed();
                self.push(bus, p);
            }
            Mnemonic::Pla => {
                self.regs.a = self.pull(bus);
                self.regs.p.update_nz(self.regs.a);
            }
            Mnemonic::Plp => {
                let p = self.pull(bus);
                self.regs.p = Status::from_pulled(p);
            }

            // Flags
            Mnemonic::Clc => self.regs.p.clear(C),
            Mnemonic::Sec => self.regs.p.set(C),
            Mnemonic::Cli => self.regs.p.clear(I),
            Mnemonic::Sei => self.regs.p.set(I),
            Mnemonic::Cld => self.regs.p.clear(D),
            Mnemonic::Sed => self.regs.p.set(D),
            Mnemonic::Clv => self.regs.p.clear(V),

            Mnemonic::Nop => {}
        }
        0
    }

    /// The operand as a value, reading memory if the resolver handed back
    /// an address.
    fn value<B: Bus>(&self, operand: Operand, bus: &mut B) -> u8 {
        match operand {
            Operand::Value(v) => v,
            Operand::Address(addr) => bus.read(addr),
            Operand::Accumulator => self.regs.a,
            Operand::None => 0,
        }
    }

    fn store<B: Bus>(&self, operand: Operand, bus: &mut B, value: u8) {
        if let Operand::Address(addr) = operand {
            bus.write(addr, value);
        }
    }

    fn modify<B: Bus>(&mut self, operand: Operand, bus: &mut B, op: fn(&mut Self, u8) -> u8) {
        match operand {
            Operand::Accumulator => {
                let a = self.regs.a;
                self.regs.a = op(self, a);
            }
            Operand::Address(addr) => {
                let val = bus.read(addr);
                // The 6502 writes the unmodified value back before the result.
                bus.write(addr, val);
                let result = op(self, val);
                bus.write(addr, result);
            }
            Operand::Value(_) | Operand::None => {}
        }
    }

    fn branch(&mut self, operand: Operand, taken: bool) -> u8 {
        let Operand::Address(target) = operand else {
            return 0;
        };
        if !taken {
            return 0;
        }
        let crossed = (self.regs.pc & 0xFF00) != (target & 0xFF00);
        self.regs.pc = target;
        if crossed { 2 } else { 1 }
    }

    fn compare(&mut self, reg: u8, val: u8) {
        self.regs.p.set_if(C, reg >= val);
        self.regs.p.update_nz(reg.wrapping_sub(val));
    }

    /// Binary add with carry. D is ignored: the 2A03 has no decimal mode.
    fn do_adc(&mut self, val: u8) {
        let a = self.regs.a;
        let carry = u16::from(self.regs.p.is_set(C));
        let sum = u16::from(a) + u16::from(val) + carry;
        let result = sum as u8;

        self.regs.p.set_if(C, sum > 0xFF);
        self.regs
            .p
            .set_if(V, (a ^ result) & (val ^ result) & 0x80 != 0);
        self.regs.a = result;
        self.regs.p.update_nz(result);
    }

    fn do_asl(&mut self, val: u8) -> u8 {
        self.regs.p.set_if(C, val & 0x80 != 0);
        let result = val << 1;
        self.regs.p.update_nz(result);
        result
    }

    fn do_lsr(&mut self, val: u8) -> u8 {
        self.regs.p.set_if(C, val & 0x01 != 0);
        let result = val >> 1;
        self.regs.p.update_nz(result);
        result
    }

    fn do_rol(&mut self, val: u8) -> u8 {
        let carry_in = u8::from(self.regs.p.is_set(C));
        self.regs.p.set_if(C, val & 0x80 != 0);
        let result = (val << 1) | carry_in;
        self.regs.p.update_nz(result);
        result
    }

    fn do_ror(&mut self, val: u8) -> u8 {
        let carry_in = if self.regs.p.is_set(C) { 0x80 } else { 0 };
        self.regs.p.set_if(C, val & 0x01 != 0);
        let result = (val >> 1) | carry_in;
        self.regs.p.update_nz(result);
        result
    }

    fn do_inc(&mut self, val: u8) -> u8 {
        let result = val.wrapping_add(1);
        self.regs.p.update_nz(result);
        result
    }

    fn do_dec(&mut self, val: u8) -> u8 {
        let result = val.wrapping_sub(1);
        self.regs.p.update_nz(result);
        result
    }
}
