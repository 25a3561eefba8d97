//! CPU core trait.

use crate::Bus;

/// A CPU core emulated at instruction granularity.
///
/// The bus is passed in, not owned, so the machine can keep devices on it
/// that the CPU knows nothing about.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Why the CPU stopped executing.
    type Fault;

    /// Execute one whole instruction. Returns the cycles it took.
    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, Self::Fault>;

    /// Reset to the power-on state and load the reset vector.
    fn reset<B: Bus>(&mut self, bus: &mut B);

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true once the CPU has stopped on a fault.
    fn is_halted(&self) -> bool;
}
