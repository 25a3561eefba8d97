//! Clock-domain ratios.

use crate::Ticks;

/// Fixed ratio between the CPU clock and a co-processor clock.
///
/// Expressed as `numerator / denominator` co-processor cycles per CPU
/// cycle. Both clocks derive from the same crystal, so the ratio is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockRatio {
    pub numerator: u64,
    pub denominator: u64,
}

impl ClockRatio {
    /// NTSC 2A03/2C02: crystal / 12 for the CPU, crystal / 4 for the PPU.
    pub const NTSC: Self = Self::new(3, 1);

    /// PAL 2A07/2C07: crystal / 16 for the CPU, crystal / 5 for the PPU.
    pub const PAL: Self = Self::new(16, 5);

    /// # Panics
    ///
    /// Panics at compile time (in const context) if `denominator` is zero.
    #[must_use]
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        assert!(denominator != 0, "clock ratio denominator must be non-zero");
        Self {
            numerator,
            denominator,
        }
    }

    /// Co-processor time equivalent to the given CPU time.
    #[must_use]
    pub const fn to_coprocessor(self, cpu: Ticks) -> Ticks {
        Ticks::new(cpu.get() * self.numerator / self.denominator)
    }
}

impl Default for ClockRatio {
    fn default() -> Self {
        Self::NTSC
    }
}
