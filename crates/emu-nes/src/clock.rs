//! CPU-side machine clock.
//!
//! Counts CPU cycles and converts them to PPU time. The PPU keeps its own
//! counter; the two only meet when the bus asks the PPU to catch up.

use emu_core::{ClockRatio, Ticks};

#[derive(Debug, Clone, Copy)]
pub struct Clock {
    ratio: ClockRatio,
    cpu: Ticks,
}

impl Clock {
    #[must_use]
    pub fn new(ratio: ClockRatio) -> Self {
        Self {
            ratio,
            cpu: Ticks::ZERO,
        }
    }

    #[must_use]
    pub fn ratio(&self) -> ClockRatio {
        self.ratio
    }

    /// CPU cycles elapsed.
    #[must_use]
    pub fn cpu(&self) -> Ticks {
        self.cpu
    }

    /// Where the PPU should be for the current CPU time.
    #[must_use]
    pub fn coprocessor_target(&self) -> Ticks {
        self.ratio.to_coprocessor(self.cpu)
    }

    pub fn advance(&mut self, cpu_cycles: u32) {
        self.cpu += Ticks::new(u64::from(cpu_cycles));
    }
}
