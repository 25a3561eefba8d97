//! Lazily-stepped devices.

use crate::Ticks;

/// A device that runs on its own clock and is stepped on demand.
///
/// Nothing steps a co-processor on a timer. The bus calls
/// [`catch_up`](Coprocessor::catch_up) immediately before the CPU observes
/// or changes the device, so the CPU never sees state from the future or
/// the past.
pub trait Coprocessor {
    /// Cycles elapsed in the co-processor's own clock domain.
    fn now(&self) -> Ticks;

    /// Advance by exactly one co-processor cycle.
    fn step(&mut self);

    /// Advance until `now() >= target`.
    ///
    /// A target at or before the current time is a no-op. Implementations
    /// may override for speed, but must end in the same state.
    fn catch_up(&mut self, target: Ticks) {
        while self.now() < target {
            self.step();
        }
    }
}
