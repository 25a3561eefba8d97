//! Core traits and types shared by the CPU core and the machine.
//!
//! The CPU drives everything. It reaches memory and devices through a
//! [`Bus`], and devices that run on their own clock implement
//! [`Coprocessor`] so the bus can bring them up to date before they are
//! observed.

mod bus;
mod clock;
mod coprocessor;
mod cpu;
mod observable;
mod ticks;

pub use bus::{Bus, SimpleBus};
pub use clock::ClockRatio;
pub use coprocessor::Coprocessor;
pub use cpu::Cpu;
pub use observable::{Observable, Value};
pub use ticks::Ticks;
