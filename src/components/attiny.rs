//! Simulated ATtiny85.
//!
//! Only the peripherals the lessons use are modelled: GPIO port B and Timer/Counter0,
//! together with the interrupts they raise.

pub mod registers;
pub mod io_controller;
pub mod firmware;
pub mod mcu;
mod sreg;

pub use self::firmware::{Cpu, Firmware};
pub use self::io_controller::{Interrupt, IoController, IoControllerTrait};
pub use self::mcu::Mcu;
pub use self::sreg::StatusRegister;

/// Core clock of a factory-fresh ATtiny85: 8 MHz RC oscillator divided by 8 (CKDIV8).
pub const DEFAULT_F_CPU: u32 = 1_000_000;

/// An ATtiny85 running `F` on the real register bank.
pub type Attiny85<F> = Mcu<F, IoController>;
