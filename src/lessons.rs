//! Firmware of the lessons, one module per lesson.
//!
//! Each lesson is a [Firmware](crate::components::attiny::Firmware) with a `Default`
//! configuration matching the classic ATtiny85 tutorials at 1 MHz.

pub mod blink;
pub mod blink_interrupts;
pub mod gpio;
pub mod pwm;
