//! Simulated ATtiny85 lessons.
//!
//! Each lesson is a small piece of firmware driving the registers of a simulated
//! ATtiny85, which is placed on a [Board](board::Board) together with LEDs and buttons.
//! The whole board is then clocked cycle by cycle and dumped into a VCD file.

pub mod pins;
pub mod vcd;
pub mod component;
pub mod board;
pub mod components;
pub mod soft_timer;
pub mod lessons;
