//! Components which can be placed on a [Board](crate::board::Board).

pub mod attiny;
pub mod button;
pub mod led;
