//! Blink an LED on PB0 at 1 Hz by busy-waiting.

use crate::components::attiny::registers::*;
use crate::components::attiny::{Cpu, Firmware, IoControllerTrait};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkDelayConfig {
    /// Time between two toggles of PB0.
    pub half_period_ms: u32,
}

impl Default for BlinkDelayConfig {
    fn default() -> Self {
        BlinkDelayConfig { half_period_ms: 500 }
    }
}

/// `loop { _delay_ms(500); PORTB ^= _BV(PORTB0); }` after driving PB0 HIGH.
///
/// Each firmware pass takes effect at once, so the loop is rotated: setup ends with
/// the first delay and every pass toggles first, then waits.
#[derive(Debug, Default)]
pub struct BlinkDelay {
    config: BlinkDelayConfig,
}

impl BlinkDelay {
    pub fn new(config: BlinkDelayConfig) -> BlinkDelay {
        BlinkDelay { config }
    }

    pub fn config(&self) -> &BlinkDelayConfig {
        &self.config
    }
}

impl Firmware for BlinkDelay {
    fn setup<Io: IoControllerTrait>(&mut self, cpu: &mut Cpu<'_, Io>) {
        cpu.set_bits(DDRB, bv(DDB0));
        cpu.set_bits(PORTB, bv(PORTB0));
        cpu.delay_ms(self.config.half_period_ms);
    }

    fn main_loop<Io: IoControllerTrait>(&mut self, cpu: &mut Cpu<'_, Io>) {
        cpu.toggle_bits(PORTB, bv(PORTB0));
        cpu.delay_ms(self.config.half_period_ms);
    }
}
