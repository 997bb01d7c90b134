//! Blink an LED on PB0 from the Timer/Counter0 overflow interrupt.
//!
//! At 1 MHz with a /64 prescaler the counter overflows every 16.384 ms, so toggling
//! every 31 overflows gives a half period of 507.904 ms, close enough to 1 Hz.
//! The main loop does nothing at all.

use log::debug;

use crate::components::attiny::io_controller::timer0::ClockSelect;
use crate::components::attiny::registers::*;
use crate::components::attiny::{Cpu, Firmware, Interrupt, IoControllerTrait};
use crate::soft_timer::{self, PeriodicToggle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkConfig {
    /// Timer/Counter0 clock source.
    pub clock_select: ClockSelect,
    /// Overflows per toggle.
    pub threshold: u32,
    /// Extra cycles spent in every overflow handler, on top of its register accesses.
    pub handler_cycles: u64,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        BlinkConfig {
            clock_select: ClockSelect::Clk64,
            threshold: 31,
            handler_cycles: 0,
        }
    }
}

impl BlinkConfig {
    /// Configuration toggling as close as possible to every `half_period` seconds.
    ///
    /// Panics if `clock_select` is not one of the prescaled core clocks.
    pub fn for_half_period(f_cpu: u32, clock_select: ClockSelect, half_period: f64) -> BlinkConfig {
        let Some(prescale) = clock_select.factor() else {
            panic!("{:?} is not driven by the core clock", clock_select)
        };
        BlinkConfig {
            clock_select,
            threshold: soft_timer::threshold_for(f_cpu, prescale, half_period),
            handler_cycles: 0,
        }
    }

    /// Core cycles between two toggles, if the handler keeps up.
    pub fn cycles_per_toggle(&self) -> Option<u64> {
        let prescale = self.clock_select.factor()?;
        Some(soft_timer::cycles_per_toggle(prescale, self.threshold))
    }
}

/// Interrupt driven blink.
#[derive(Debug)]
pub struct BlinkInterrupts {
    config: BlinkConfig,
    toggle: PeriodicToggle,
}

impl BlinkInterrupts {
    pub fn new(config: BlinkConfig) -> BlinkInterrupts {
        BlinkInterrupts {
            config,
            toggle: PeriodicToggle::new(config.threshold, true),
        }
    }

    pub fn config(&self) -> &BlinkConfig {
        &self.config
    }

    /// The overflow counter owned by the handler.
    pub fn toggle(&self) -> &PeriodicToggle {
        &self.toggle
    }
}

impl Default for BlinkInterrupts {
    fn default() -> Self {
        BlinkInterrupts::new(BlinkConfig::default())
    }
}

impl Firmware for BlinkInterrupts {
    fn setup<Io: IoControllerTrait>(&mut self, cpu: &mut Cpu<'_, Io>) {
        cpu.set_bits(TIMSK, bv(TOIE0));
        cpu.set_bits(TCCR0B, self.config.clock_select.bits());
        cpu.set_bits(DDRB, bv(DDB0));
        cpu.set_bits(PORTB, bv(PB0));
        cpu.sei();
    }

    fn main_loop<Io: IoControllerTrait>(&mut self, cpu: &mut Cpu<'_, Io>) {
        cpu.idle();
    }

    fn interrupt<Io: IoControllerTrait>(&mut self, interrupt: Interrupt, cpu: &mut Cpu<'_, Io>) {
        if interrupt != Interrupt::Timer0Overflow {
            return;
        }
        if self.toggle.on_overflow() {
            cpu.toggle_bits(PORTB, bv(PB0));
            debug!("PB0 toggled ({} so far)", self.toggle.toggles());
        }
        cpu.spend(self.config.handler_cycles);
    }
}
