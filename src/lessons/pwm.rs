//! Hardware PWM on OC0A (PB0), in fast and phase correct modes.
//!
//! Once the timer is set up the main loop is free, the waveform is generated by
//! Timer/Counter0 alone. In both modes OC0A is cleared on compare match (counting up)
//! and the output is HIGH while TCNT0 is below OCR0A.

use crate::components::attiny::io_controller::timer0::{ClockSelect, COUNTER_STEPS};
use crate::components::attiny::registers::*;
use crate::components::attiny::{Cpu, Firmware, IoControllerTrait};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmMode {
    /// Counts 0 to 255 and restarts, `f = f_cpu / (N * 256)`.
    Fast,
    /// Counts 0 to 255 and back down, `f = f_cpu / (N * 510)`.
    PhaseCorrect,
}

impl PwmMode {
    /// WGM01:0 bits of TCCR0A.
    pub fn wgm_bits(self) -> u8 {
        match self {
            PwmMode::Fast => bv(WGM01) | bv(WGM00),
            PwmMode::PhaseCorrect => bv(WGM00),
        }
    }

    /// Timer clocks per PWM period.
    pub fn period_steps(self) -> u32 {
        match self {
            PwmMode::Fast => COUNTER_STEPS,
            PwmMode::PhaseCorrect => 2 * (COUNTER_STEPS - 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmConfig {
    pub mode: PwmMode,
    pub clock_select: ClockSelect,
    /// OCR0A
    pub duty: u8,
}

impl PwmConfig {
    /// Fast PWM at 3.81 Hz (1 MHz, /1024), OCR0A = 10.
    pub fn fast() -> PwmConfig {
        PwmConfig {
            mode: PwmMode::Fast,
            clock_select: ClockSelect::Clk1024,
            duty: 10,
        }
    }

    /// Phase correct PWM at 1.91 Hz (1 MHz, /1024), OCR0A = 150.
    pub fn phase_correct() -> PwmConfig {
        PwmConfig {
            mode: PwmMode::PhaseCorrect,
            clock_select: ClockSelect::Clk1024,
            duty: 150,
        }
    }

    /// Core cycles per PWM period, `None` unless clocked from the prescaler.
    pub fn period_cycles(&self) -> Option<u64> {
        let prescale = self.clock_select.factor()?;
        Some(prescale as u64 * self.mode.period_steps() as u64)
    }

    /// PWM frequency in Hz.
    pub fn frequency(&self, f_cpu: u32) -> Option<f64> {
        self.period_cycles().map(|cycles| f_cpu as f64 / cycles as f64)
    }

    /// Share of the period OC0A spends HIGH, from 0 to 1.
    pub fn duty_cycle(&self) -> f64 {
        match self.mode {
            PwmMode::Fast => self.duty as f64 / COUNTER_STEPS as f64,
            PwmMode::PhaseCorrect => self.duty as f64 / (COUNTER_STEPS - 1) as f64,
        }
    }
}

/// Sets up Timer/Counter0 to drive PB0 and idles.
#[derive(Debug)]
pub struct Pwm {
    config: PwmConfig,
}

impl Pwm {
    pub fn new(config: PwmConfig) -> Pwm {
        Pwm { config }
    }

    pub fn config(&self) -> &PwmConfig {
        &self.config
    }
}

impl Firmware for Pwm {
    fn setup<Io: IoControllerTrait>(&mut self, cpu: &mut Cpu<'_, Io>) {
        cpu.write(DDRB, bv(PB0));
        cpu.set_bits(TCCR0A, self.config.mode.wgm_bits());
        // non-inverting: clear OC0A on compare match when counting up
        cpu.set_bits(TCCR0A, bv(COM0A1));
        cpu.set_bits(TCCR0B, self.config.clock_select.bits());
        cpu.write(OCR0A, self.config.duty);
    }

    fn main_loop<Io: IoControllerTrait>(&mut self, cpu: &mut Cpu<'_, Io>) {
        cpu.idle();
    }
}
