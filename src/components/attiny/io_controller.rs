pub mod gpio;
pub mod timer0;

use std::collections::HashMap;
use mockall::*;

use crate::pins::{PinId, PinState};

use self::gpio::GpioPort;
use self::timer0::{Channel, Timer0};

use super::registers::*;

/// Prescaler shared by the timers, a free-running 10-bit counter.
const PRESCALER_MASK: u16 = 0x3FF;

/// Component pin of the core clock.
pub const CLOCK_PIN: PinId = 0;
/// Component pin of PB0, the following port B pins come right after it.
pub const PORTB_FIRST_PIN: PinId = 1;

/// Interrupt sources of the simulated peripherals, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Timer0Overflow,
    Timer0CompareA,
    Timer0CompareB,
}

impl Interrupt {
    /// Interrupt vector number, as in the ATtiny85 vector table.
    pub fn vector(self) -> u8 {
        match self {
            Interrupt::Timer0Overflow => 5,
            Interrupt::Timer0CompareA => 10,
            Interrupt::Timer0CompareB => 11,
        }
    }
}

/// An ATtiny85 IO controller (can be mocked)
#[automock]
pub trait IoControllerTrait: Send {
    /// Reads internal IO port
    fn read_internal_u8(&self, id: u8) -> u8;
    /// Writes to internal IO port
    fn write_internal_u8(&mut self, id: u8, val: u8);

    /// Advances the peripherals by one core clock.
    fn tick(&mut self);
    /// The highest priority interrupt which is enabled and pending.
    fn pending_interrupt(&self) -> Option<Interrupt>;
    /// Clears the source flag of an interrupt being entered.
    fn acknowledge(&mut self, interrupt: Interrupt);

    /// Returns `true` if is on rising edge of the clock
    fn is_clock_rising(&self) -> bool;
    // Get current clock pin value
    fn clock_pin(&self) -> PinState;

    /// Set input pin value
    fn set_pin(&mut self, pin: PinId, state: PinState);
    /// Get output pin changes (by filling a [HashMap])
    fn fill_output_changes(&mut self, changes: &mut HashMap<PinId, PinState>);

    /// Timer/Counter0, for inspection.
    fn timer0(&self) -> &Timer0;
}

/// Main implementation for [IoControllerTrait]
pub struct IoController {
    clock_pin: PinState,
    is_clock_rising: bool,
    prescaler: u16,

    gpio: GpioPort,
    timer0: Timer0,
}

impl IoController {
    pub fn new() -> IoController {
        IoController {
            clock_pin: PinState::Z,
            is_clock_rising: false,
            prescaler: 0,
            gpio: GpioPort::new(),
            timer0: Timer0::new(),
        }
    }

    pub fn gpio(&self) -> &GpioPort {
        &self.gpio
    }

    /// Hands PB0/PB1 to the compare outputs while the timer drives them.
    fn route_compare_outputs(&mut self) {
        self.gpio.set_override(PB0 as usize, self.timer0.output(Channel::A));
        self.gpio.set_override(PB1 as usize, self.timer0.output(Channel::B));
    }
}

impl Default for IoController {
    fn default() -> Self {
        IoController::new()
    }
}

impl IoControllerTrait for IoController {
    fn read_internal_u8(&self, id: u8) -> u8 {
        match id {
            PINB => self.gpio.read_pin(),
            DDRB => self.gpio.read_ddr(),
            PORTB => self.gpio.read_port(),
            OCR0B => self.timer0.read_ocr(Channel::B),
            OCR0A => self.timer0.read_ocr(Channel::A),
            TCCR0A => self.timer0.read_tccr0a(),
            TCNT0 => self.timer0.read_tcnt0(),
            TCCR0B => self.timer0.read_tccr0b(),
            TIFR => self.timer0.read_tifr(),
            TIMSK => self.timer0.read_timsk(),
            _ => 0
        }
    }

    fn write_internal_u8(&mut self, id: u8, val: u8) {
        match id {
            PINB => self.gpio.write_pin(val),
            DDRB => self.gpio.write_ddr(val),
            PORTB => self.gpio.write_port(val),
            OCR0B => self.timer0.write_ocr(Channel::B, val),
            OCR0A => self.timer0.write_ocr(Channel::A, val),
            TCCR0A => self.timer0.write_tccr0a(val),
            TCNT0 => self.timer0.write_tcnt0(val),
            TCCR0B => self.timer0.write_tccr0b(val),
            TIFR => self.timer0.write_tifr(val),
            TIMSK => self.timer0.write_timsk(val),
            _ => return
        }
        self.route_compare_outputs();
    }

    fn tick(&mut self) {
        self.gpio.clock_rising_edge();
        self.prescaler = (self.prescaler + 1) & PRESCALER_MASK;
        let t0 = self.gpio.readable_state(PB2 as usize) == PinState::High;
        self.timer0.tick(self.prescaler, t0);
        self.route_compare_outputs();
    }

    fn pending_interrupt(&self) -> Option<Interrupt> {
        self.timer0.pending_interrupt()
    }

    fn acknowledge(&mut self, interrupt: Interrupt) {
        self.timer0.acknowledge(interrupt)
    }

    fn set_pin(&mut self, pin: PinId, state: PinState) {
        if pin == CLOCK_PIN {
            self.is_clock_rising = self.clock_pin == PinState::Low && state == PinState::High;
            self.clock_pin = state;
        }
        else if pin < PORTB_FIRST_PIN + PORTB_PINS as PinId {
            self.gpio.set_input_pin(pin - PORTB_FIRST_PIN, state);
        }
    }

    fn is_clock_rising(&self) -> bool {
        self.is_clock_rising
    }
    fn clock_pin(&self) -> PinState {
        self.clock_pin
    }

    fn fill_output_changes(&mut self, changes: &mut HashMap<PinId, PinState>) {
        for &(pin_index, state) in self.gpio.get_output_changes() {
            changes.insert(PORTB_FIRST_PIN + pin_index, state);
        }
        self.gpio.reset_pins();
    }

    fn timer0(&self) -> &Timer0 {
        &self.timer0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_addresses_read_zero() {
        let mut io = IoController::new();
        io.write_internal_u8(0x00, 0xFF);
        assert_eq!(io.read_internal_u8(0x00), 0);
        assert_eq!(io.read_internal_u8(SREG), 0);
    }

    #[test]
    fn port_b_is_mapped_after_the_clock() {
        let mut io = IoController::new();
        io.write_internal_u8(DDRB, bv(DDB1));
        io.write_internal_u8(PORTB, bv(PORTB1));

        let mut changes = HashMap::new();
        io.fill_output_changes(&mut changes);
        assert_eq!(changes.get(&2), Some(&PinState::High));

        io.set_pin(PORTB_FIRST_PIN + PB3 as PinId, PinState::High);
        io.tick();
        assert_eq!(io.read_internal_u8(PINB), bv(PB1) | bv(PB3));
    }

    #[test]
    fn clock_edges() {
        let mut io = IoController::new();
        io.set_pin(CLOCK_PIN, PinState::Low);
        assert!(!io.is_clock_rising());
        io.set_pin(CLOCK_PIN, PinState::High);
        assert!(io.is_clock_rising());
        io.set_pin(CLOCK_PIN, PinState::Low);
        assert!(!io.is_clock_rising());
    }

    #[test]
    fn compare_output_takes_over_pb0() {
        let mut io = IoController::new();
        io.write_internal_u8(DDRB, bv(DDB0));
        io.write_internal_u8(OCR0A, 2);
        io.write_internal_u8(TCCR0A, bv(COM0A0) | bv(WGM01));
        io.write_internal_u8(TCCR0B, bv(CS00));
        assert_eq!(io.gpio().output_state(0), PinState::Low);

        io.tick();
        io.tick();
        assert_eq!(io.read_internal_u8(TCNT0), 2);
        assert_eq!(io.gpio().output_state(0), PinState::High);
        assert!(io.read_internal_u8(TIFR) & bv(OCF0A) != 0);
    }

    #[test]
    fn overflow_interrupt_is_pending_until_acknowledged() {
        let mut io = IoController::new();
        io.write_internal_u8(TIMSK, bv(TOIE0));
        io.write_internal_u8(TCCR0B, bv(CS00));
        for _ in 0..256 {
            io.tick();
        }
        assert_eq!(io.pending_interrupt(), Some(Interrupt::Timer0Overflow));
        io.acknowledge(Interrupt::Timer0Overflow);
        assert_eq!(io.pending_interrupt(), None);
        assert_eq!(Interrupt::Timer0Overflow.vector(), 5);
    }
}
