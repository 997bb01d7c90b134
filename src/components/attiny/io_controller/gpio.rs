use bitfield::Bit;

use crate::pins::{PinId, PinState};

use super::super::registers::{PORTB_MASK, PORTB_PINS};

/// GPIO port B, together with its IO registers.
#[derive(Debug, Clone)]
pub struct GpioPort {
    port_register: u8,
    ddr_register: u8,

    /// Levels forced by alternate pin functions (timer outputs), `None` for plain GPIO.
    overrides: [Option<bool>; PORTB_PINS],
    output_states: [PinState; PORTB_PINS],
    output_changes: Vec<(PinId, PinState)>,
    /// Input levels after the synchronizer, visible through PINB.
    readable_states: [PinState; PORTB_PINS],
    input_states: [PinState; PORTB_PINS],
}

impl GpioPort {
    pub fn new() -> GpioPort {
        GpioPort {
            port_register: 0,
            ddr_register: 0,
            overrides: [None; PORTB_PINS],
            output_states: [PinState::Z; PORTB_PINS],
            output_changes: Vec::with_capacity(PORTB_PINS),
            readable_states: [PinState::Z; PORTB_PINS],
            input_states: [PinState::Z; PORTB_PINS],
        }
    }

    #[inline]
    pub fn set_input_pin(&mut self, pin: PinId, state: PinState) {
        assert!((pin as usize) < PORTB_PINS, "Port B has no pin {pin}");
        self.input_states[pin as usize] = state.read();
    }

    /// Output changes since the last [reset_pins](GpioPort::reset_pins), indexed by port bit.
    #[inline]
    pub fn get_output_changes(&self) -> &[(PinId, PinState)] {
        &self.output_changes
    }

    #[inline]
    pub fn reset_pins(&mut self) {
        self.output_changes.clear()
    }

    #[inline]
    pub fn read_port(&self) -> u8 {
        self.port_register
    }

    #[inline]
    pub fn read_ddr(&self) -> u8 {
        self.ddr_register
    }

    pub fn read_pin(&self) -> u8 {
        let mut x: u8 = 0;
        for (i, state) in self.readable_states.iter().enumerate() {
            x.set_bit(i, *state == PinState::High);
        }
        x
    }

    /// Synchronized level of a single pin.
    #[inline]
    pub fn readable_state(&self, pin: usize) -> PinState {
        self.readable_states[pin]
    }

    /// Latches input levels into PINB, called once per core clock.
    ///
    /// A pin nobody else drives reads back what the port itself outputs (including the pull-up).
    pub fn clock_rising_edge(&mut self) {
        for i in 0..PORTB_PINS {
            self.readable_states[i] = match self.input_states[i] {
                PinState::Z => self.output_states[i].read(),
                state => state,
            };
        }
    }

    /// Level currently driven onto a pin.
    #[inline]
    pub fn output_state(&self, pin: usize) -> PinState {
        self.output_states[pin]
    }

    fn set_output_state(&mut self, i: usize, state: PinState) {
        if self.output_states[i] != state {
            self.output_states[i] = state;
            self.output_changes.push((i as PinId, state));
        }
    }

    fn update_outputs(&mut self) {
        for i in 0..PORTB_PINS {
            let port = self.port_register.bit(i);
            let dd = self.ddr_register.bit(i);
            let state = match (dd, port, self.overrides[i]) {
                (true, _, Some(level)) => PinState::from_bool(level),
                (false, false, _) => PinState::Z,
                (false, true, _) => PinState::WeakHigh,
                (true, false, None) => PinState::Low,
                (true, true, None) => PinState::High,
            };
            self.set_output_state(i, state);
        }
    }

    /// Hands a pin over to an alternate function, or gives it back with `None`.
    ///
    /// The alternate function only drives the pin while its DDR bit is set.
    pub fn set_override(&mut self, pin: usize, level: Option<bool>) {
        if self.overrides[pin] != level {
            self.overrides[pin] = level;
            self.update_outputs();
        }
    }

    #[inline]
    pub fn write_port(&mut self, val: u8) {
        self.port_register = val & PORTB_MASK;
        self.update_outputs();
    }

    #[inline]
    pub fn write_ddr(&mut self, val: u8) {
        self.ddr_register = val & PORTB_MASK;
        self.update_outputs();
    }

    /// Writing a logical one to a PINB bit toggles the PORTB bit.
    pub fn write_pin(&mut self, val: u8) {
        self.port_register ^= val & PORTB_MASK;
        self.update_outputs();
    }
}

impl Default for GpioPort {
    fn default() -> Self {
        GpioPort::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_and_pull_up() {
        let mut gpio = GpioPort::new();
        gpio.write_ddr(0b01);
        gpio.write_port(0b11);
        assert_eq!(gpio.output_state(0), PinState::High);
        assert_eq!(gpio.output_state(1), PinState::WeakHigh);
        assert_eq!(gpio.output_state(2), PinState::Z);
        assert_eq!(gpio.get_output_changes(), &[(0, PinState::Low), (0, PinState::High), (1, PinState::WeakHigh)]);
    }

    #[test]
    fn pin_write_toggles_port() {
        let mut gpio = GpioPort::new();
        gpio.write_ddr(0b01);
        gpio.write_port(0b01);
        gpio.write_pin(0b01);
        assert_eq!(gpio.read_port(), 0);
        assert_eq!(gpio.output_state(0), PinState::Low);
    }

    #[test]
    fn inputs_are_visible_after_synchronization() {
        let mut gpio = GpioPort::new();
        gpio.set_input_pin(1, PinState::WeakHigh);
        assert_eq!(gpio.read_pin(), 0);
        gpio.clock_rising_edge();
        assert_eq!(gpio.read_pin(), 0b10);
    }

    #[test]
    fn floating_input_reads_the_pull_up() {
        let mut gpio = GpioPort::new();
        gpio.write_port(0b10);
        gpio.clock_rising_edge();
        assert_eq!(gpio.read_pin(), 0b10);
        gpio.set_input_pin(1, PinState::Low);
        gpio.clock_rising_edge();
        assert_eq!(gpio.read_pin(), 0);
    }

    #[test]
    fn override_needs_output_direction() {
        let mut gpio = GpioPort::new();
        gpio.set_override(0, Some(true));
        assert_eq!(gpio.output_state(0), PinState::Z);
        gpio.write_ddr(0b01);
        assert_eq!(gpio.output_state(0), PinState::High);
        gpio.set_override(0, None);
        assert_eq!(gpio.output_state(0), PinState::Low);
    }

    #[test]
    fn unbacked_bits_are_ignored() {
        let mut gpio = GpioPort::new();
        gpio.write_ddr(0xFF);
        assert_eq!(gpio.read_ddr(), PORTB_MASK);
    }
}
