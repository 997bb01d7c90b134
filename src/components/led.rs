use std::collections::HashMap;

use log::info;

use crate::{pins::{PinState, PinId, PinStateConvertible}, component::Component, vcd::{VcdFiller, VcdTreeSignal}};

/// An LED with its cathode on ground, lit while its pin reads HIGH.
pub struct Led {
    name: String,
    state: PinState,
    toggles: u64,
}

impl Led {
    pub fn new(name: &str) -> Led {
        Led {
            name: name.to_string(),
            state: PinState::Z,
            toggles: 0,
        }
    }

    pub fn is_lit(&self) -> bool {
        self.state.is_high()
    }

    /// Number of times the LED went on or off.
    pub fn toggles(&self) -> u64 {
        self.toggles
    }
}

impl Component for Led {
    fn pin_names() -> &'static [&'static str] {
        &["LED"]
    }

    fn advance(&mut self) {}

    fn set_pin(&mut self, pin: PinId, state: PinState) {
        assert!(pin == 0);
        let was_lit = self.is_lit();
        self.state = state;
        if matches!(self.state.read(), PinState::High | PinState::Low) && was_lit != self.is_lit() {
            self.toggles += 1;
            info!("{}: {}", self.name, if self.is_lit() { "on" } else { "off" });
        }
    }

    fn fill_output_changes(&mut self, _changes: &mut HashMap<PinId, PinState>) {}
}

impl VcdFiller for Led {
    const IS_SIGNAL: bool = true;

    fn init_vcd_signal(&self) -> VcdTreeSignal {
        VcdTreeSignal::new(1, PinState::Z)
    }

    fn get_signal_state(&self) -> Vec<PinState> {
        self.state.to_pin_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_level_changes() {
        let mut led = Led::new("led");
        led.set_pin(0, PinState::Z);
        led.set_pin(0, PinState::High);
        led.set_pin(0, PinState::High);
        assert!(led.is_lit());
        led.set_pin(0, PinState::Low);
        assert!(!led.is_lit());
        assert_eq!(led.toggles(), 2);
    }
}
