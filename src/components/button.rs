use std::collections::HashMap;
use std::ops::Range;

use log::debug;

use crate::{pins::{PinState, PinId}, component::Component, vcd::{VcdFiller, VcdModuleBuilder, VcdTreeModule}};

const CLOCK_PIN: PinId = 0;
const OUT_PIN: PinId = 1;

/// A push button between its pin and ground, pressed during scripted clock cycle ranges.
///
/// A released button leaves the pin floating, so it needs a pull-up on the other side.
pub struct Button {
    presses: Vec<Range<u64>>,
    clock: PinState,
    cycle: u64,
    pressed: bool,
    changed: bool,
}

impl Button {
    /// Creates a button pressed during every range of `presses`, counted in clock cycles.
    pub fn new(presses: Vec<Range<u64>>) -> Button {
        Button {
            presses,
            clock: PinState::Z,
            cycle: 0,
            pressed: false,
            changed: true,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    fn output(&self) -> PinState {
        if self.pressed {
            PinState::Low
        } else {
            PinState::Z
        }
    }
}

impl Component for Button {
    fn pin_names() -> &'static [&'static str] {
        &["CLK", "OUT"]
    }

    fn set_pin(&mut self, pin: PinId, state: PinState) {
        match pin {
            CLOCK_PIN => {
                if self.clock == PinState::Low && state == PinState::High {
                    self.cycle += 1;
                }
                self.clock = state;
            }
            OUT_PIN => {}
            _ => panic!("Button has no pin {pin}"),
        }
    }

    fn advance(&mut self) {
        let pressed = self.presses.iter().any(|range| range.contains(&self.cycle));
        if pressed != self.pressed {
            debug!("Button {} at cycle {}", if pressed { "pressed" } else { "released" }, self.cycle);
            self.pressed = pressed;
            self.changed = true;
        }
    }

    fn fill_output_changes(&mut self, changes: &mut HashMap<PinId, PinState>) {
        if std::mem::take(&mut self.changed) {
            changes.insert(OUT_PIN, self.output());
        }
    }
}

/// [Button] is a module with the following signals:
///
/// - `pressed` - button state
/// - `out` - level driven onto the pin
impl VcdFiller for Button {
    const IS_SIGNAL: bool = false;

    fn init_vcd_module(&self, builder: &mut VcdModuleBuilder) {
        builder.add_signal("pressed", 1, PinState::Low);
        builder.add_signal("out", 1, PinState::Z);
    }

    fn fill_module(&self, module: &mut VcdTreeModule, changed: &mut bool) {
        module.update_subsignal("pressed", self.pressed, changed);
        module.update_subsignal("out", self.output(), changed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(button: &mut Button, changes: &mut HashMap<PinId, PinState>) {
        button.set_pin(CLOCK_PIN, PinState::High);
        button.advance();
        button.fill_output_changes(changes);
        button.set_pin(CLOCK_PIN, PinState::Low);
        button.advance();
        button.fill_output_changes(changes);
    }

    #[test]
    fn pulls_low_while_pressed() {
        let mut button = Button::new(vec![2..4]);
        let mut changes = HashMap::new();
        button.set_pin(CLOCK_PIN, PinState::Low);

        clock(&mut button, &mut changes);
        assert_eq!(changes.remove(&OUT_PIN), Some(PinState::Z));
        clock(&mut button, &mut changes);
        assert!(button.is_pressed());
        assert_eq!(changes.remove(&OUT_PIN), Some(PinState::Low));
        clock(&mut button, &mut changes);
        assert!(changes.is_empty());
        clock(&mut button, &mut changes);
        assert!(!button.is_pressed());
        assert_eq!(changes.remove(&OUT_PIN), Some(PinState::Z));
    }
}
