use std::collections::HashMap;

use log::trace;

use crate::vcd::{lock_tree, MutexVcdTree, VcdFiller};
use crate::pins::{PinId, PinState};

/// A unique identifier of a component placed on a [Board](crate::board::Board).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(pub usize);

/// Messages exchanged between the board and threaded components.
#[derive(Debug, Clone, Copy)]
pub enum Message {
    /// A pin of the component changed its value (board to component),
    /// or the component changed its output (component to board).
    PinChange(ComponentId, PinId, PinState),
    /// Advance the simulation by one step.
    Step,
    /// The component finished its step and reported all the output changes.
    Done(ComponentId),
    /// Stop the component thread.
    Die,
}

/// Top level component which can be placed on the [Board](crate::board::Board).
///
/// Must implement [VcdFiller] trait to extract VCD data.
/// Implement this to make something addable to the simulation.
pub trait Component: Send + VcdFiller {
    /// Names of the external pins, indexed by [PinId].
    fn pin_names() -> &'static [&'static str] where Self: Sized;

    /// Total number of external pins in the component.
    fn pin_count() -> usize where Self: Sized {
        Self::pin_names().len()
    }

    /// Lookup table from a pin name to its [PinId].
    fn get_pin_name_lookup() -> HashMap<String, PinId> where Self: Sized {
        Self::pin_names()
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i as PinId))
            .collect()
    }

    /// Set external pin value.
    ///
    /// Component can use data set through this method as input.
    fn set_pin(&mut self, pin: PinId, state: PinState);
    /// Get updates of output pin values.
    ///
    /// Updates must be added into the `changes` [HashMap].
    fn fill_output_changes(&mut self, changes: &mut HashMap<PinId, PinState>);
    /// Advance the simulation through one step.
    ///
    /// After this step all the pin value changes must be accounted for.
    fn advance(&mut self);

    /// Advances the component, collects its output changes and refreshes its VCD tree.
    fn execute_step(&mut self, vcd: &MutexVcdTree, output_changes: &mut HashMap<PinId, PinState>) {
        output_changes.clear();
        self.advance();
        self.fill_output_changes(output_changes);

        let mut handle = lock_tree(vcd);
        let mut changed = false;
        self.fill_vcd(&mut handle.tree, &mut changed);
        handle.changed |= changed;
    }

    /// Main loop of a threaded component.
    /// Reacts to [messages](Message) passed through kanal channels until [Message::Die].
    fn execute_loop(&mut self,
                    id: ComponentId,
                    output_tx: kanal::Sender<Message>,
                    input_rx: kanal::Receiver<Message>,
                    vcd: MutexVcdTree) {
        let mut output_changes = HashMap::new();
        while let Ok(m) = input_rx.recv() {
            trace!("Component {:?} got a message: {:?}", id, m);
            match m {
                Message::Die => break,
                Message::PinChange(_, pin, state) => self.set_pin(pin, state),
                Message::Done(_) => {},
                Message::Step => {
                    self.execute_step(&vcd, &mut output_changes);
                    for (&pin, &state) in output_changes.iter() {
                        if output_tx.send(Message::PinChange(id, pin, state)).is_err() {
                            return;
                        }
                    }
                    if output_tx.send(Message::Done(id)).is_err() {
                        return;
                    }
                },
            }
        }
    }
}

/// Object-safe view of a [Component], stepped directly by the board thread.
pub trait ThreadlessComponent {
    fn set_pin(&mut self, pin: PinId, state: PinState);
    fn execute_step_threadless(&mut self, vcd: &MutexVcdTree, output_changes: &mut HashMap<PinId, PinState>);
}

impl<T: Component> ThreadlessComponent for T {
    fn set_pin(&mut self, pin: PinId, state: PinState) {
        Component::set_pin(self, pin, state)
    }

    fn execute_step_threadless(&mut self, vcd: &MutexVcdTree, output_changes: &mut HashMap<PinId, PinState>) {
        self.execute_step(vcd, output_changes)
    }
}
