use std::collections::HashMap;
use std::io::{self, Write};
use std::thread::{spawn, JoinHandle};

use indicatif::ProgressBar;
use log::{debug, warn};

use crate::component::{Component, ComponentId, Message, ThreadlessComponent};
use crate::pins::{PinId, PinState};
use crate::vcd::{MutexVcdTree, VcdConfig, VcdTree, VcdWriter};

/// Index of a pin. Unlike [PinId], this is unique for the whole board, not only for one component.
type PinIndex = usize;

/// Board pin driven by the simulation clock.
const CLOCK_PIN: PinIndex = 0;

/// A unique identifier for a wire.
#[derive(Debug, Clone, Copy)]
pub struct WireId(usize);

/// Internal data of a component running in its own thread.
struct ThreadedComponentData {
    /// Unique id of the component.
    id: ComponentId,
    /// Handle for the component thread.
    thread: Option<JoinHandle<()>>,
    /// Channel for transmitting messages into the component.
    input_tx: kanal::Sender<Message>,
}

impl ThreadedComponentData {
    /// Send [Message::PinChange].
    fn notify_on_pin_change(&self, pin: PinId, state: PinState) {
        if self.input_tx.send(Message::PinChange(self.id, pin, state)).is_err() {
            warn!("Component {:?} is gone, dropping pin change", self.id);
        }
    }

    /// Send [Message::Step].
    fn notify_step(&self) -> bool {
        self.input_tx.send(Message::Step).is_ok()
    }
}

/// When a handle is dropped, the corresponding component thread is stopped automatically.
impl Drop for ThreadedComponentData {
    fn drop(&mut self) {
        let _ = self.input_tx.send(Message::Die);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Component {:?} thread panicked", self.id);
            }
        }
    }
}

/// Internal data of a component stepped by the board itself.
struct ThreadlessComponentData {
    component: Box<dyn ThreadlessComponent>,
    vcd: MutexVcdTree,
}

enum ComponentData {
    Threaded(ThreadedComponentData),
    Threadless(ThreadlessComponentData),
}

impl ComponentData {
    fn set_pin(&mut self, pin: PinId, state: PinState) {
        match self {
            ComponentData::Threaded(c) => c.notify_on_pin_change(pin, state),
            ComponentData::Threadless(c) => c.component.set_pin(pin, state),
        }
    }
}

/// A representation for a state of a single wire.
///
/// Counts how many drivers of each strength it has.
#[derive(Default)]
struct WireStateCounter {
    low: u8,
    high: u8,
    weak_low: u8,
    weak_high: u8,
}

impl WireStateCounter {
    /// Adds a new driver into the [WireStateCounter].
    fn add(&mut self, pin: PinState) {
        match pin {
            PinState::Low => self.low += 1,
            PinState::High => self.high += 1,
            PinState::WeakLow => self.weak_low += 1,
            PinState::WeakHigh => self.weak_high += 1,
            PinState::Z => {},
            PinState::Error => {
                self.low += 1;
                self.high += 1;
            }
        }
    }

    /// Removes a driver from the [WireStateCounter].
    fn remove(&mut self, pin: PinState) {
        match pin {
            PinState::Low => self.low -= 1,
            PinState::High => self.high -= 1,
            PinState::WeakLow => self.weak_low -= 1,
            PinState::WeakHigh => self.weak_high -= 1,
            PinState::Z => {},
            PinState::Error => {
                self.low -= 1;
                self.high -= 1;
            }
        }
    }

    /// Resolves the level of the wire. Strong drivers override weak ones.
    fn read(&self) -> PinState {
        match (self.low, self.high, self.weak_low, self.weak_high) {
            (0, 0, 0, 0) => PinState::Z,
            (0, 0, 0, _) => PinState::WeakHigh,
            (0, 0, _, 0) => PinState::WeakLow,
            (0, 0, _, _) => PinState::Error,
            (0, _, _, _) => PinState::High,
            (_, 0, _, _) => PinState::Low,
            _ => PinState::Error,
        }
    }
}

/// A representation for a single wire connecting multiple pins.
struct Wire {
    counter: WireStateCounter,
    pins: Vec<PinIndex>,
}

impl Wire {
    fn read(&self) -> PinState {
        self.counter.read()
    }
}

/// A representation for a single pin of a component.
struct Pin {
    /// [PinId] is unique only up to a component.
    id: PinId,
    /// A component to which the pin belongs.
    ///
    /// The clock pin has no component.
    component: Option<ComponentId>,
    /// A wire that is connected to the pin.
    wire: Option<WireId>,
    /// A state the pin is currently outputting.
    ///
    /// Input pins output [PinState::Z].
    out_state: PinState,
}

/// Pins of a component placed on a [Board], accessible by name.
pub struct ComponentHandle {
    id: ComponentId,
    pin_name_lookup: HashMap<String, PinId>,
}

impl ComponentHandle {
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Looks up a pin by its name.
    ///
    /// Panics if the component has no such pin.
    pub fn pin(&self, name: &str) -> (ComponentId, PinId) {
        match self.pin_name_lookup.get(name) {
            Some(&pin) => (self.id, pin),
            None => panic!("Component {:?} has no pin named {name}", self.id),
        }
    }
}

/// Top-level element of a simulation. A board containing multiple components.
pub struct Board {
    /// Channel for receiving messages from threaded components.
    output_rx: kanal::Receiver<Message>,
    /// Transmitter corresponding to `output_rx`, cloned into every threaded component.
    output_tx: kanal::Sender<Message>,
    /// Vector of all components. Indexed by [ComponentId]
    components: Vec<ComponentData>,
    /// Vector of all pins. Indexed by [PinIndex]
    pins: Vec<Pin>,
    /// Vector of all wires. Indexed by [WireId]
    wires: Vec<Wire>,
    /// Board-wide pin indices of every component.
    pin_mapping: Vec<Vec<PinIndex>>,
    /// Components which have to be stepped on the next clock toggle.
    changed_components: Vec<bool>,

    vcd_writer: VcdWriter<Box<dyn Write + Send>>,
    header_written: bool,
    cycles: u64,
}

impl Board {
    /// Creates a new board dumping into a .vcd file at `vcd_path`.
    ///
    /// `freq` is the clock frequency in Hz.
    pub fn new(vcd_path: &str, freq: f64) -> io::Result<Board> {
        let file = std::fs::File::create(vcd_path)?;
        Ok(Board::with_writer(io::BufWriter::new(file), freq))
    }

    /// Creates a new board dumping VCD data into an arbitrary stream.
    pub fn with_writer<W: Write + Send + 'static>(writer: W, freq: f64) -> Board {
        let (output_tx, output_rx) = kanal::unbounded();
        let writer: Box<dyn Write + Send> = Box::new(writer);
        let clock_pin = Pin {
            id: 0,
            component: None,
            wire: None,
            out_state: PinState::Low,
        };
        Board {
            output_rx,
            output_tx,
            components: Vec::new(),
            pins: vec![clock_pin],
            wires: Vec::new(),
            pin_mapping: Vec::new(),
            changed_components: Vec::new(),
            vcd_writer: VcdWriter::new(writer, freq),
            header_written: false,
            cycles: 0,
        }
    }

    /// Number of full clock cycles simulated so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    fn add_pins(&mut self, pins_count: usize, component_id: ComponentId) {
        let mut pins = Vec::with_capacity(pins_count);
        for id in 0..pins_count {
            pins.push(self.pins.len());
            self.pins.push(Pin {
                id: id as PinId,
                component: Some(component_id),
                wire: None,
                out_state: PinState::Z,
            });
        }
        self.pin_mapping.push(pins);
    }

    /// Adds a [Component] running in its own thread, with the specified [VcdConfig].
    pub fn add_component<T>(&mut self, component: T, name: &str, config: &VcdConfig) -> ComponentHandle
    where
        T: Component + 'static
    {
        let vcd_init: VcdTree = component.init_vcd(config);
        let component_id = ComponentId(self.components.len());
        let vcd = self.vcd_writer.add(name, vcd_init);
        let (input_tx, input_rx) = kanal::unbounded();
        let output_tx = self.output_tx.clone();

        let thread = spawn(move || {
            let mut c = component;
            c.execute_loop(component_id, output_tx, input_rx, vcd);
        });
        self.add_pins(T::pin_count(), component_id);

        let c = ThreadedComponentData {
            id: component_id,
            thread: Some(thread),
            input_tx,
        };
        for id in 0..T::pin_count() {
            c.notify_on_pin_change(id as PinId, PinState::Z);
        }
        self.components.push(ComponentData::Threaded(c));
        self.changed_components.push(true);
        debug!("Added threaded component {name} as {:?}", component_id);

        ComponentHandle {
            id: component_id,
            pin_name_lookup: T::get_pin_name_lookup(),
        }
    }

    /// Adds a [Component] stepped by the board thread, with the specified [VcdConfig].
    pub fn add_component_threadless<T>(&mut self, component: T, name: &str, config: &VcdConfig) -> ComponentHandle
    where
        T: Component + 'static
    {
        let vcd_init: VcdTree = component.init_vcd(config);
        let component_id = ComponentId(self.components.len());
        let vcd = self.vcd_writer.add(name, vcd_init);
        self.add_pins(T::pin_count(), component_id);

        let mut c = ComponentData::Threadless(ThreadlessComponentData {
            component: Box::new(component),
            vcd,
        });
        for id in 0..T::pin_count() {
            c.set_pin(id as PinId, PinState::Z);
        }
        self.components.push(c);
        self.changed_components.push(true);
        debug!("Added threadless component {name} as {:?}", component_id);

        ComponentHandle {
            id: component_id,
            pin_name_lookup: T::get_pin_name_lookup(),
        }
    }

    /// Adds a new wire to the board, connecting specified pins.
    ///
    /// Panics if one of the pins is already connected to a wire.
    pub fn add_wire(&mut self, pins: &[(ComponentId, PinId)]) -> WireId {
        let wire_id = WireId(self.wires.len());
        let mut wire = Wire {
            counter: WireStateCounter::default(),
            pins: Vec::with_capacity(pins.len()),
        };
        for &(component_id, pin_id) in pins {
            let index = self.pin_mapping[component_id.0][pin_id as usize];
            let pin = &mut self.pins[index];
            assert!(pin.wire.is_none(), "Cannot connect two wires to the same pin!");
            pin.wire = Some(wire_id);
            wire.pins.push(index);
            wire.counter.add(pin.out_state);
        }
        self.wires.push(wire);
        self.broadcast_wire(wire_id);
        wire_id
    }

    /// Adds a new clock wire to the board, connecting specified pins.
    ///
    /// It is automatically connected to the internal clock pin.
    pub fn add_clock_wire(&mut self, pins: &[(ComponentId, PinId)]) -> WireId {
        assert!(self.pins[CLOCK_PIN].wire.is_none(), "Board has only one clock wire!");
        let wire_id = self.add_wire(pins);
        let wire = &mut self.wires[wire_id.0];
        wire.pins.push(CLOCK_PIN);
        wire.counter.add(self.pins[CLOCK_PIN].out_state);
        self.pins[CLOCK_PIN].wire = Some(wire_id);
        self.broadcast_wire(wire_id);
        wire_id
    }

    /// Resolved level seen on a component pin.
    pub fn pin_state(&self, (component_id, pin_id): (ComponentId, PinId)) -> PinState {
        let pin = &self.pins[self.pin_mapping[component_id.0][pin_id as usize]];
        match pin.wire {
            Some(WireId(wire)) => self.wires[wire].read(),
            None => pin.out_state,
        }
    }

    /// Sends the current level of a wire to every component on it.
    fn broadcast_wire(&mut self, WireId(wire_index): WireId) {
        let state = self.wires[wire_index].read();
        for &pin_index in &self.wires[wire_index].pins {
            let pin = &self.pins[pin_index];
            if let Some(ComponentId(index)) = pin.component {
                self.components[index].set_pin(pin.id, state);
                self.changed_components[index] = true;
            }
        }
    }

    /// Set a new pin state and propagate the updates through wires.
    fn set_pin(&mut self, pin_index: PinIndex, state: PinState) {
        let pin = &mut self.pins[pin_index];
        let old_state = std::mem::replace(&mut pin.out_state, state);
        let Some(wire_id) = pin.wire else { return };
        if old_state == state {
            return;
        }

        let wire = &mut self.wires[wire_id.0];
        let old_wire_state = wire.read();
        wire.counter.remove(old_state);
        wire.counter.add(state);
        if wire.read() != old_wire_state {
            self.broadcast_wire(wire_id);
        }
    }

    /// Waits until `done_counter` threaded components finish their step,
    /// applying their output changes along the way.
    fn handle_messages(&mut self, mut done_counter: usize) {
        while done_counter > 0 {
            let Ok(m) = self.output_rx.recv() else { break };
            match m {
                Message::Step | Message::Die => {}
                Message::Done(_) => done_counter -= 1,
                Message::PinChange(component_id, pin_id, state) => {
                    let index = self.pin_mapping[component_id.0][pin_id as usize];
                    self.set_pin(index, state);
                }
            }
        }
    }

    /// Toggle a clock pin once and step every component whose inputs changed.
    pub fn toggle_clock(&mut self) {
        let clock = if self.pins[CLOCK_PIN].out_state == PinState::High {
            PinState::Low
        } else {
            PinState::High
        };
        self.set_pin(CLOCK_PIN, clock);

        let mut output_changes = HashMap::new();
        let mut global_output_changes = Vec::new();
        let mut done_counter = 0;
        for (component_id, c) in self.components.iter_mut().enumerate() {
            if !std::mem::take(&mut self.changed_components[component_id]) {
                continue;
            }
            match c {
                ComponentData::Threaded(c) => {
                    if c.notify_step() {
                        done_counter += 1;
                    }
                }
                ComponentData::Threadless(c) => {
                    c.component.execute_step_threadless(&c.vcd, &mut output_changes);
                    for (&pin_id, &state) in &output_changes {
                        global_output_changes.push((self.pin_mapping[component_id][pin_id as usize], state));
                    }
                }
            }
        }

        for (index, state) in global_output_changes {
            self.set_pin(index, state);
        }
        self.handle_messages(done_counter);
    }

    /// Run the simulation for specified number of clock cycles.
    pub fn simulate(&mut self, cycles: u64) -> io::Result<()> {
        if !self.header_written {
            self.vcd_writer.write_header()?;
            self.header_written = true;
        }
        let progress = if cycles < 1000 {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(cycles)
        };
        for _ in 0..cycles {
            self.toggle_clock();
            self.vcd_writer.write_step()?;
            self.toggle_clock();
            self.vcd_writer.write_step()?;
            self.cycles += 1;
            progress.inc(1);
        }
        progress.finish();
        self.vcd_writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use crate::components::led::Led;

    use super::*;

    #[test]
    fn new_board_dumps_into_a_file() {
        let path = std::env::temp_dir().join(format!("tinysim-board-{}.vcd", std::process::id()));
        let path = path.to_string_lossy().into_owned();
        {
            let mut board = Board::new(&path, 1e6).unwrap();
            let led = board.add_component_threadless(Led::new("led"), "led", &VcdConfig::Enable);
            board.add_clock_wire(&[led.pin("LED")]);
            board.simulate(2).unwrap();
            assert_eq!(board.cycles(), 2);
        }
        let vcd = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(vcd.starts_with("$version Generated by tinysim $end"));
        assert!(vcd.contains("$timescale 1ns $end"));
        assert!(vcd.contains(" led $end"));
        // two clock toggles per cycle, 500 ns each at 1 MHz
        assert!(vcd.contains("#1500"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let path = std::env::temp_dir().join("tinysim-no-such-dir").join("out.vcd");
        assert!(Board::new(&path.to_string_lossy(), 1e6).is_err());
    }

    #[test]
    fn strong_drivers_win_over_weak_ones() {
        let mut wire = WireStateCounter::default();
        assert_eq!(wire.read(), PinState::Z);
        wire.add(PinState::WeakHigh);
        assert_eq!(wire.read(), PinState::WeakHigh);
        wire.add(PinState::Low);
        assert_eq!(wire.read(), PinState::Low);
        wire.add(PinState::High);
        assert_eq!(wire.read(), PinState::Error);
        wire.remove(PinState::Low);
        assert_eq!(wire.read(), PinState::High);
        wire.remove(PinState::High);
        wire.add(PinState::WeakLow);
        assert_eq!(wire.read(), PinState::Error);
    }
}
