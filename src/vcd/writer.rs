use std::io::{self, Write};

use crate::pins::PinState;

use super::{lock_tree, MutexVcdTree, VcdForest, VcdTree, VcdTreeModule, VcdTreeSignal};

/// Writes VCD signals into a .vcd stream.
pub struct VcdWriter<W: Write> {
    /// Output stream
    f: W,
    /// Next VCD short identifier
    wire_id: Vec<u8>,
    /// Current state of VCD signals
    forest: VcdForest,
    /// Current step
    counter: u64,
    /// Nanoseconds per step
    period: f64,
}

impl<W: Write> VcdWriter<W> {
    /// Creates new [VcdWriter] on top of an arbitrary stream.
    ///
    /// `freq` is the clock frequency in Hz, every clock cycle takes two steps.
    pub fn new(f: W, freq: f64) -> VcdWriter<W> {
        VcdWriter {
            f,
            wire_id: vec![b'!'],
            forest: VcdForest::new(),
            counter: 0,
            period: 5e8 / freq,
        }
    }

    /// Adds a new component with given name into the [VcdWriter].
    pub fn add(&mut self, name: &str, vcd: VcdTree) -> MutexVcdTree {
        self.forest.add(name, vcd)
    }

    /// The underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.f
    }

    /// Generates a new VCD short identifier out of printable ASCII characters.
    fn next_id(wire_id: &mut Vec<u8>) -> String {
        let result = wire_id.iter().map(|&c| c as char).collect();

        let mut carry = true;
        for c in wire_id.iter_mut().rev() {
            if *c == b'~' {
                *c = b'!';
            } else {
                *c += 1;
                carry = false;
                break;
            }
        }
        if carry {
            wire_id.push(b'!');
        }

        result
    }

    /// Recursively writes scope section of .vcd file.
    fn write_scope(f: &mut W, wire_id: &mut Vec<u8>, tree: &mut VcdTree, name: &str) -> io::Result<()> {
        match tree {
            VcdTree::Module(VcdTreeModule(map)) => {
                writeln!(f, "$scope module {} $end", name)?;
                for (k, v) in map {
                    Self::write_scope(f, wire_id, v, k)?;
                }
                writeln!(f, "$upscope $end")?;
            },
            VcdTree::Signal(VcdTreeSignal { size, id, .. }) => {
                let new_id = Self::next_id(wire_id);
                if *size == 1 {
                    writeln!(f, "$var wire 1 {} {} $end", new_id, name)?;
                } else {
                    writeln!(f, "$var wire {} {} {}[{}:0] $end", *size, new_id, name, *size - 1)?;
                }
                *id = Some(new_id);
            },
            VcdTree::Disabled => {}
        }
        Ok(())
    }

    /// Encodes [PinState] for .vcd.
    fn state_to_char(state: PinState) -> char {
        match state {
            PinState::Z => 'z',
            PinState::Low | PinState::WeakLow => '0',
            PinState::High | PinState::WeakHigh => '1',
            PinState::Error => 'x',
        }
    }

    /// Writes data section of a single [VcdTree].
    ///
    /// If `dumpvars` is `true`, then the whole tree is dumped, otherwise only the changes are.
    fn write_data(f: &mut W, tree: &mut VcdTree, dumpvars: bool) -> io::Result<()> {
        match tree {
            VcdTree::Module(VcdTreeModule(map)) => {
                for v in map.values_mut() {
                    Self::write_data(f, v, dumpvars)?;
                }
            },
            VcdTree::Signal(VcdTreeSignal { id: Some(id), size, written_state, state }) => {
                if dumpvars || written_state != state {
                    if *size == 1 {
                        writeln!(f, "{}{}", Self::state_to_char(state[0]), id)?;
                    } else {
                        let bits: String = state.iter().map(|&s| Self::state_to_char(s)).collect();
                        writeln!(f, "b{} {}", bits, id)?;
                    }
                    written_state.clone_from(state);
                }
            },
            VcdTree::Signal(_) | VcdTree::Disabled => {}
        }
        Ok(())
    }

    /// Writes .vcd file header, together with $scope and $dumpvars sections.
    pub fn write_header(&mut self) -> io::Result<()> {
        writeln!(self.f, "$version Generated by tinysim $end")?;
        writeln!(self.f, "$timescale 1ns $end")?;
        writeln!(self.f, "$scope module TOP $end")?;
        for (name, tree) in &self.forest.0 {
            let mut handle = lock_tree(tree);
            Self::write_scope(&mut self.f, &mut self.wire_id, &mut handle.tree, name)?;
        }
        writeln!(self.f, "$upscope $end")?;
        writeln!(self.f, "$enddefinitions $end")?;
        writeln!(self.f, "#0")?;
        writeln!(self.f, "$dumpvars")?;
        for tree in self.forest.0.values() {
            let mut handle = lock_tree(tree);
            Self::write_data(&mut self.f, &mut handle.tree, true)?;
            handle.changed = false;
        }
        writeln!(self.f, "$end")
    }

    /// Writes a single step, if any of the signals changed since the previous one.
    pub fn write_step(&mut self) -> io::Result<()> {
        self.counter += 1;
        let mut stamped = false;
        for tree in self.forest.0.values() {
            let mut handle = lock_tree(tree);
            if !handle.changed {
                continue;
            }
            if !stamped {
                writeln!(self.f, "#{}", (self.counter as f64 * self.period).round() as u64)?;
                stamped = true;
            }
            Self::write_data(&mut self.f, &mut handle.tree, false)?;
            handle.changed = false;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.f.flush()
    }
}
