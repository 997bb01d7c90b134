//! Value Change Dump exporter module.
//!
//! This module is used to capture signals from the components and write them to a VCD file.

pub mod fillers;
pub mod config;
pub mod writer;
pub mod builder;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::pins::{PinState, PinStateConvertible};

pub use fillers::VcdFiller;
pub use config::VcdConfig;
pub use builder::VcdModuleBuilder;
pub use writer::VcdWriter;

/// VCD snapshot of the whole module tree.
#[derive(Debug, Clone)]
pub enum VcdTree {
    Module(VcdTreeModule),
    Signal(VcdTreeSignal),
    Disabled
}

/// A recursive node of a VCD tree.
///
/// Can contain other modules and signals, accessed by their names.
#[derive(Debug, Clone, Default)]
pub struct VcdTreeModule(BTreeMap<String, VcdTree>);

/// A leaf node of a VCD tree, containing a signal.
#[derive(Debug, Clone)]
pub struct VcdTreeSignal {
    /// Number of bits in the signal
    size: u16,
    /// Short ASCII id assigned to the signal by VCD
    id: Option<String>,
    /// State last written into the file
    written_state: Vec<PinState>,
    /// Current state of the signal
    state: Vec<PinState>,
}

/// VCD tree of one component, together with a flag telling if anything changed since the last write.
#[derive(Debug)]
pub struct VcdTreeHandle {
    pub tree: VcdTree,
    pub changed: bool
}

/// VCD tree behind a mutex, shared between the writer and a component thread.
pub type MutexVcdTree = Arc<Mutex<VcdTreeHandle>>;

/// Locks a [MutexVcdTree], ignoring poisoning by a panicked component thread.
pub fn lock_tree(tree: &MutexVcdTree) -> MutexGuard<'_, VcdTreeHandle> {
    tree.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Top level structure, containing VCD trees of all the components.
pub struct VcdForest(BTreeMap<String, MutexVcdTree>);

impl VcdTreeModule {
    /// Creates a new empty module.
    pub fn new() -> VcdTreeModule {
        VcdTreeModule(BTreeMap::new())
    }

    /// Adds a child VCD tree `val` under name `key`.
    pub fn add(&mut self, key: &str, val: VcdTree) {
        self.0.insert(key.to_string(), val);
    }

    /// Updates a child signal in this module.
    ///
    /// Signals that were disabled by the [VcdConfig] are silently skipped.
    pub fn update_subsignal<T: PinStateConvertible>(&mut self, key: &str, state: T, changed: &mut bool) {
        if let Some(child) = self.0.get_mut(key) {
            match child {
                VcdTree::Module(_) => panic!("Cannot update module {key} as a signal"),
                VcdTree::Signal(signal) => signal.update(state, changed),
                VcdTree::Disabled => {},
            }
        }
    }

    /// Updates a child tree in this module using a [VcdFiller].
    pub fn update_child<T: VcdFiller>(&mut self, key: &str, filler: &T, changed: &mut bool) {
        if let Some(child) = self.0.get_mut(key) {
            filler.fill_vcd(child, changed);
        }
    }

    /// Looks up a direct child.
    pub fn get(&self, key: &str) -> Option<&VcdTree> {
        self.0.get(key)
    }
}

impl VcdTreeSignal {
    /// Creates a new signal of specified size, filled initially with `val`.
    pub fn new(size: u16, val: PinState) -> VcdTreeSignal {
        VcdTreeSignal {
            size,
            id: None,
            written_state: vec![val; size as usize],
            state: vec![val; size as usize]
        }
    }

    /// Updates signal's state.
    ///
    /// Wider values are truncated to the lowest `size` bits, narrower ones are zero-extended.
    pub fn update<T: PinStateConvertible>(&mut self, state: T, changed: &mut bool) {
        let mut state = state.to_pin_vec();
        let size = self.size as usize;
        if state.len() > size {
            state.drain(..state.len() - size);
        } else if state.len() < size {
            let mut padded = vec![PinState::Low; size - state.len()];
            padded.append(&mut state);
            state = padded;
        }
        if state != self.state {
            self.state = state;
            *changed = true;
        }
    }

    /// Current state of the signal.
    pub fn state(&self) -> &[PinState] {
        &self.state
    }
}

impl VcdForest {
    /// Creates an empty VCD forest.
    pub fn new() -> VcdForest {
        VcdForest(BTreeMap::new())
    }

    /// Adds a new component into the forest with the name `key`.
    pub fn add(&mut self, key: &str, val: VcdTree) -> MutexVcdTree {
        let handle = VcdTreeHandle { tree: val, changed: false };
        let mutex = Arc::new(Mutex::new(handle));
        self.0.insert(key.to_string(), mutex.clone());
        mutex
    }
}
