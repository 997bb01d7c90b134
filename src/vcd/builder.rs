use crate::pins::PinState;

use super::{config::VcdConfig, VcdTreeModule, VcdTree, VcdTreeSignal, fillers::VcdFiller};

/// Collects the enabled children of a module while it is being initialized.
pub struct VcdModuleBuilder<'a> {
    config: &'a VcdConfig,
    module: VcdTreeModule
}

impl<'a> VcdModuleBuilder<'a> {
    pub fn new(config: &'a VcdConfig) -> VcdModuleBuilder<'a> {
        VcdModuleBuilder { config, module: VcdTreeModule::new() }
    }

    pub fn add_signal(&mut self, name: &str, size: u16, val: PinState) {
        match self.config.get(name) {
            VcdConfig::Enable => {
                self.module.add(name, VcdTree::Signal(VcdTreeSignal::new(size, val)));
            }
            VcdConfig::Disable => {},
            VcdConfig::Module(_) => panic!("Signal {name} cannot be configured as a module"),
        }
    }

    pub fn add_node<T: VcdFiller>(&mut self, name: &str, filler: &T) {
        let config = self.config.get(name);
        if *config != VcdConfig::Disable {
            self.module.add(name, filler.init_vcd(config));
        }
    }

    pub fn take(self) -> VcdTreeModule {
        self.module
    }
}
