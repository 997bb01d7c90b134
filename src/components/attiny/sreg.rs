use bitfield::{bitfield, Bit};

use crate::vcd::{VcdFiller, VcdModuleBuilder, VcdTreeModule};
use crate::pins::PinState;

bitfield!{
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct StatusRegister(u8);
    impl Debug;
    pub c, set_c: 0;
    pub z, set_z: 1;
    pub n, set_n: 2;
    pub v, set_v: 3;
    pub s, set_s: 4;
    pub h, set_h: 5;
    pub t, set_t: 6;
    pub i, set_i: 7;
}

const BIT_NAMES: [&str; 8] = ["C", "Z", "N", "V", "S", "H", "T", "I"];

impl VcdFiller for StatusRegister {
    const IS_SIGNAL: bool = false;

    fn init_vcd_module(&self, builder: &mut VcdModuleBuilder) {
        for name in BIT_NAMES {
            builder.add_signal(name, 1, PinState::Low);
        }
    }

    fn fill_module(&self, module: &mut VcdTreeModule, changed: &mut bool) {
        for (i, name) in BIT_NAMES.iter().enumerate() {
            module.update_subsignal(name, self.bit(i), changed);
        }
    }
}
