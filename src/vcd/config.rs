use std::collections::BTreeMap;

/// Selects which signals of a component end up in the VCD dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcdConfig {
    Module(BTreeMap<String, VcdConfig>),
    Enable,
    Disable,
}

impl VcdConfig {
    /// Config for a child named `key`.
    ///
    /// [VcdConfig::Enable] enables the whole subtree, unlisted children of a module are disabled.
    pub fn get(&self, key: &str) -> &VcdConfig {
        match self {
            Self::Enable | Self::Disable => self,
            Self::Module(map) => map.get(key).unwrap_or(&Self::Disable),
        }
    }
}

#[macro_export]
macro_rules! vcd_config_module_list {
    ($map:ident; ) => {};
    ($map:ident; $x:ident : { $($inner:tt)* } $(, $($tail:tt)*)?) => {
        $map.insert(stringify!($x).to_string(), $crate::vcd_config!($($inner)*));
        $crate::vcd_config_module_list!($map; $($($tail)*)?);
    };
    ($map:ident; $x:ident $(, $($tail:tt)*)?) => {
        $map.insert(stringify!($x).to_string(), $crate::vcd::VcdConfig::Enable);
        $crate::vcd_config_module_list!($map; $($($tail)*)?);
    };
}

/// Builds a [VcdConfig] from a list of names.
///
/// `vcd_config!{ clk, timer0: { tcnt0, tov0 } }` enables `clk` and two signals of `timer0`.
#[macro_export]
macro_rules! vcd_config {
    ($($tail:tt)*) => {
        {
            #[allow(unused_mut)]
            let mut map = std::collections::BTreeMap::new();
            $crate::vcd_config_module_list!(map; $($tail)*);
            $crate::vcd::VcdConfig::Module(map)
        }
    };
}
