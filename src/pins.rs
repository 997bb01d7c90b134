/// Logical level of a single pin or wire.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PinState {
    Z,
    Low,
    High,
    WeakLow,
    WeakHigh,
    Error,
}

impl PinState {
    /// Level as seen by a digital input.
    pub fn read(self) -> PinState {
        match self {
            PinState::Z => PinState::Z,
            PinState::Low | PinState::WeakLow => PinState::Low,
            PinState::High | PinState::WeakHigh => PinState::High,
            PinState::Error => PinState::Error,
        }
    }

    pub fn from_bool(value: bool) -> PinState {
        if value {
            PinState::High
        } else {
            PinState::Low
        }
    }

    /// Returns `true` if a digital input would read this level as HIGH.
    pub fn is_high(self) -> bool {
        self.read() == PinState::High
    }
}

pub type PinId = u16;

/// Anything that can be dumped as a vector of pins, most significant bit first.
pub trait PinStateConvertible {
    fn to_pin_vec(&self) -> Vec<PinState>;
}

impl PinStateConvertible for PinState {
    fn to_pin_vec(&self) -> Vec<PinState> {
        vec![*self]
    }
}

impl PinStateConvertible for bool {
    fn to_pin_vec(&self) -> Vec<PinState> {
        vec![PinState::from_bool(*self)]
    }
}

impl PinStateConvertible for Vec<PinState> {
    fn to_pin_vec(&self) -> Vec<PinState> {
        self.clone()
    }
}

macro_rules! impl_pin_state_convertible {
    ($($t:ty),*) => {
        $(
            impl PinStateConvertible for $t {
                fn to_pin_vec(&self) -> Vec<PinState> {
                    (0..<$t>::BITS)
                        .rev()
                        .map(|i| PinState::from_bool((self >> i) & 1 == 1))
                        .collect()
                }
            }
        )*
    };
}

impl_pin_state_convertible!(u8, u16, u32);
