//! ATtiny85 I/O register map.
//!
//! Addresses are I/O space addresses (as used by `in`/`out`), bit numbers follow the datasheet.

use bitfield::bitfield;

pub const PINB: u8 = 0x16;
pub const DDRB: u8 = 0x17;
pub const PORTB: u8 = 0x18;
pub const OCR0B: u8 = 0x28;
pub const OCR0A: u8 = 0x29;
pub const TCCR0A: u8 = 0x2A;
pub const TCNT0: u8 = 0x32;
pub const TCCR0B: u8 = 0x33;
pub const TIFR: u8 = 0x38;
pub const TIMSK: u8 = 0x39;
pub const SREG: u8 = 0x3F;

// PINB / DDRB / PORTB
pub const PB0: u8 = 0;
pub const PB1: u8 = 1;
pub const PB2: u8 = 2;
pub const PB3: u8 = 3;
pub const PB4: u8 = 4;
pub const PB5: u8 = 5;
pub const DDB0: u8 = PB0;
pub const DDB1: u8 = PB1;
pub const PORTB0: u8 = PB0;
pub const PORTB1: u8 = PB1;

// TCCR0A
pub const COM0A1: u8 = 7;
pub const COM0A0: u8 = 6;
pub const COM0B1: u8 = 5;
pub const COM0B0: u8 = 4;
pub const WGM01: u8 = 1;
pub const WGM00: u8 = 0;

// TCCR0B
pub const WGM02: u8 = 3;
pub const CS02: u8 = 2;
pub const CS01: u8 = 1;
pub const CS00: u8 = 0;

// TIMSK / TIFR
pub const OCIE0A: u8 = 4;
pub const OCIE0B: u8 = 3;
pub const TOIE0: u8 = 1;
pub const OCF0A: u8 = 4;
pub const OCF0B: u8 = 3;
pub const TOV0: u8 = 1;

/// Number of port B pins.
pub const PORTB_PINS: usize = 6;
/// Bits of port B registers backed by real pins.
pub const PORTB_MASK: u8 = (1 << PORTB_PINS) - 1;

/// Bit value, `_BV()` of avr-libc.
#[inline]
pub const fn bv(bit: u8) -> u8 {
    1 << bit
}

bitfield!{
    /// Timer/Counter Control Register A
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct Tccr0a(u8);
    impl Debug;
    pub u8, com0a, set_com0a: 7, 6;
    pub u8, com0b, set_com0b: 5, 4;
    pub u8, wgm0_low, set_wgm0_low: 1, 0;
}

bitfield!{
    /// Timer/Counter Control Register B
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct Tccr0b(u8);
    impl Debug;
    pub foc0a, set_foc0a: 7;
    pub foc0b, set_foc0b: 6;
    pub wgm02, set_wgm02: 3;
    pub u8, cs0, set_cs0: 2, 0;
}

bitfield!{
    /// Timer/Counter Interrupt Mask Register (Timer/Counter0 bits)
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct Timsk(u8);
    impl Debug;
    pub ocie0a, set_ocie0a: 4;
    pub ocie0b, set_ocie0b: 3;
    pub toie0, set_toie0: 1;
}

bitfield!{
    /// Timer/Counter Interrupt Flag Register (Timer/Counter0 bits)
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct Tifr(u8);
    impl Debug;
    pub ocf0a, set_ocf0a: 4;
    pub ocf0b, set_ocf0b: 3;
    pub tov0, set_tov0: 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_register_fields() {
        let a = Tccr0a(bv(COM0A1) | bv(WGM01) | bv(WGM00));
        assert_eq!(a.com0a(), 0b10);
        assert_eq!(a.com0b(), 0);
        assert_eq!(a.wgm0_low(), 0b11);

        let b = Tccr0b(bv(WGM02) | bv(CS01) | bv(CS00));
        assert!(b.wgm02());
        assert_eq!(b.cs0(), 0b011);
    }

    #[test]
    fn interrupt_bits_line_up() {
        assert!(Timsk(bv(TOIE0)).toie0());
        assert!(Tifr(bv(OCF0A)).ocf0a());
        assert!(!Tifr(bv(OCF0A)).tov0());
    }
}
