//! Mirror an active-low button on PB1 to an LED on PB0.

use crate::components::attiny::registers::*;
use crate::components::attiny::{Cpu, Firmware, IoControllerTrait};

/// PB0 is an output, PB1 an input with its pull-up enabled.
///
/// Every pass of the main loop drives PB0 LOW while PB1 reads HIGH and HIGH while it reads LOW,
/// so a button pulling PB1 to ground lights the LED.
#[derive(Debug, Default)]
pub struct Gpio {
    passes: u64,
}

impl Gpio {
    pub fn new() -> Gpio {
        Gpio { passes: 0 }
    }

    /// Passes of the main loop so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }
}

impl Firmware for Gpio {
    fn setup<Io: IoControllerTrait>(&mut self, cpu: &mut Cpu<'_, Io>) {
        cpu.set_bits(DDRB, bv(DDB0));
        cpu.clear_bits(DDRB, bv(DDB1));
        cpu.set_bits(PORTB, bv(PORTB1));
    }

    fn main_loop<Io: IoControllerTrait>(&mut self, cpu: &mut Cpu<'_, Io>) {
        self.passes += 1;
        if cpu.read(PINB) & bv(PB1) != 0 {
            cpu.clear_bits(PORTB, bv(PORTB0));
        } else {
            cpu.set_bits(PORTB, bv(PORTB0));
        }
        // sbrs + rjmp
        cpu.spend(3);
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use mockall::Sequence;

    use crate::board::Board;
    use crate::component::Component;
    use crate::components::attiny::io_controller::{MockIoControllerTrait, PORTB_FIRST_PIN};
    use crate::components::attiny::{Mcu, StatusRegister};
    use crate::components::button::Button;
    use crate::components::led::Led;
    use crate::lessons::test_helper::pb0;
    use crate::pins::{PinId, PinState};
    use crate::vcd::VcdConfig;

    use super::*;

    #[test]
    fn setup_writes() {
        let mut io = MockIoControllerTrait::new();
        let mut seq = Sequence::new();
        io.expect_read_internal_u8().with(eq(DDRB)).times(2).return_const(0b1111_1110u8);
        io.expect_read_internal_u8().with(eq(PORTB)).times(1).return_const(0u8);
        io.expect_write_internal_u8().with(eq(DDRB), eq(0xFF)).times(1).in_sequence(&mut seq).return_const(());
        io.expect_write_internal_u8().with(eq(DDRB), eq(0b1111_1100)).times(1).in_sequence(&mut seq).return_const(());
        io.expect_write_internal_u8().with(eq(PORTB), eq(bv(PORTB1))).times(1).in_sequence(&mut seq).return_const(());

        let mut sreg = StatusRegister(0);
        let mut cpu = Cpu::new(&mut io, &mut sreg, 1_000_000);
        Gpio::new().setup(&mut cpu);
        assert_eq!(cpu.cycles(), 6);
    }

    #[test]
    fn released_button_reads_the_pull_up() {
        let mut mcu = Mcu::with_firmware(Gpio::new());
        mcu.run(20);
        assert_eq!(mcu.io.gpio().output_state(PB1 as usize), PinState::WeakHigh);
        assert_eq!(pb0(&mcu), PinState::Low);
        assert!(mcu.firmware().passes() > 0);
    }

    #[test]
    fn pressed_button_lights_the_led() {
        let pb1 = PORTB_FIRST_PIN + PB1 as PinId;
        let mut mcu = Mcu::with_firmware(Gpio::new());
        mcu.run(20);

        mcu.set_pin(pb1, PinState::Low);
        mcu.run(20);
        assert_eq!(pb0(&mcu), PinState::High);

        // floating again, the pull-up takes over
        mcu.set_pin(pb1, PinState::Z);
        mcu.run(20);
        assert_eq!(pb0(&mcu), PinState::Low);
    }

    #[test]
    fn button_on_a_board() {
        let mut board = Board::with_writer(std::io::sink(), 1e6);
        let mcu = board.add_component_threadless(Mcu::with_firmware(Gpio::new()), "mcu", &VcdConfig::Enable);
        let button = board.add_component(Button::new(vec![100..200]), "button", &VcdConfig::Enable);
        let led = board.add_component_threadless(Led::new("led"), "led", &VcdConfig::Enable);
        board.add_clock_wire(&[mcu.pin("CLK"), button.pin("CLK")]);
        board.add_wire(&[mcu.pin("PB1"), button.pin("OUT")]);
        board.add_wire(&[mcu.pin("PB0"), led.pin("LED")]);

        board.simulate(90).unwrap();
        assert_eq!(board.pin_state(mcu.pin("PB1")), PinState::WeakHigh);
        assert_eq!(board.pin_state(led.pin("LED")), PinState::Low);

        board.simulate(60).unwrap();
        assert_eq!(board.pin_state(mcu.pin("PB1")), PinState::Low);
        assert_eq!(board.pin_state(led.pin("LED")), PinState::High);

        board.simulate(100).unwrap();
        assert_eq!(board.pin_state(led.pin("LED")), PinState::Low);
    }
}
