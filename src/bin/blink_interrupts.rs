//! Blinks an LED on PB0 at about 1 Hz by counting Timer/Counter0 overflows.

use std::io;

use log::info;

use tinysim::board::Board;
use tinysim::components::attiny::{Attiny85, DEFAULT_F_CPU};
use tinysim::components::led::Led;
use tinysim::lessons::blink_interrupts::{BlinkConfig, BlinkInterrupts};
use tinysim::soft_timer;
use tinysim::vcd::VcdConfig;
use tinysim::vcd_config;

#[macro_use]
extern crate timeit;

fn main() -> io::Result<()> {
    env_logger::init();
    let path = std::env::args().nth(1).unwrap_or_else(|| "blink_interrupts.vcd".to_string());

    let config = BlinkConfig::default();
    if let Some(prescale) = config.clock_select.factor() {
        info!("Toggling PB0 every {} overflows of {:.3} ms, {:.6} s",
            config.threshold,
            soft_timer::overflow_period(DEFAULT_F_CPU, prescale) * 1e3,
            soft_timer::toggle_period(DEFAULT_F_CPU, prescale, config.threshold));
    }

    let mut board = Board::new(&path, DEFAULT_F_CPU as f64)?;
    let mcu = board.add_component_threadless(
        Attiny85::with_firmware(BlinkInterrupts::new(config)), "mcu",
        &vcd_config!{
            portb,
            sreg: { I },
            timer0: { tcnt0, tov0 }
        });

    let led = board.add_component(Led::new("led"), "led", &VcdConfig::Enable);

    board.add_clock_wire(&[mcu.pin("CLK")]);
    board.add_wire(&[mcu.pin("PB0"), led.pin("LED")]);

    let mut result = Ok(());
    let seconds = timeit_loops!(1, {
        result = board.simulate(2 * DEFAULT_F_CPU as u64);
    });
    result?;
    info!("Simulated {} cycles in {:.2} s, dumped into {}", board.cycles(), seconds, path);
    Ok(())
}
