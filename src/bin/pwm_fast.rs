//! Drives an LED on PB0 with fast PWM, OCR0A = 10.

use std::io;

use log::info;

use tinysim::board::Board;
use tinysim::components::attiny::{Attiny85, DEFAULT_F_CPU};
use tinysim::components::led::Led;
use tinysim::lessons::pwm::{Pwm, PwmConfig};
use tinysim::vcd::VcdConfig;
use tinysim::vcd_config;

#[macro_use]
extern crate timeit;

fn main() -> io::Result<()> {
    env_logger::init();
    let path = std::env::args().nth(1).unwrap_or_else(|| "pwm_fast.vcd".to_string());

    let config = PwmConfig::fast();
    if let Some(frequency) = config.frequency(DEFAULT_F_CPU) {
        info!("{:?} PWM at {:.2} Hz, duty cycle {:.2} %", config.mode, frequency, config.duty_cycle() * 100.0);
    }

    let mut board = Board::new(&path, DEFAULT_F_CPU as f64)?;
    let mcu = board.add_component_threadless(
        Attiny85::with_firmware(Pwm::new(config)), "mcu",
        &vcd_config!{
            timer0: { tcnt0, ocr0a, oc0a }
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
