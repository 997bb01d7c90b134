//! Lights an LED on PB0 while a button pulls PB1 low.

use std::io;

use log::info;

use tinysim::board::Board;
use tinysim::components::attiny::{Attiny85, DEFAULT_F_CPU};
use tinysim::components::button::Button;
use tinysim::components::led::Led;
use tinysim::lessons::gpio::Gpio;
use tinysim::vcd::VcdConfig;
use tinysim::vcd_config;

#[macro_use]
extern crate timeit;

fn main() -> io::Result<()> {
    env_logger::init();
    let path = std::env::args().nth(1).unwrap_or_else(|| "gpio.vcd".to_string());

    let mut board = Board::new(&path, DEFAULT_F_CPU as f64)?;
    let mcu = board.add_component_threadless(
        Attiny85::with_firmware(Gpio::new()), "mcu",
        &vcd_config!{
            clk,
            portb
        });

    let button = board.add_component(
        Button::new(vec![1_000..3_000, 5_000..5_500]), "button",
        &VcdConfig::Enable);

    let led = board.add_component(Led::new("led"), "led", &VcdConfig::Enable);

    board.add_clock_wire(&[mcu.pin("CLK"), button.pin("CLK")]);
    board.add_wire(&[mcu.pin("PB1"), button.pin("OUT")]);
    board.add_wire(&[mcu.pin("PB0"), led.pin("LED")]);

    let mut result = Ok(());
    let seconds = timeit_loops!(1, {
        result = board.simulate(8_000);
    });
    result?;
    info!("Simulated {} cycles in {:.2} s, dumped into {}", board.cycles(), seconds, path);
    Ok(())
}
