use std::collections::HashMap;

use log::{debug, trace};

use crate::component::Component;
use crate::pins::{PinId, PinState};
use crate::vcd::{VcdFiller, VcdModuleBuilder, VcdTreeModule};

use super::firmware::{Cpu, Firmware};
use super::io_controller::{Interrupt, IoController, IoControllerTrait};
use super::registers::PORTB;
use super::sreg::StatusRegister;
use super::DEFAULT_F_CPU;

/// Cycles from an interrupt being accepted to the first handler instruction (push PC, jump).
pub const INTERRUPT_ENTRY_CYCLES: u64 = 4;
/// Cycles of `reti`.
pub const RETI_CYCLES: u64 = 4;

/// Cycle-level model of an ATtiny85 running a [Firmware].
pub struct Mcu<F, Io = IoController>
where
    F: Firmware,
    Io: IoControllerTrait,
{
    pub io: Io,
    firmware: F,
    sreg: StatusRegister,
    f_cpu: u32,

    setup_done: bool,
    /// Remaining stall of the main program's current piece of work.
    busy: u64,
    /// Remaining stall of the interrupt handler being executed, including `reti`.
    handler: Option<u64>,

    cycles: u64,
    interrupts: u64,
}

impl<F: Firmware> Mcu<F, IoController> {
    /// An ATtiny85 clocked at [DEFAULT_F_CPU].
    pub fn with_firmware(firmware: F) -> Mcu<F, IoController> {
        Mcu::new(firmware, IoController::new(), DEFAULT_F_CPU)
    }
}

impl<F: Firmware + Default> Default for Mcu<F, IoController> {
    /// Initializes MCU with a default [IoController].
    fn default() -> Mcu<F, IoController> {
        Mcu::with_firmware(F::default())
    }
}

impl<F, Io> Mcu<F, Io>
where
    F: Firmware,
    Io: IoControllerTrait,
{
    /// Creates a new MCU with a specified [IoControllerTrait], clocked at `f_cpu` Hz.
    pub fn new(firmware: F, io: Io, f_cpu: u32) -> Mcu<F, Io> {
        Mcu {
            io,
            firmware,
            sreg: StatusRegister(0),
            f_cpu,
            setup_done: false,
            busy: 0,
            handler: None,
            cycles: 0,
            interrupts: 0,
        }
    }

    pub fn firmware(&self) -> &F {
        &self.firmware
    }

    pub fn sreg(&self) -> StatusRegister {
        self.sreg
    }

    pub fn f_cpu(&self) -> u32 {
        self.f_cpu
    }

    /// Core cycles executed since reset.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Number of interrupt handlers entered since reset.
    pub fn interrupts(&self) -> u64 {
        self.interrupts
    }

    /// Simulated time since reset, in seconds.
    pub fn elapsed(&self) -> f64 {
        self.cycles as f64 / self.f_cpu as f64
    }

    /// Executes one core clock cycle.
    pub fn step(&mut self) {
        self.io.tick();
        self.cycles += 1;

        if let Some(remaining) = self.handler {
            if remaining > 1 {
                self.handler = Some(remaining - 1);
            } else {
                self.handler = None;
                self.sreg.set_i(true);
            }
            return;
        }

        if self.sreg.i() {
            if let Some(interrupt) = self.io.pending_interrupt() {
                self.execute_interrupt(interrupt);
                return;
            }
        }

        if self.busy > 0 {
            self.busy -= 1;
            return;
        }

        let cycles = {
            let mut cpu = Cpu::new(&mut self.io, &mut self.sreg, self.f_cpu);
            if self.setup_done {
                self.firmware.main_loop(&mut cpu);
            } else {
                self.firmware.setup(&mut cpu);
            }
            cpu.cycles()
        };
        if !self.setup_done {
            debug!("Setup done in {} cycles", cycles);
            self.setup_done = true;
        }
        // the current cycle is the first one of the work
        self.busy = cycles.max(1) - 1;
    }

    /// Executes `cycles` core clock cycles.
    pub fn run(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.step();
        }
    }

    fn execute_interrupt(&mut self, interrupt: Interrupt) {
        trace!("Entering interrupt vector {} ({:?}) at cycle {}", interrupt.vector(), interrupt, self.cycles);
        self.io.acknowledge(interrupt);
        self.sreg.set_i(false);
        self.interrupts += 1;

        let handler_cycles = {
            let mut cpu = Cpu::new(&mut self.io, &mut self.sreg, self.f_cpu);
            self.firmware.interrupt(interrupt, &mut cpu);
            cpu.cycles()
        };
        // I stays cleared until the last cycle of reti, whatever the handler did to it
        self.sreg.set_i(false);
        self.handler = Some(INTERRUPT_ENTRY_CYCLES + handler_cycles + RETI_CYCLES - 1);
    }
}

const PIN_NAMES: [&str; 7] = ["CLK", "PB0", "PB1", "PB2", "PB3", "PB4", "PB5"];

impl<F, Io> Component for Mcu<F, Io>
where
    F: Firmware,
    Io: IoControllerTrait,
{
    fn pin_names() -> &'static [&'static str] {
        &PIN_NAMES
    }

    fn set_pin(&mut self, pin: PinId, state: PinState) {
        self.io.set_pin(pin, state)
    }

    fn fill_output_changes(&mut self, changes: &mut HashMap<PinId, PinState>) {
        self.io.fill_output_changes(changes)
    }

    fn advance(&mut self) {
        if self.io.is_clock_rising() {
            self.step()
        }
    }
}

/// An implementation for [VcdFiller].
///
/// [Mcu] is a module, containing the following signals and submodules:
///
/// ### Signals
/// - `clk` - CPU clock.
/// - `portb[7:0]` - PORTB register.
/// ### Submodules
/// - `sreg` - Status register.
/// - `timer0` - Timer/Counter0.
impl<F, Io> VcdFiller for Mcu<F, Io>
where
    F: Firmware,
    Io: IoControllerTrait,
{
    const IS_SIGNAL: bool = false;

    fn init_vcd_module(&self, builder: &mut VcdModuleBuilder) {
        builder.add_signal("clk", 1, PinState::Low);
        builder.add_signal("portb", 8, PinState::Low);
        builder.add_node("sreg", &self.sreg);
        builder.add_node("timer0", self.io.timer0());
    }

    fn fill_module(&self, module: &mut VcdTreeModule, changed: &mut bool) {
        module.update_subsignal("clk", self.io.clock_pin(), changed);
        module.update_subsignal("portb", self.io.read_internal_u8(PORTB), changed);
        module.update_child("sreg", &self.sreg, changed);
        module.update_child("timer0", self.io.timer0(), changed);
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use crate::components::attiny::io_controller::MockIoControllerTrait;
    use crate::components::attiny::registers::*;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        enable_interrupts: bool,
        handler_cycles: u64,
        setups: u32,
        loops: u32,
        interrupts: Vec<Interrupt>,
    }

    impl Firmware for Recorder {
        fn setup<Io: IoControllerTrait>(&mut self, cpu: &mut Cpu<'_, Io>) {
            self.setups += 1;
            cpu.write(DDRB, bv(DDB0));
            if self.enable_interrupts {
                cpu.sei();
            }
        }

        fn main_loop<Io: IoControllerTrait>(&mut self, cpu: &mut Cpu<'_, Io>) {
            self.loops += 1;
            cpu.idle();
        }

        fn interrupt<Io: IoControllerTrait>(&mut self, interrupt: Interrupt, cpu: &mut Cpu<'_, Io>) {
            self.interrupts.push(interrupt);
            cpu.spend(self.handler_cycles);
        }
    }

    fn mock_io() -> MockIoControllerTrait {
        let mut io = MockIoControllerTrait::new();
        io.expect_tick().return_const(());
        io.expect_write_internal_u8().with(eq(DDRB), eq(bv(DDB0))).times(1).return_const(());
        io
    }

    #[test]
    fn setup_runs_once_then_main_loop() {
        let mut io = mock_io();
        io.expect_pending_interrupt().return_const(Some(Interrupt::Timer0Overflow));

        let mut mcu = Mcu::new(Recorder::default(), io, 1_000_000);
        mcu.run(21);
        // setup takes one cycle, every idle pass two
        assert_eq!(mcu.firmware().setups, 1);
        assert_eq!(mcu.firmware().loops, 10);
        assert_eq!(mcu.interrupts(), 0);
        assert_eq!(mcu.cycles(), 21);
        assert!((mcu.elapsed() - 21e-6).abs() < 1e-12);
    }

    #[test]
    fn interrupts_are_not_nested() {
        let mut io = mock_io();
        io.expect_pending_interrupt().return_const(Some(Interrupt::Timer0Overflow));
        io.expect_acknowledge().with(eq(Interrupt::Timer0Overflow)).return_const(());

        let firmware = Recorder { enable_interrupts: true, handler_cycles: 2, ..Default::default() };
        let mut mcu = Mcu::new(firmware, io, 1_000_000);
        mcu.step();
        assert_eq!(mcu.interrupts(), 0);
        assert!(mcu.sreg().i());
        // accepted on the cycle right after sei, the rest of setup is preempted
        mcu.step();
        assert_eq!(mcu.interrupts(), 1);
        assert!(!mcu.sreg().i());

        // entry + handler + reti
        mcu.run(INTERRUPT_ENTRY_CYCLES + 2 + RETI_CYCLES - 1);
        assert_eq!(mcu.interrupts(), 1);
        assert!(mcu.sreg().i());
        mcu.step();
        assert_eq!(mcu.interrupts(), 2);
        assert_eq!(mcu.firmware().interrupts, vec![Interrupt::Timer0Overflow; 2]);
        assert_eq!(mcu.firmware().loops, 0);
    }

    #[test]
    fn main_loop_runs_while_nothing_is_pending() {
        let mut io = mock_io();
        io.expect_pending_interrupt().return_const(None::<Interrupt>);

        let firmware = Recorder { enable_interrupts: true, ..Default::default() };
        let mut mcu = Mcu::new(firmware, io, 1_000_000);
        mcu.run(10);
        assert!(mcu.sreg().i());
        assert_eq!(mcu.interrupts(), 0);
        assert!(mcu.firmware().interrupts.is_empty());
        // setup: out + sei, then a pass every two cycles
        assert_eq!(mcu.firmware().loops, 4);
    }

    #[test]
    fn steps_on_rising_clock_edges_only() {
        let mut io = MockIoControllerTrait::new();
        io.expect_is_clock_rising().times(2).return_const(false);
        io.expect_tick().never();

        let mut mcu = Mcu::new(Recorder::default(), io, 1_000_000);
        mcu.advance();
        mcu.advance();
        assert_eq!(mcu.cycles(), 0);
    }
}
