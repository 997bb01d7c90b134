use super::io_controller::{Interrupt, IoControllerTrait};
use super::registers::SREG;
use super::sreg::StatusRegister;

/// Cycles of one pass of an empty `loop {}` (a single `rjmp`).
pub const IDLE_LOOP_CYCLES: u64 = 2;

/// Program running on the simulated MCU.
///
/// Every call runs to completion at once, the [Mcu](super::mcu::Mcu) then stalls the core
/// for as many cycles as the call charged to its [Cpu]. Interrupt handlers are never nested:
/// the I flag is cleared on entry and set again by the return from the handler.
pub trait Firmware: Send {
    /// Runs once after reset.
    fn setup<Io: IoControllerTrait>(&mut self, cpu: &mut Cpu<'_, Io>);
    /// One pass of the main loop.
    fn main_loop<Io: IoControllerTrait>(&mut self, cpu: &mut Cpu<'_, Io>);
    /// Interrupt handler, called for every interrupt which is enabled and pending while I is set.
    fn interrupt<Io: IoControllerTrait>(&mut self, _interrupt: Interrupt, _cpu: &mut Cpu<'_, Io>) {}
}

/// View of the core given to the [Firmware], charging cycles for everything it does.
pub struct Cpu<'a, Io: IoControllerTrait> {
    io: &'a mut Io,
    sreg: &'a mut StatusRegister,
    f_cpu: u32,
    cycles: u64,
}

impl<'a, Io: IoControllerTrait> Cpu<'a, Io> {
    pub fn new(io: &'a mut Io, sreg: &'a mut StatusRegister, f_cpu: u32) -> Cpu<'a, Io> {
        Cpu { io, sreg, f_cpu, cycles: 0 }
    }

    /// Core clock frequency in Hz.
    #[inline]
    pub fn f_cpu(&self) -> u32 {
        self.f_cpu
    }

    /// Cycles charged so far.
    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Reads an IO register (`in`).
    pub fn read(&mut self, addr: u8) -> u8 {
        self.cycles += 1;
        if addr == SREG {
            self.sreg.0
        } else {
            self.io.read_internal_u8(addr)
        }
    }

    /// Writes an IO register (`out`).
    pub fn write(&mut self, addr: u8, val: u8) {
        self.cycles += 1;
        if addr == SREG {
            *self.sreg = StatusRegister(val);
        } else {
            self.io.write_internal_u8(addr, val);
        }
    }

    /// Read-modify-write of an IO register.
    pub fn modify<F: FnOnce(u8) -> u8>(&mut self, addr: u8, f: F) {
        let val = self.read(addr);
        self.write(addr, f(val));
    }

    /// `reg |= mask`
    pub fn set_bits(&mut self, addr: u8, mask: u8) {
        self.modify(addr, |val| val | mask)
    }

    /// `reg &= !mask`
    pub fn clear_bits(&mut self, addr: u8, mask: u8) {
        self.modify(addr, |val| val & !mask)
    }

    /// `reg ^= mask`
    pub fn toggle_bits(&mut self, addr: u8, mask: u8) {
        self.modify(addr, |val| val ^ mask)
    }

    /// Globally enables interrupts.
    pub fn sei(&mut self) {
        self.cycles += 1;
        self.sreg.set_i(true);
    }

    /// Globally disables interrupts.
    pub fn cli(&mut self) {
        self.cycles += 1;
        self.sreg.set_i(false);
    }

    /// Runs `f` with interrupts disabled, then restores SREG as it was.
    pub fn interrupt_free<R, F: FnOnce(&mut Self) -> R>(&mut self, f: F) -> R {
        let saved = self.read(SREG);
        self.cli();
        let r = f(self);
        self.write(SREG, saved);
        r
    }

    /// Burns `cycles` core cycles doing nothing useful.
    #[inline]
    pub fn spend(&mut self, cycles: u64) {
        self.cycles += cycles;
    }

    /// Busy-waits for `us` microseconds.
    pub fn delay_us(&mut self, us: u32) {
        self.spend(self.f_cpu as u64 * us as u64 / 1_000_000);
    }

    /// Busy-waits for `ms` milliseconds.
    pub fn delay_ms(&mut self, ms: u32) {
        self.spend(self.f_cpu as u64 * ms as u64 / 1_000);
    }

    /// One pass of an empty loop.
    #[inline]
    pub fn idle(&mut self) {
        self.spend(IDLE_LOOP_CYCLES);
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use crate::components::attiny::io_controller::MockIoControllerTrait;
    use crate::components::attiny::registers::*;

    use super::*;

    #[test]
    fn register_access_costs_a_cycle() {
        let mut io = MockIoControllerTrait::new();
        io.expect_read_internal_u8().with(eq(PORTB)).times(1).return_const(0b10u8);
        io.expect_write_internal_u8().with(eq(PORTB), eq(0b11)).times(1).return_const(());

        let mut sreg = StatusRegister(0);
        let mut cpu = Cpu::new(&mut io, &mut sreg, 1_000_000);
        cpu.set_bits(PORTB, bv(PB0));
        assert_eq!(cpu.cycles(), 2);
    }

    #[test]
    fn delays_follow_the_core_clock() {
        let mut io = MockIoControllerTrait::new();
        let mut sreg = StatusRegister(0);
        let mut cpu = Cpu::new(&mut io, &mut sreg, 8_000_000);
        cpu.delay_ms(500);
        assert_eq!(cpu.cycles(), 4_000_000);
        cpu.delay_us(3);
        assert_eq!(cpu.cycles(), 4_000_024);
        cpu.idle();
        assert_eq!(cpu.cycles(), 4_000_026);
    }

    #[test]
    fn interrupt_free_restores_sreg() {
        let mut io = MockIoControllerTrait::new();
        let mut sreg = StatusRegister(0);
        sreg.set_i(true);
        sreg.set_c(true);
        {
            let mut cpu = Cpu::new(&mut io, &mut sreg, 1_000_000);
            let inside = cpu.interrupt_free(|cpu| StatusRegister(cpu.read(SREG)).i());
            assert!(!inside);
        }
        assert!(sreg.i());
        assert!(sreg.c());

        sreg.set_i(false);
        let mut cpu = Cpu::new(&mut io, &mut sreg, 1_000_000);
        cpu.interrupt_free(|cpu| cpu.spend(10));
        drop(cpu);
        assert!(!sreg.i());
    }
}
