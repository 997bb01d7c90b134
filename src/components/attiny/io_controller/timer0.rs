//! 8-bit Timer/Counter0 of the ATtiny85.

use log::{trace, warn};

use crate::pins::PinState;
use crate::vcd::{VcdFiller, VcdModuleBuilder, VcdTreeModule};

use super::Interrupt;
use super::super::registers::{Tccr0a, Tccr0b, Tifr, Timsk};

/// Counter width, one overflow every `COUNTER_STEPS` timer clocks in normal mode.
pub const COUNTER_STEPS: u32 = 256;

/// Clock source of the counter, CS02:0 bits of TCCR0B.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSelect {
    Stopped = 0,
    Clk1 = 1,
    Clk8 = 2,
    Clk64 = 3,
    Clk256 = 4,
    Clk1024 = 5,
    ExternalFalling = 6,
    ExternalRising = 7,
}

impl ClockSelect {
    pub fn from_bits(bits: u8) -> ClockSelect {
        match bits & 0x7 {
            0 => ClockSelect::Stopped,
            1 => ClockSelect::Clk1,
            2 => ClockSelect::Clk8,
            3 => ClockSelect::Clk64,
            4 => ClockSelect::Clk256,
            5 => ClockSelect::Clk1024,
            6 => ClockSelect::ExternalFalling,
            _ => ClockSelect::ExternalRising,
        }
    }

    /// Prescale factor from a number, only the factors the hardware supports are accepted.
    pub fn from_factor(factor: u32) -> Option<ClockSelect> {
        match factor {
            1 => Some(ClockSelect::Clk1),
            8 => Some(ClockSelect::Clk8),
            64 => Some(ClockSelect::Clk64),
            256 => Some(ClockSelect::Clk256),
            1024 => Some(ClockSelect::Clk1024),
            _ => None,
        }
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Division of the core clock, `None` when the counter is stopped or clocked from T0.
    pub fn factor(self) -> Option<u32> {
        match self {
            ClockSelect::Clk1 => Some(1),
            ClockSelect::Clk8 => Some(8),
            ClockSelect::Clk64 => Some(64),
            ClockSelect::Clk256 => Some(256),
            ClockSelect::Clk1024 => Some(1024),
            ClockSelect::Stopped |
            ClockSelect::ExternalFalling |
            ClockSelect::ExternalRising => None,
        }
    }
}

/// WGM02:0 bits, spread over TCCR0A and TCCR0B.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveformGenerationMode {
    Normal,
    PwmPhaseCorrect,
    Ctc,
    FastPwm,
    PwmPhaseCorrectOcrA,
    FastPwmOcrA,
}

impl WaveformGenerationMode {
    /// Decodes WGM02:0. Reserved encodings count like normal mode.
    pub fn from_bits(bits: u8) -> WaveformGenerationMode {
        match bits & 0x7 {
            1 => WaveformGenerationMode::PwmPhaseCorrect,
            2 => WaveformGenerationMode::Ctc,
            3 => WaveformGenerationMode::FastPwm,
            5 => WaveformGenerationMode::PwmPhaseCorrectOcrA,
            7 => WaveformGenerationMode::FastPwmOcrA,
            _ => WaveformGenerationMode::Normal,
        }
    }

    fn is_phase_correct(self) -> bool {
        matches!(self, WaveformGenerationMode::PwmPhaseCorrect | WaveformGenerationMode::PwmPhaseCorrectOcrA)
    }

    fn is_fast_pwm(self) -> bool {
        matches!(self, WaveformGenerationMode::FastPwm | WaveformGenerationMode::FastPwmOcrA)
    }

    fn is_pwm(self) -> bool {
        self.is_phase_correct() || self.is_fast_pwm()
    }
}

/// COM0x1:0 bits of TCCR0A.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOutputMode {
    Disconnected = 0,
    Toggle = 1,
    Clear = 2,
    Set = 3,
}

impl CompareOutputMode {
    pub fn from_bits(bits: u8) -> CompareOutputMode {
        match bits & 0x3 {
            0 => CompareOutputMode::Disconnected,
            1 => CompareOutputMode::Toggle,
            2 => CompareOutputMode::Clear,
            _ => CompareOutputMode::Set,
        }
    }
}

/// Output compare channel, A drives OC0A (PB0), B drives OC0B (PB1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    A = 0,
    B = 1,
}

const CHANNELS: [Channel; 2] = [Channel::A, Channel::B];

/// What happens to an output compare pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PinAction {
    None,
    Toggle,
    Clear,
    Set,
}

/// Timer/Counter0 of the ATtiny85.
///
/// In fast PWM the output is HIGH exactly while TCNT0 is below OCR0A. The extremes differ from
/// the datasheet: OCR0A = 0 stays LOW instead of a one-clock spike at BOTTOM, and
/// OCR0A = 0xFF gives 255/256 instead of a constant HIGH.
pub struct Timer0 {
    tcnt: u8,
    /// OCR0x as written by the firmware.
    reg_ocr: [u8; 2],
    /// OCR0x used by the comparator, double buffered in PWM modes.
    active_ocr: [u8; 2],
    tccr0a: Tccr0a,
    tccr0b: Tccr0b,
    timsk: Timsk,
    tifr: Tifr,
    counting_down: bool,
    /// Output compare pin levels.
    oc: [bool; 2],
    /// Last sampled level of the T0 pin.
    t0: bool,

    overflows: u64,
    lost_overflows: u64,
}

impl Timer0 {
    pub fn new() -> Timer0 {
        Timer0 {
            tcnt: 0,
            reg_ocr: [0; 2],
            active_ocr: [0; 2],
            tccr0a: Tccr0a(0),
            tccr0b: Tccr0b(0),
            timsk: Timsk(0),
            tifr: Tifr(0),
            counting_down: false,
            oc: [false; 2],
            t0: false,
            overflows: 0,
            lost_overflows: 0,
        }
    }

    pub fn clock_select(&self) -> ClockSelect {
        ClockSelect::from_bits(self.tccr0b.cs0())
    }

    pub fn waveform_mode(&self) -> WaveformGenerationMode {
        WaveformGenerationMode::from_bits((self.tccr0b.wgm02() as u8) << 2 | self.tccr0a.wgm0_low())
    }

    pub fn compare_output_mode(&self, channel: Channel) -> CompareOutputMode {
        match channel {
            Channel::A => CompareOutputMode::from_bits(self.tccr0a.com0a()),
            Channel::B => CompareOutputMode::from_bits(self.tccr0a.com0b()),
        }
    }

    /// Number of overflows since reset.
    pub fn overflows(&self) -> u64 {
        self.overflows
    }

    /// Overflows which happened while the previous one was still waiting for its interrupt handler.
    ///
    /// Every such overflow is missed by the firmware.
    pub fn lost_overflows(&self) -> u64 {
        self.lost_overflows
    }

    #[inline]
    fn top(&self) -> u8 {
        match self.waveform_mode() {
            WaveformGenerationMode::Normal |
            WaveformGenerationMode::PwmPhaseCorrect |
            WaveformGenerationMode::FastPwm => 0xFF,
            WaveformGenerationMode::Ctc |
            WaveformGenerationMode::PwmPhaseCorrectOcrA |
            WaveformGenerationMode::FastPwmOcrA => self.active_ocr[0],
        }
    }

    /// Pin action on a compare match.
    fn match_action(&self, channel: Channel) -> PinAction {
        let mode = self.waveform_mode();
        match self.compare_output_mode(channel) {
            CompareOutputMode::Disconnected => PinAction::None,
            CompareOutputMode::Toggle if mode.is_pwm() => {
                if channel == Channel::A && self.tccr0b.wgm02() {
                    PinAction::Toggle
                } else {
                    PinAction::None
                }
            }
            CompareOutputMode::Toggle => PinAction::Toggle,
            CompareOutputMode::Clear if mode.is_phase_correct() && self.counting_down => PinAction::Set,
            CompareOutputMode::Clear => PinAction::Clear,
            CompareOutputMode::Set if mode.is_phase_correct() && self.counting_down => PinAction::Clear,
            CompareOutputMode::Set => PinAction::Set,
        }
    }

    /// Pin action when a fast PWM counter restarts from BOTTOM.
    fn bottom_action(&self, channel: Channel) -> PinAction {
        match self.compare_output_mode(channel) {
            CompareOutputMode::Clear => PinAction::Set,
            CompareOutputMode::Set => PinAction::Clear,
            CompareOutputMode::Disconnected | CompareOutputMode::Toggle => PinAction::None,
        }
    }

    fn apply(&mut self, channel: Channel, action: PinAction) {
        let oc = &mut self.oc[channel as usize];
        match action {
            PinAction::None => {}
            PinAction::Toggle => *oc = !*oc,
            PinAction::Clear => *oc = false,
            PinAction::Set => *oc = true,
        }
    }

    /// Level the timer forces onto the output compare pin, `None` if the pin is left to the GPIO port.
    pub fn output(&self, channel: Channel) -> Option<bool> {
        let mode = self.waveform_mode();
        match self.compare_output_mode(channel) {
            CompareOutputMode::Disconnected => None,
            CompareOutputMode::Toggle if mode.is_pwm() && !(channel == Channel::A && self.tccr0b.wgm02()) => None,
            _ => Some(self.oc[channel as usize]),
        }
    }

    /// Advances the timer by one core clock.
    ///
    /// `prescaler` is the shared prescaler counter, `t0` is the synchronized level of the T0 pin.
    pub fn tick(&mut self, prescaler: u16, t0: bool) {
        let rising = !self.t0 && t0;
        let falling = self.t0 && !t0;
        self.t0 = t0;

        let should_count = match self.clock_select() {
            ClockSelect::Stopped => false,
            ClockSelect::ExternalFalling => falling,
            ClockSelect::ExternalRising => rising,
            cs => cs.factor().is_some_and(|factor| prescaler as u32 % factor == 0),
        };
        if should_count {
            self.count();
        }
    }

    /// One timer clock.
    fn count(&mut self) {
        let mode = self.waveform_mode();
        let top = self.top();
        let mut bottom = false;
        let mut overflow = false;

        if mode.is_phase_correct() {
            if top == 0 {
                self.tcnt = 0;
                overflow = true;
            } else if self.counting_down {
                self.tcnt = self.tcnt.saturating_sub(1);
                if self.tcnt == 0 {
                    self.counting_down = false;
                    overflow = true;
                }
            } else {
                self.tcnt = self.tcnt.wrapping_add(1);
                if self.tcnt >= top {
                    self.tcnt = top;
                    self.counting_down = true;
                    self.active_ocr = self.reg_ocr;
                }
            }
        } else if self.tcnt == top {
            self.tcnt = 0;
            bottom = true;
            overflow = top == 0xFF || mode.is_fast_pwm();
            if mode.is_fast_pwm() {
                self.active_ocr = self.reg_ocr;
            }
        } else {
            self.tcnt = self.tcnt.wrapping_add(1);
            // counting past MAX, only possible when TCNT0 was written above TOP
            overflow = self.tcnt == 0;
            bottom = overflow;
        }

        for channel in CHANNELS {
            if bottom && mode.is_fast_pwm() {
                self.apply(channel, self.bottom_action(channel));
            }
            if self.tcnt == self.active_ocr[channel as usize] {
                self.apply(channel, self.match_action(channel));
                match channel {
                    Channel::A => self.tifr.set_ocf0a(true),
                    Channel::B => self.tifr.set_ocf0b(true),
                }
            }
        }

        if overflow {
            self.overflow();
        }
    }

    fn overflow(&mut self) {
        self.overflows += 1;
        if self.tifr.tov0() && self.timsk.toie0() {
            self.lost_overflows += 1;
            if self.lost_overflows == 1 {
                warn!("Timer0 overflow #{} lost: TOV0 still pending, the overflow handler is too slow", self.overflows);
            } else {
                trace!("Timer0 overflow #{} lost ({} so far)", self.overflows, self.lost_overflows);
            }
        }
        self.tifr.set_tov0(true);
    }

    /// The highest priority enabled interrupt with its flag set.
    pub fn pending_interrupt(&self) -> Option<Interrupt> {
        if self.timsk.toie0() && self.tifr.tov0() {
            Some(Interrupt::Timer0Overflow)
        } else if self.timsk.ocie0a() && self.tifr.ocf0a() {
            Some(Interrupt::Timer0CompareA)
        } else if self.timsk.ocie0b() && self.tifr.ocf0b() {
            Some(Interrupt::Timer0CompareB)
        } else {
            None
        }
    }

    /// Clears the flag of an interrupt whose handler is being entered.
    pub fn acknowledge(&mut self, interrupt: Interrupt) {
        match interrupt {
            Interrupt::Timer0Overflow => self.tifr.set_tov0(false),
            Interrupt::Timer0CompareA => self.tifr.set_ocf0a(false),
            Interrupt::Timer0CompareB => self.tifr.set_ocf0b(false),
        }
    }

    #[inline]
    pub fn read_tccr0a(&self) -> u8 {
        self.tccr0a.0
    }
    #[inline]
    pub fn read_tccr0b(&self) -> u8 {
        // FOC0x are strobes and always read as zero
        self.tccr0b.0 & 0x0F
    }
    #[inline]
    pub fn read_tcnt0(&self) -> u8 {
        self.tcnt
    }
    #[inline]
    pub fn read_ocr(&self, channel: Channel) -> u8 {
        self.reg_ocr[channel as usize]
    }
    #[inline]
    pub fn read_timsk(&self) -> u8 {
        self.timsk.0
    }
    #[inline]
    pub fn read_tifr(&self) -> u8 {
        self.tifr.0
    }

    #[inline]
    pub fn write_tccr0a(&mut self, val: u8) {
        self.tccr0a = Tccr0a(val & 0xF3);
    }

    pub fn write_tccr0b(&mut self, val: u8) {
        self.tccr0b = Tccr0b(val & 0xCF);
        let forced = [self.tccr0b.foc0a(), self.tccr0b.foc0b()];
        if !self.waveform_mode().is_pwm() {
            for channel in CHANNELS {
                if forced[channel as usize] {
                    self.apply(channel, self.match_action(channel));
                }
            }
        }
        self.tccr0b.set_foc0a(false);
        self.tccr0b.set_foc0b(false);
    }

    #[inline]
    pub fn write_tcnt0(&mut self, val: u8) {
        self.tcnt = val;
    }

    pub fn write_ocr(&mut self, channel: Channel, val: u8) {
        self.reg_ocr[channel as usize] = val;
        if !self.waveform_mode().is_pwm() {
            self.active_ocr[channel as usize] = val;
        }
    }

    #[inline]
    pub fn write_timsk(&mut self, val: u8) {
        self.timsk = Timsk(val);
    }

    /// Writing a logical one to a flag clears it.
    #[inline]
    pub fn write_tifr(&mut self, val: u8) {
        self.tifr = Tifr(self.tifr.0 & !val);
    }
}

impl Default for Timer0 {
    fn default() -> Self {
        Timer0::new()
    }
}

/// [Timer0] is a module with the following signals:
///
/// - `tcnt0[7:0]` - counter value
/// - `ocr0a[7:0]`, `ocr0b[7:0]` - compare values in use
/// - `oc0a`, `oc0b` - output compare levels
/// - `tov0` - overflow flag
impl VcdFiller for Timer0 {
    const IS_SIGNAL: bool = false;

    fn init_vcd_module(&self, builder: &mut VcdModuleBuilder) {
        builder.add_signal("tcnt0", 8, PinState::Low);
        builder.add_signal("ocr0a", 8, PinState::Low);
        builder.add_signal("ocr0b", 8, PinState::Low);
        builder.add_signal("oc0a", 1, PinState::Low);
        builder.add_signal("oc0b", 1, PinState::Low);
        builder.add_signal("tov0", 1, PinState::Low);
    }

    fn fill_module(&self, module: &mut VcdTreeModule, changed: &mut bool) {
        module.update_subsignal("tcnt0", self.tcnt, changed);
        module.update_subsignal("ocr0a", self.active_ocr[0], changed);
        module.update_subsignal("ocr0b", self.active_ocr[1], changed);
        module.update_subsignal("oc0a", self.oc[0], changed);
        module.update_subsignal("oc0b", self.oc[1], changed);
        module.update_subsignal("tov0", self.tifr.tov0(), changed);
    }
}

#[cfg(test)]
mod tests {
    use crate::components::attiny::registers::*;

    use super::*;

    /// Runs the timer for `cycles` core clocks, returning how long OC0A was high.
    fn high_cycles(timer: &mut Timer0, prescaler: &mut u16, cycles: u32) -> u32 {
        let mut high = 0;
        for _ in 0..cycles {
            *prescaler = (*prescaler + 1) % 1024;
            timer.tick(*prescaler, false);
            if timer.output(Channel::A) == Some(true) {
                high += 1;
            }
        }
        high
    }

    #[test]
    fn prescale_factors() {
        assert_eq!(ClockSelect::from_factor(64), Some(ClockSelect::Clk64));
        assert_eq!(ClockSelect::from_factor(32), None);
        assert_eq!(ClockSelect::Clk1024.factor(), Some(1024));
        assert_eq!(ClockSelect::ExternalRising.factor(), None);
        assert_eq!(ClockSelect::from_bits(bv(CS01) | bv(CS00)), ClockSelect::Clk64);
    }

    #[test]
    fn normal_mode_overflows_every_256_timer_clocks() {
        let mut timer = Timer0::new();
        timer.write_tccr0b(ClockSelect::Clk8.bits());
        let mut prescaler = 0;
        high_cycles(&mut timer, &mut prescaler, 256 * 8 - 1);
        assert_eq!(timer.overflows(), 0);
        high_cycles(&mut timer, &mut prescaler, 1);
        assert_eq!(timer.overflows(), 1);
        assert!(Tifr(timer.read_tifr()).tov0());
        assert_eq!(timer.read_tcnt0(), 0);
    }

    #[test]
    fn stopped_timer_does_not_count() {
        let mut timer = Timer0::new();
        let mut prescaler = 0;
        high_cycles(&mut timer, &mut prescaler, 5000);
        assert_eq!(timer.read_tcnt0(), 0);
        assert_eq!(timer.overflows(), 0);
    }

    #[test]
    fn flags_clear_by_writing_one() {
        let mut timer = Timer0::new();
        timer.write_timsk(bv(TOIE0));
        timer.write_tccr0b(ClockSelect::Clk1.bits());
        let mut prescaler = 0;
        high_cycles(&mut timer, &mut prescaler, 256);
        assert_eq!(timer.pending_interrupt(), Some(Interrupt::Timer0Overflow));
        timer.write_tifr(bv(OCF0A));
        assert_eq!(timer.pending_interrupt(), Some(Interrupt::Timer0Overflow));
        timer.write_tifr(bv(TOV0));
        assert_eq!(timer.pending_interrupt(), None);
    }

    #[test]
    fn overflow_while_pending_is_counted_as_lost() {
        let mut timer = Timer0::new();
        timer.write_timsk(bv(TOIE0));
        timer.write_tccr0b(ClockSelect::Clk1.bits());
        let mut prescaler = 0;
        high_cycles(&mut timer, &mut prescaler, 256 * 3);
        assert_eq!(timer.overflows(), 3);
        assert_eq!(timer.lost_overflows(), 2);

        timer.acknowledge(Interrupt::Timer0Overflow);
        high_cycles(&mut timer, &mut prescaler, 256);
        assert_eq!(timer.lost_overflows(), 2);
    }

    #[test]
    fn disabled_overflow_interrupt_never_loses_overflows() {
        let mut timer = Timer0::new();
        timer.write_tccr0b(ClockSelect::Clk1.bits());
        let mut prescaler = 0;
        high_cycles(&mut timer, &mut prescaler, 256 * 4);
        assert_eq!(timer.lost_overflows(), 0);
        assert_eq!(timer.pending_interrupt(), None);
    }

    #[test]
    fn ctc_mode_toggles_on_compare_match() {
        let mut timer = Timer0::new();
        timer.write_tccr0a(bv(COM0A0) | bv(WGM01));
        timer.write_ocr(Channel::A, 9);
        timer.write_tccr0b(ClockSelect::Clk1.bits());
        let mut prescaler = 0;
        // OC0A toggles every 10 timer clocks, so it is high half of the time
        assert_eq!(high_cycles(&mut timer, &mut prescaler, 200), 100);
        assert_eq!(timer.overflows(), 0);
        assert!(Tifr(timer.read_tifr()).ocf0a());
    }

    #[test]
    fn fast_pwm_duty_follows_ocr0a() {
        let mut timer = Timer0::new();
        timer.write_tccr0a(bv(COM0A1) | bv(WGM01) | bv(WGM00));
        timer.write_ocr(Channel::A, 150);
        timer.write_tccr0b(ClockSelect::Clk1.bits());
        let mut prescaler = 0;
        // first period picks up the buffered OCR0A
        high_cycles(&mut timer, &mut prescaler, 256);
        assert_eq!(high_cycles(&mut timer, &mut prescaler, 256 * 4), 150 * 4);
        assert_eq!(timer.waveform_mode(), WaveformGenerationMode::FastPwm);
    }

    #[test]
    fn fast_pwm_extremes_follow_the_counter_comparison() {
        for (ocr, high) in [(0u8, 0), (0xFF, 255)] {
            let mut timer = Timer0::new();
            timer.write_tccr0a(bv(COM0A1) | bv(WGM01) | bv(WGM00));
            timer.write_ocr(Channel::A, ocr);
            timer.write_tccr0b(ClockSelect::Clk1.bits());
            let mut prescaler = 0;
            high_cycles(&mut timer, &mut prescaler, 256);
            assert_eq!(high_cycles(&mut timer, &mut prescaler, 256 * 4), high * 4, "OCR0A = {ocr}");
        }
    }

    #[test]
    fn fast_pwm_inverting_mode() {
        let mut timer = Timer0::new();
        timer.write_tccr0a(bv(COM0A1) | bv(COM0A0) | bv(WGM01) | bv(WGM00));
        timer.write_ocr(Channel::A, 64);
        timer.write_tccr0b(ClockSelect::Clk1.bits());
        let mut prescaler = 0;
        high_cycles(&mut timer, &mut prescaler, 256);
        assert_eq!(high_cycles(&mut timer, &mut prescaler, 256 * 2), (256 - 64) * 2);
    }

    #[test]
    fn phase_correct_pwm_duty_and_period() {
        let mut timer = Timer0::new();
        timer.write_tccr0a(bv(COM0A1) | bv(WGM00));
        timer.write_ocr(Channel::A, 150);
        timer.write_tccr0b(ClockSelect::Clk1.bits());
        let mut prescaler = 0;
        high_cycles(&mut timer, &mut prescaler, 510);
        let overflows = timer.overflows();
        assert_eq!(high_cycles(&mut timer, &mut prescaler, 510 * 3), 300 * 3);
        assert_eq!(timer.overflows() - overflows, 3);
    }

    #[test]
    fn ocr_is_double_buffered_in_pwm_modes() {
        let mut timer = Timer0::new();
        timer.write_tccr0a(bv(COM0A1) | bv(WGM01) | bv(WGM00));
        timer.write_tccr0b(ClockSelect::Clk1.bits());
        let mut prescaler = 0;
        high_cycles(&mut timer, &mut prescaler, 10);
        timer.write_ocr(Channel::A, 200);
        assert_eq!(timer.read_ocr(Channel::A), 200);
        assert_eq!(timer.active_ocr[0], 0);
        high_cycles(&mut timer, &mut prescaler, 246);
        assert_eq!(timer.active_ocr[0], 200);
    }

    #[test]
    fn toggle_mode_is_disconnected_in_pwm_without_wgm02() {
        let mut timer = Timer0::new();
        timer.write_tccr0a(bv(COM0A0) | bv(WGM01) | bv(WGM00));
        assert_eq!(timer.output(Channel::A), None);
        timer.write_tccr0a(0);
        assert_eq!(timer.output(Channel::A), None);
        timer.write_tccr0a(bv(COM0A0));
        assert_eq!(timer.output(Channel::A), Some(false));
    }

    #[test]
    fn force_output_compare_applies_match_action() {
        let mut timer = Timer0::new();
        timer.write_tccr0a(bv(COM0B0) | bv(COM0B1));
        timer.write_tccr0b(bv(6));
        assert_eq!(timer.output(Channel::B), Some(true));
        assert_eq!(timer.read_tccr0b(), 0);
        assert!(!Tifr(timer.read_tifr()).ocf0b());
    }

    #[test]
    fn external_clock_counts_edges() {
        let mut timer = Timer0::new();
        timer.write_tccr0b(ClockSelect::ExternalRising.bits());
        for level in [true, false, true, false, true] {
            timer.tick(1, level);
        }
        assert_eq!(timer.read_tcnt0(), 3);
    }
}
