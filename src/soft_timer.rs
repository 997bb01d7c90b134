//! Overflow-counted software timer.
//!
//! An 8-bit hardware counter overflows far too often to time anything a human can see.
//! Counting its overflows in software stretches that period: every `threshold` overflows
//! the output is toggled.
//!
//! The state lives in a [PeriodicToggle] owned by whoever handles the overflow interrupt,
//! there is no global counter. The handler must run to completion well within one
//! overflow period, otherwise overflows are lost and the toggle period drifts
//! (see [Timer0::lost_overflows](crate::components::attiny::io_controller::timer0::Timer0::lost_overflows)).

use crate::components::attiny::io_controller::timer0::COUNTER_STEPS;

/// Software extension of a hardware overflow event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicToggle {
    count: u32,
    threshold: u32,
    level: bool,
    toggles: u64,
}

impl PeriodicToggle {
    /// Creates a toggle flipping every `threshold` overflows, starting at `initial_level`.
    ///
    /// Panics if `threshold` is zero.
    pub fn new(threshold: u32, initial_level: bool) -> PeriodicToggle {
        assert!(threshold > 0, "Overflow threshold must be at least 1");
        PeriodicToggle {
            count: 0,
            threshold,
            level: initial_level,
            toggles: 0,
        }
    }

    /// Overflows counted since the last toggle, always below the threshold.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    #[inline]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Current output level, `true` for HIGH.
    #[inline]
    pub fn level(&self) -> bool {
        self.level
    }

    /// Number of toggles since creation.
    #[inline]
    pub fn toggles(&self) -> u64 {
        self.toggles
    }

    /// Accounts for one hardware overflow. Returns `true` if the output toggled.
    pub fn on_overflow(&mut self) -> bool {
        self.count += 1;
        // also catches a count already past the threshold
        if self.count >= self.threshold {
            self.level = !self.level;
            self.count = 0;
            self.toggles += 1;
            true
        } else {
            false
        }
    }
}

/// Time between two overflows of an 8-bit counter, in seconds.
pub fn overflow_period(f_cpu: u32, prescale: u32) -> f64 {
    (COUNTER_STEPS * prescale) as f64 / f_cpu as f64
}

/// Number of overflows closest to `half_period` seconds, at least 1.
pub fn threshold_for(f_cpu: u32, prescale: u32, half_period: f64) -> u32 {
    let overflows = (half_period / overflow_period(f_cpu, prescale)).round();
    (overflows as u32).max(1)
}

/// Time between two toggles, in seconds.
pub fn toggle_period(f_cpu: u32, prescale: u32, threshold: u32) -> f64 {
    threshold as f64 * overflow_period(f_cpu, prescale)
}

/// Core clock cycles between two toggles.
pub fn cycles_per_toggle(prescale: u32, threshold: u32) -> u64 {
    threshold as u64 * COUNTER_STEPS as u64 * prescale as u64
}
