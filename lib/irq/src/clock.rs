use core::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use config::time::{NSEC_PER_SEC, TICKS_PER_SEC};
use time::TimeSpec;

/// Time sources the interrupt table needs.
///
/// `ticks` is the coarse scheduler clock that bounds measurement windows;
/// `perf` is a fine free-running counter used to time handler execution.
pub trait IrqClock: Send + Sync {
    /// Current system time in ticks.
    fn ticks(&self) -> u64;

    /// Rate of [`IrqClock::ticks`].
    fn ticks_per_sec(&self) -> u64 {
        TICKS_PER_SEC
    }

    /// Current value of the performance counter.
    fn perf(&self) -> u64;

    /// Converts a performance counter delta into wall-clock time.
    fn perf_convert(&self, elapsed: u64) -> TimeSpec;
}

/// A clock that only moves when told to.
///
/// Hosted builds have no timer hardware to read, so they drive the interrupt
/// table with this and advance it explicitly.
#[derive(Debug)]
pub struct ManualClock {
    ticks: AtomicU64,
    perf: AtomicU64,
    ticks_per_sec: u64,
    perf_freq: u64,
}

impl ManualClock {
    pub const fn new(ticks_per_sec: u64, perf_freq: u64) -> Self {
        Self {
            ticks: AtomicU64::new(0),
            perf: AtomicU64::new(0),
            ticks_per_sec,
            perf_freq,
        }
    }

    pub fn advance_ticks(&self, ticks: u64) {
        self.ticks.fetch_add(ticks, Ordering::Relaxed);
    }

    pub fn advance_perf(&self, cycles: u64) {
        self.perf.fetch_add(cycles, Ordering::Relaxed);
    }

    /// Moves both counters forward by `dur`.
    pub fn advance(&self, dur: Duration) {
        let ns = dur.as_nanos();
        let ticks = ns * self.ticks_per_sec as u128 / NSEC_PER_SEC as u128;
        let cycles = ns * self.perf_freq as u128 / NSEC_PER_SEC as u128;
        self.advance_ticks(ticks as u64);
        self.advance_perf(cycles as u64);
    }
}

impl IrqClock for ManualClock {
    fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    fn ticks_per_sec(&self) -> u64 {
        self.ticks_per_sec
    }

    fn perf(&self) -> u64 {
        self.perf.load(Ordering::Relaxed)
    }

    fn perf_convert(&self, elapsed: u64) -> TimeSpec {
        TimeSpec::from_cycles(elapsed, self.perf_freq)
    }
}
