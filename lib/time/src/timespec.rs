use config::time::{NSEC_PER_SEC, NSEC_PER_USEC};

/// A span of time with nanosecond resolution, laid out as `struct timespec`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct TimeSpec {
    tv_sec: usize,
    tv_nsec: usize,
}

impl TimeSpec {
    /// Converts a count of a free-running counter at `freq` Hz into a
    /// `TimeSpec`. A zero frequency yields zero.
    pub fn from_cycles(cycles: u64, freq: u64) -> Self {
        if freq == 0 {
            return Self::default();
        }
        let sec = cycles / freq;
        let rem = (cycles % freq) as u128;
        let nsec = rem * NSEC_PER_SEC as u128 / freq as u128;
        Self {
            tv_sec: sec as usize,
            tv_nsec: nsec as usize,
        }
    }

    pub fn sec(&self) -> usize {
        self.tv_sec
    }

    pub fn nsec(&self) -> usize {
        self.tv_nsec
    }

    /// Microseconds within the current second, dropping whole seconds.
    pub fn subsec_micros(&self) -> usize {
        self.tv_nsec / NSEC_PER_USEC as usize
    }

    pub fn is_zero(&self) -> bool {
        self.tv_sec == 0 && self.tv_nsec == 0
    }
}

#[cfg(test)]
mod tests {
    use super::TimeSpec;

    #[test]
    fn cycles_at_one_megahertz() {
        let ts = TimeSpec::from_cycles(2_000_250, 1_000_000);
        assert_eq!(ts.sec(), 2);
        assert_eq!(ts.nsec(), 250_000);
        assert_eq!(ts.subsec_micros(), 250);
    }

    #[test]
    fn odd_frequency_rounds_down() {
        // One cycle of a 3 Hz counter.
        let ts = TimeSpec::from_cycles(1, 3);
        assert_eq!((ts.sec(), ts.nsec()), (0, 333_333_333));
        assert_eq!(ts.subsec_micros(), 333_333);
    }

    #[test]
    fn zero_frequency_is_zero() {
        assert!(TimeSpec::from_cycles(1234, 0).is_zero());
        assert!(TimeSpec::default().is_zero());
    }
}
