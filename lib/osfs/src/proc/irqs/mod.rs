//! `/proc/irqs`: per-interrupt activity since the previous read.
//!
//! ```text
//! IRQ HANDLER  ARGUMENT    COUNT    RATE    TIME
//! DDD XXXXXXXX XXXXXXXX DDDDDDDDDD DDDD.DDD DDDD
//! ```
//!
//! Reading an entry restarts its measurement window, so every read reports
//! the activity since the previous one. Lines are only produced for
//! interrupts that fired at least once in their window.

use alloc::vec::Vec;
use core::fmt::{self, Write};

use irq::{IrqClock, IrqSnapshot};
use systype::{SysError, SysResult};

pub mod file;
pub mod inode;

pub const HDR_FMT: &str = "IRQ HANDLER  ARGUMENT    COUNT    RATE    TIME\n";

/// Largest rate shown; faster interrupts print as `9999.999`.
pub const RATE_INT_MAX: u64 = 9999;
pub const RATE_FRAC_MAX: u64 = 999;

/// Largest count the ten-column COUNT field can hold.
pub const COUNT_MAX: u64 = u32::MAX as u64;

const fn dec_digits(mut v: u64) -> usize {
    let mut n = 1;
    while v >= 10 {
        v /= 10;
        n += 1;
    }
    n
}

const fn max(a: usize, b: usize) -> usize {
    if a > b { a } else { b }
}

/// Handler and argument print as at least eight hex digits.
const ADDR_WIDTH: usize = max(8, (usize::BITS / 4) as usize);

/// Longest line the formatter can produce on this target, newline included.
pub const IRQ_LINELEN: usize = max(3, dec_digits(usize::MAX as u64))
    + 1
    + ADDR_WIDTH
    + 1
    + ADDR_WIDTH
    + 1
    + 10
    + 1
    + 4
    + 1
    + 3
    + 1
    + dec_digits(999_999)
    + 1;

/// One rendered row of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqLine {
    pub irq: usize,
    pub handler: usize,
    pub arg: usize,
    pub count: u64,
    pub rate_int: u64,
    pub rate_frac: u64,
    /// Sub-second part of the average service time, in microseconds.
    pub micros: usize,
}

impl IrqLine {
    /// Computes the row for a snapshot, or `None` if the interrupt did not
    /// fire during the window.
    pub fn from_snapshot(irq: usize, snap: &IrqSnapshot, clock: &dyn IrqClock) -> Option<Self> {
        if snap.count == 0 {
            return None;
        }
        let elapsed = snap.now.saturating_sub(snap.start).max(1);
        let (rate_int, rate_frac) = rate(snap.count, clock.ticks_per_sec(), elapsed);
        let average = clock.perf_convert(snap.time / snap.count);
        Some(Self {
            irq,
            handler: snap.handler,
            arg: snap.arg,
            count: snap.count.min(COUNT_MAX),
            rate_int,
            rate_frac,
            micros: average.subsec_micros(),
        })
    }
}

/// `count` events over `elapsed` ticks as events per second, split into an
/// integer part and thousandths.
fn rate(count: u64, ticks_per_sec: u64, elapsed: u64) -> (u64, u64) {
    let scaled = count as u128 * ticks_per_sec as u128;
    let elapsed = elapsed as u128;
    let int = scaled / elapsed;
    if int > RATE_INT_MAX as u128 {
        return (RATE_INT_MAX, RATE_FRAC_MAX);
    }
    let frac = (scaled - int * elapsed) * 1000 / elapsed;
    (int as u64, frac as u64)
}

impl fmt::Display for IrqLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:3} {:08x} {:08x} {:10} {:4}.{:03} {:4}",
            self.irq,
            self.handler,
            self.arg,
            self.count,
            self.rate_int,
            self.rate_frac,
            self.micros
        )
    }
}

/// Fixed-capacity scratch line. Space is reserved once when the session is
/// opened; writes beyond [`IRQ_LINELEN`] fail instead of growing it.
pub(crate) struct LineBuf(Vec<u8>);

impl LineBuf {
    pub fn try_new() -> SysResult<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(IRQ_LINELEN)
            .map_err(|_| SysError::ENOMEM)?;
        Ok(Self(buf))
    }

    pub fn try_clone(&self) -> SysResult<Self> {
        let mut copy = Self::try_new()?;
        copy.0.extend_from_slice(&self.0);
        Ok(copy)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Write for LineBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.0.len() + s.len() > IRQ_LINELEN {
            return Err(fmt::Error);
        }
        self.0.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use core::fmt::Write;

    use irq::{IrqSnapshot, ManualClock};

    use super::{COUNT_MAX, HDR_FMT, IRQ_LINELEN, IrqLine, LineBuf};

    /// 100 Hz ticks, 1 MHz performance counter.
    fn clock() -> ManualClock {
        ManualClock::new(100, 1_000_000)
    }

    fn snap(count: u64, time: u64, window: u64) -> IrqSnapshot {
        IrqSnapshot {
            handler: 0x0800_1000,
            arg: 0,
            count,
            time,
            start: 1000,
            now: 1000 + window,
        }
    }

    #[test]
    fn one_second_window() {
        let line = IrqLine::from_snapshot(5, &snap(120, 120 * 250, 100), &clock()).unwrap();
        assert_eq!(
            line.to_string(),
            "  5 08001000 00000000        120  120.000  250\n"
        );
        assert_eq!(line.to_string().len(), 47);
    }

    #[test]
    fn idle_interrupt_has_no_line() {
        assert_eq!(IrqLine::from_snapshot(1, &snap(0, 0, 100), &clock()), None);
    }

    #[test]
    fn fractional_rate() {
        let line = IrqLine::from_snapshot(12, &snap(1, 3, 300), &clock()).unwrap();
        assert_eq!((line.rate_int, line.rate_frac), (0, 333));
        assert!(line.to_string().contains("    0.333    3\n"));
    }

    #[test]
    fn rate_saturates() {
        let line = IrqLine::from_snapshot(3, &snap(1_000_000, 0, 1), &clock()).unwrap();
        assert_eq!(
            line.to_string(),
            "  3 08001000 00000000    1000000 9999.999    0\n"
        );
        // 10000/s exactly is already out of range.
        let line = IrqLine::from_snapshot(3, &snap(10_000, 0, 100), &clock()).unwrap();
        assert_eq!((line.rate_int, line.rate_frac), (9999, 999));
        let line = IrqLine::from_snapshot(3, &snap(9_999, 0, 100), &clock()).unwrap();
        assert_eq!((line.rate_int, line.rate_frac), (9999, 0));
    }

    #[test]
    fn empty_window_counts_as_one_tick() {
        let line = IrqLine::from_snapshot(3, &snap(2, 0, 0), &clock()).unwrap();
        assert_eq!((line.rate_int, line.rate_frac), (200, 0));
    }

    #[test]
    fn count_saturates() {
        let line = IrqLine::from_snapshot(7, &snap(COUNT_MAX + 5, 0, u64::MAX / 2), &clock())
            .unwrap();
        assert_eq!(line.count, COUNT_MAX);
        assert!(line.to_string().contains(" 4294967295 "));
    }

    #[test]
    fn time_column_keeps_sub_second_part() {
        // 1.5 s per invocation shows as 500000 us.
        let line = IrqLine::from_snapshot(9, &snap(2, 3_000_000, 100), &clock()).unwrap();
        assert_eq!(line.micros, 500_000);
        assert!(line.to_string().ends_with(" 500000\n"));
    }

    #[test]
    fn widest_line_fits_scratch_buffer() {
        let line = IrqLine {
            irq: usize::MAX,
            handler: usize::MAX,
            arg: usize::MAX,
            count: COUNT_MAX,
            rate_int: 9999,
            rate_frac: 999,
            micros: 999_999,
        };
        let mut buf = LineBuf::try_new().unwrap();
        write!(buf, "{line}").unwrap();
        assert_eq!(buf.as_bytes().len(), IRQ_LINELEN);
        assert!(write!(buf, "x").is_err());

        buf.clear();
        buf.write_str(HDR_FMT).unwrap();
        let copy = buf.try_clone().unwrap();
        assert_eq!(copy.as_bytes(), HDR_FMT.as_bytes());
    }
}
