use alloc::{sync::Arc, vec::Vec};
use core::ops::ControlFlow;

use mutex::SpinNoIrqLock;
use systype::{SysError, SysResult};

use crate::clock::IrqClock;

/// Identity of an attached handler. Both values are kept only to be shown;
/// they are never called or dereferenced through this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqAction {
    pub handler: usize,
    pub arg: usize,
}

#[derive(Debug, Default)]
struct IrqInfo {
    action: Option<IrqAction>,
    /// Invocations since `start`.
    count: u64,
    /// Busy time since `start`, in performance counter units.
    time: u64,
    /// Tick at which the current measurement window began.
    start: u64,
}

/// A copy of one entry taken by [`IrqTable::snapshot_and_reset`] or
/// [`IrqTable::peek`]. `now` is the tick read inside the same critical
/// section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqSnapshot {
    pub handler: usize,
    pub arg: usize,
    pub count: u64,
    pub time: u64,
    pub start: u64,
    pub now: u64,
}

pub struct IrqEntry {
    irq: usize,
    info: SpinNoIrqLock<IrqInfo>,
}

impl IrqEntry {
    fn new(irq: usize) -> Self {
        Self {
            irq,
            info: SpinNoIrqLock::new(IrqInfo::default()),
        }
    }

    pub fn irq(&self) -> usize {
        self.irq
    }

    pub fn is_attached(&self) -> bool {
        self.info.lock().action.is_some()
    }
}

pub struct IrqTable {
    entries: Vec<IrqEntry>,
    clock: Arc<dyn IrqClock>,
}

impl IrqTable {
    pub fn new(nr_irqs: usize, clock: Arc<dyn IrqClock>) -> Self {
        Self {
            entries: (0..nr_irqs).map(IrqEntry::new).collect(),
            clock,
        }
    }

    pub fn nr_irqs(&self) -> usize {
        self.entries.len()
    }

    pub fn clock(&self) -> &dyn IrqClock {
        self.clock.as_ref()
    }

    fn entry(&self, irq: usize) -> SysResult<&IrqEntry> {
        self.entries.get(irq).ok_or(SysError::EINVAL)
    }

    /// Attaches a handler to `irq` and starts a fresh measurement window.
    pub fn attach(&self, irq: usize, handler: usize, arg: usize) -> SysResult<()> {
        let entry = self.entry(irq)?;
        let mut info = entry.info.lock();
        if info.action.is_some() {
            return Err(SysError::EBUSY);
        }
        *info = IrqInfo {
            action: Some(IrqAction { handler, arg }),
            count: 0,
            time: 0,
            start: self.clock.ticks(),
        };
        drop(info);
        log::info!("[IrqTable::attach] irq {irq} handler {handler:#x} arg {arg:#x}");
        Ok(())
    }

    pub fn detach(&self, irq: usize) -> SysResult<()> {
        let entry = self.entry(irq)?;
        let action = entry.info.lock().action.take();
        match action {
            Some(_) => {
                log::info!("[IrqTable::detach] irq {irq}");
                Ok(())
            }
            None => Err(SysError::EINVAL),
        }
    }

    /// Runs `handler` for `irq` and charges one invocation plus the time it
    /// took to the entry.
    pub fn dispatch<F: FnOnce()>(&self, irq: usize, handler: F) -> SysResult<()> {
        let entry = self.entry(irq)?;
        if !entry.is_attached() {
            log::warn!("[IrqTable::dispatch] unexpected irq {irq}");
            return Err(SysError::EINVAL);
        }
        let begin = self.clock.perf();
        handler();
        let busy = self.clock.perf().wrapping_sub(begin);
        self.account(irq, busy)
    }

    /// Adds one invocation that kept the CPU busy for `busy` performance
    /// counter units.
    pub fn account(&self, irq: usize, busy: u64) -> SysResult<()> {
        let entry = self.entry(irq)?;
        let mut info = entry.info.lock();
        if info.action.is_none() {
            return Err(SysError::EINVAL);
        }
        info.count = info.count.saturating_add(1);
        info.time = info.time.saturating_add(busy);
        Ok(())
    }

    /// Visits attached entries in ascending IRQ order until `visit` breaks.
    ///
    /// No lock is held while `visit` runs.
    pub fn for_each<F>(&self, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(usize, &IrqEntry) -> ControlFlow<()>,
    {
        for entry in self.entries.iter().filter(|e| e.is_attached()) {
            visit(entry.irq, entry)?;
        }
        ControlFlow::Continue(())
    }

    /// Copies the entry's accumulators and restarts its measurement window,
    /// as one critical section. Returns `None` if the handler was detached
    /// in the meantime.
    pub fn snapshot_and_reset(&self, entry: &IrqEntry) -> Option<IrqSnapshot> {
        let mut info = entry.info.lock();
        let action = info.action?;
        let now = self.clock.ticks();
        let snapshot = IrqSnapshot {
            handler: action.handler,
            arg: action.arg,
            count: info.count,
            time: info.time,
            start: info.start,
            now,
        };
        info.start = now;
        info.count = 0;
        info.time = 0;
        Some(snapshot)
    }

    /// Copies the accumulators of `irq` without resetting them.
    pub fn peek(&self, irq: usize) -> Option<IrqSnapshot> {
        let entry = self.entries.get(irq)?;
        let info = entry.info.lock();
        let action = info.action?;
        Some(IrqSnapshot {
            handler: action.handler,
            arg: action.arg,
            count: info.count,
            time: info.time,
            start: info.start,
            now: self.clock.ticks(),
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::{sync::Arc, vec::Vec};
    use core::ops::ControlFlow;
    use std::thread;

    use systype::SysError;

    use super::IrqTable;
    use crate::clock::{IrqClock, ManualClock};

    fn table(nr: usize) -> (Arc<ManualClock>, IrqTable) {
        let clock = Arc::new(ManualClock::new(100, 1_000_000));
        let table = IrqTable::new(nr, clock.clone());
        (clock, table)
    }

    #[test]
    fn attach_validates_line_and_occupancy() {
        let (_, table) = table(8);
        assert_eq!(table.attach(8, 0x1000, 0), Err(SysError::EINVAL));
        table.attach(3, 0x1000, 0x20).unwrap();
        assert_eq!(table.attach(3, 0x2000, 0), Err(SysError::EBUSY));
        table.detach(3).unwrap();
        assert_eq!(table.detach(3), Err(SysError::EINVAL));
        table.attach(3, 0x2000, 0).unwrap();
        assert_eq!(table.peek(3).unwrap().handler, 0x2000);
    }

    #[test]
    fn dispatch_counts_and_times_handler() {
        let (clock, table) = table(8);
        clock.advance_ticks(10);
        table.attach(2, 0x8000_1000, 0).unwrap();
        let mut ran = 0;
        for _ in 0..3 {
            table
                .dispatch(2, || {
                    ran += 1;
                    clock.advance_perf(40);
                })
                .unwrap();
        }
        assert_eq!(ran, 3);
        let snap = table.peek(2).unwrap();
        assert_eq!(snap.count, 3);
        assert_eq!(snap.time, 120);
        assert_eq!(snap.start, 10);
        assert_eq!(table.dispatch(5, || {}), Err(SysError::EINVAL));
    }

    #[test]
    fn for_each_visits_attached_in_order_and_stops() {
        let (_, table) = table(16);
        for irq in [9, 1, 4] {
            table.attach(irq, 0x100 + irq, 0).unwrap();
        }
        let mut seen = Vec::new();
        let flow = table.for_each(|irq, _| {
            seen.push(irq);
            ControlFlow::Continue(())
        });
        assert_eq!(flow, ControlFlow::Continue(()));
        assert_eq!(seen, [1, 4, 9]);

        seen.clear();
        let flow = table.for_each(|irq, _| {
            seen.push(irq);
            if irq == 4 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(flow, ControlFlow::Break(()));
        assert_eq!(seen, [1, 4]);
    }

    #[test]
    fn snapshot_resets_window_even_when_idle() {
        let (clock, table) = table(4);
        table.attach(1, 0x10, 0).unwrap();
        table.account(1, 5).unwrap();
        table.account(1, 7).unwrap();
        clock.advance_ticks(100);

        let mut snaps = Vec::new();
        let _ = table.for_each(|_, entry| {
            snaps.extend(table.snapshot_and_reset(entry));
            ControlFlow::Continue(())
        });
        assert_eq!(snaps.len(), 1);
        assert_eq!((snaps[0].count, snaps[0].time), (2, 12));
        assert_eq!((snaps[0].start, snaps[0].now), (0, 100));

        let after = table.peek(1).unwrap();
        assert_eq!((after.count, after.time, after.start), (0, 0, 100));

        clock.advance_ticks(50);
        let _ = table.for_each(|_, entry| {
            let snap = table.snapshot_and_reset(entry).unwrap();
            assert_eq!(snap.count, 0);
            ControlFlow::Continue(())
        });
        assert_eq!(table.peek(1).unwrap().start, 150);
    }

    #[test]
    fn concurrent_accounting_loses_nothing() {
        let clock = Arc::new(ManualClock::new(100, 1_000_000));
        let table = Arc::new(IrqTable::new(2, clock.clone()));
        table.attach(0, 0x40, 0).unwrap();
        const PER_THREAD: u64 = 20_000;

        let writers: Vec<_> = (0..3)
            .map(|_| {
                let table = table.clone();
                thread::spawn(move || {
                    for _ in 0..PER_THREAD {
                        table.account(0, 1).unwrap();
                    }
                })
            })
            .collect();

        let mut seen = 0u64;
        while !writers.iter().all(|w| w.is_finished()) {
            let _ = table.for_each(|_, entry| {
                let snap = table.snapshot_and_reset(entry).unwrap();
                assert_eq!(snap.count, snap.time);
                seen += snap.count;
                ControlFlow::Continue(())
            });
        }
        for w in writers {
            w.join().unwrap();
        }
        seen += table.peek(0).unwrap().count;
        assert_eq!(seen, 3 * PER_THREAD);
        assert_eq!(clock.ticks(), 0);
    }
}
