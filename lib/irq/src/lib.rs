//! Interrupt vector bookkeeping.
//!
//! Every interrupt line owns an [`IrqEntry`] holding the attached handler and
//! the activity accumulated since the entry was last sampled: invocation
//! count, busy time and the tick at which the measurement window started.
//! Interrupt delivery adds to the accumulators through
//! [`IrqTable::dispatch`]; readers sample them with
//! [`IrqTable::snapshot_and_reset`], which copies and restarts the window in
//! one interrupts-masked critical section.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod clock;
pub mod table;

use alloc::sync::Arc;

use config::irq::NR_IRQS;
use spin::Once;

pub use clock::{IrqClock, ManualClock};
pub use table::{IrqAction, IrqEntry, IrqSnapshot, IrqTable};

static IRQ_TABLE: Once<Arc<IrqTable>> = Once::new();

/// Builds the global interrupt table with [`NR_IRQS`] lines. Later calls
/// return the table built by the first one.
pub fn init(clock: Arc<dyn IrqClock>) -> Arc<IrqTable> {
    IRQ_TABLE
        .call_once(|| {
            log::info!("[irq::init] {} interrupt lines", NR_IRQS);
            Arc::new(IrqTable::new(NR_IRQS, clock))
        })
        .clone()
}

/// The global interrupt table, if [`init`] has run.
pub fn irq_table() -> Option<Arc<IrqTable>> {
    IRQ_TABLE.get().cloned()
}
