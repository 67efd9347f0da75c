//! Spin locks for the kernel libraries.
//!
//! [`SpinNoIrqLock`] masks local interrupts for as long as the guard lives, so
//! data shared with interrupt handlers can be read and reset as one unit.

#![cfg_attr(not(test), no_std)]

mod mutex;

pub use mutex::{MutexSupport, SieGuard, Spin, SpinLock, SpinNoIrq, SpinNoIrqLock, spin_mutex};
