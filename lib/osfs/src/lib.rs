#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod proc;

use systype::{SysError, SysResult};

pub use proc::fs::PROC_FS;

/// Mounts the generated files of procfs on [`PROC_FS`]. The global interrupt
/// table must already be built.
pub fn init() -> SysResult<()> {
    let table = irq::irq_table().ok_or(SysError::ENODEV)?;
    proc::init_procfs(&PROC_FS, table)
}
