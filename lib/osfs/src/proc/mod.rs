use alloc::sync::Arc;

use irq::IrqTable;
use systype::SysResult;

use irqs::inode::IrqsInode;

pub mod fs;
pub mod irqs;
pub mod util;

pub fn init_procfs(procfs: &fs::ProcFs, table: Arc<IrqTable>) -> SysResult<()> {
    procfs.register("irqs", IrqsInode::new(table))?;
    log::info!("[init_procfs] add irqs");
    Ok(())
}
