use alloc::sync::Arc;

use config::{inode::InodeMode, vfs::OpenFlags};
use irq::IrqTable;
use systype::{SysError, SysResult};
use vfs::{
    file::File,
    inode::{Inode, InodeMeta},
};

use super::file::IrqsFile;

pub struct IrqsInode {
    meta: InodeMeta,
    table: Arc<IrqTable>,
}

impl IrqsInode {
    pub fn new(table: Arc<IrqTable>) -> Arc<Self> {
        Arc::new(Self {
            meta: InodeMeta::new(InodeMode::READONLY_FILE),
            table,
        })
    }
}

impl Inode for IrqsInode {
    fn get_meta(&self) -> &InodeMeta {
        &self.meta
    }

    /// The file is read-only; any write intent is refused before a session
    /// is allocated.
    fn open(&self, flags: OpenFlags) -> SysResult<Arc<dyn File>> {
        if flags.writable() || !flags.readable() {
            log::warn!("[IrqsInode::open] only O_RDONLY supported, got {flags:?}");
            return Err(SysError::EACCES);
        }
        let file = IrqsFile::new(self.table.clone(), flags).inspect_err(|_| {
            log::error!("[IrqsInode::open] failed to allocate session");
        })?;
        log::debug!("[IrqsInode::open] ok");
        Ok(Arc::new(file))
    }
}
