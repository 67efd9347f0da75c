use alloc::{collections::btree_map::BTreeMap, string::String, sync::Arc};

use config::vfs::OpenFlags;
use mutex::SpinNoIrqLock;
use systype::{SysError, SysResult};
use vfs::{file::File, inode::Inode, stat::Stat};

pub static PROC_FS: ProcFs = ProcFs::new();

/// Mount table of procfs: maps a path relative to the procfs root onto the
/// inode that serves it.
pub struct ProcFs {
    entries: SpinNoIrqLock<BTreeMap<String, Arc<dyn Inode>>>,
}

impl ProcFs {
    pub const fn new() -> Self {
        Self {
            entries: SpinNoIrqLock::new(BTreeMap::new()),
        }
    }

    pub fn register(&self, name: &str, inode: Arc<dyn Inode>) -> SysResult<()> {
        let mut entries = self.entries.lock();
        if entries.contains_key(name) {
            return Err(SysError::EEXIST);
        }
        entries.insert(String::from(name), inode);
        Ok(())
    }

    pub fn lookup(&self, relpath: &str) -> SysResult<Arc<dyn Inode>> {
        let name = relpath.trim_start_matches('/');
        self.entries
            .lock()
            .get(name)
            .cloned()
            .ok_or(SysError::ENOENT)
    }

    pub fn open(&self, relpath: &str, flags: OpenFlags) -> SysResult<Arc<dyn File>> {
        log::debug!("[ProcFs::open] '{relpath}' flags {flags:?}");
        self.lookup(relpath)?.open(flags)
    }

    pub fn stat(&self, relpath: &str) -> SysResult<Stat> {
        self.lookup(relpath)?.get_attr()
    }
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use config::{inode::InodeMode, vfs::OpenFlags};
    use irq::{IrqTable, ManualClock};
    use systype::SysError;

    use super::ProcFs;
    use crate::proc::{init_procfs, irqs::inode::IrqsInode};

    fn mounted() -> ProcFs {
        let clock = Arc::new(ManualClock::new(100, 1_000_000));
        let procfs = ProcFs::new();
        init_procfs(&procfs, Arc::new(IrqTable::new(8, clock))).unwrap();
        procfs
    }

    #[test]
    fn unknown_path_is_enoent() {
        let procfs = mounted();
        assert_eq!(procfs.open("nope", OpenFlags::O_RDONLY).err(), Some(SysError::ENOENT));
        assert_eq!(procfs.stat("/nope").err(), Some(SysError::ENOENT));
    }

    #[test]
    fn duplicate_registration_is_eexist() {
        let procfs = mounted();
        let clock = Arc::new(ManualClock::new(100, 1_000_000));
        let again = IrqsInode::new(Arc::new(IrqTable::new(1, clock)));
        assert_eq!(procfs.register("irqs", again), Err(SysError::EEXIST));
    }

    #[test]
    fn irqs_stat_is_readonly_regular_file() {
        let procfs = mounted();
        let stat = procfs.stat("irqs").unwrap();
        assert_eq!(stat.st_mode, InodeMode::READONLY_FILE.bits());
        assert_eq!(stat.st_size, 0);
        assert_eq!(stat.st_nlink, 1);
        assert!(procfs.lookup("/irqs").unwrap().inotype().is_reg());
    }
}
