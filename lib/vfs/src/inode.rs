use alloc::sync::Arc;

use config::{
    inode::{InodeMode, InodeType},
    vfs::OpenFlags,
};
use systype::SysResult;

use crate::{file::File, inoid::alloc_ino, stat::Stat};

pub struct InodeMeta {
    pub ino: usize,
    pub mode: InodeMode,
}

impl InodeMeta {
    pub fn new(mode: InodeMode) -> Self {
        Self {
            ino: alloc_ino(),
            mode,
        }
    }
}

/// A node that can be opened. Generated files build a fresh [`File`] for
/// every `open`, so each open instance carries its own state.
pub trait Inode: Send + Sync {
    fn get_meta(&self) -> &InodeMeta;

    fn open(&self, flags: OpenFlags) -> SysResult<Arc<dyn File>>;

    fn get_attr(&self) -> SysResult<Stat> {
        let meta = self.get_meta();
        Ok(Stat {
            st_ino: meta.ino as u64,
            st_mode: meta.mode.bits(),
            st_nlink: 1,
            st_blksize: 512,
            ..Stat::default()
        })
    }
}

impl dyn Inode {
    pub fn ino(&self) -> usize {
        self.get_meta().ino
    }

    pub fn inotype(&self) -> InodeType {
        self.get_meta().mode.to_type()
    }
}
