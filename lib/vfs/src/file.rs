use alloc::{boxed::Box, sync::Arc};
use core::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use config::vfs::{OpenFlags, SeekFrom};
use mutex::SpinNoIrqLock;
use systype::{SysError, SysResult, SyscallResult};

pub struct FileMeta {
    pub pos: AtomicUsize,
    pub flags: SpinNoIrqLock<OpenFlags>,
}

impl FileMeta {
    pub fn new(flags: OpenFlags) -> Self {
        Self {
            pos: AtomicUsize::new(0),
            flags: SpinNoIrqLock::new(flags),
        }
    }

    /// A copy carrying the same position and flags, for `dup`.
    pub fn duplicate(&self) -> Self {
        Self {
            pos: AtomicUsize::new(self.pos.load(Ordering::Relaxed)),
            flags: SpinNoIrqLock::new(*self.flags.lock()),
        }
    }
}

#[async_trait]
pub trait File: Send + Sync {
    fn meta(&self) -> &FileMeta;

    /// Reads at byte offset `pos` of the file into `buf`. Does not move the
    /// file position.
    async fn base_read(&self, buf: &mut [u8], pos: usize) -> SysResult<usize>;

    async fn base_write(&self, _buf: &[u8], _pos: usize) -> SysResult<usize> {
        Err(SysError::EBADF)
    }

    /// Packs directory records into `buf` for getdents(2), returning the
    /// bytes used.
    fn base_read_dir(&self, _buf: &mut [u8]) -> SysResult<usize> {
        Err(SysError::ENOTDIR)
    }

    /// Builds an independent open instance with a copy of this one's state.
    fn base_dup(&self) -> SysResult<Arc<dyn File>>;

    fn pos(&self) -> usize {
        self.meta().pos.load(Ordering::Relaxed)
    }

    fn set_pos(&self, pos: usize) {
        self.meta().pos.store(pos, Ordering::Relaxed)
    }

    /// Called when the VFS needs to move the file position index.
    ///
    /// Return the result offset. Generated files have no size, so seeking
    /// from the end is refused.
    fn seek(&self, pos: SeekFrom) -> SyscallResult {
        let res_pos = match pos {
            SeekFrom::Start(off) => off as usize,
            SeekFrom::Current(off) => {
                let cur = self.pos() as i64;
                let new = cur.checked_add(off).ok_or(SysError::EINVAL)?;
                if new < 0 {
                    return Err(SysError::EINVAL);
                }
                new as usize
            }
            SeekFrom::End(_) => return Err(SysError::ESPIPE),
        };
        self.set_pos(res_pos);
        Ok(res_pos)
    }
}

impl dyn File {
    pub fn flags(&self) -> OpenFlags {
        *self.meta().flags.lock()
    }

    /// Read from the file position into `buf`. Advances the position by the
    /// number of bytes returned.
    pub async fn read(&self, buf: &mut [u8]) -> SysResult<usize> {
        let pos = self.pos();
        let count = self.base_read(buf, pos).await?;
        log::trace!("[File::read] pos {pos}, buf len {}, read {count}", buf.len());
        self.set_pos(pos + count);
        Ok(count)
    }

    pub async fn write(&self, buf: &[u8]) -> SysResult<usize> {
        if !self.flags().writable() {
            return Err(SysError::EBADF);
        }
        let pos = self.pos();
        let count = self.base_write(buf, pos).await?;
        self.set_pos(pos + count);
        Ok(count)
    }

    pub fn dup(&self) -> SysResult<Arc<dyn File>> {
        self.base_dup()
    }

    pub fn read_dir(&self, buf: &mut [u8]) -> SysResult<usize> {
        self.base_read_dir(buf)
    }
}
