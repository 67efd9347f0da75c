use alloc::{boxed::Box, sync::Arc};
use core::{fmt::Write, ops::ControlFlow};

use async_trait::async_trait;
use config::vfs::OpenFlags;
use irq::{IrqEntry, IrqTable};
use mutex::SpinLock;
use systype::SysResult;
use vfs::file::{File, FileMeta};

use super::{HDR_FMT, IrqLine, LineBuf};
use crate::proc::util::proc_memcpy;

/// Per-open state of `/proc/irqs`.
///
/// Nothing of the report is kept between reads. Each read renders the whole
/// report again and skips the first `pos` bytes, so a report delivered over
/// several short reads is only coherent if the set of interrupts that fired
/// stays the same across those reads: an interrupt going idle (or waking up)
/// between two reads shifts the line boundaries under the saved position, and
/// the reader sees repeated or missing bytes.
pub(crate) struct IrqsSession {
    /// Bytes of the report still to be skipped in the current read.
    offset: usize,
    /// Bytes delivered by the current read.
    ncopied: usize,
    line: LineBuf,
}

impl IrqsSession {
    fn try_new() -> SysResult<Self> {
        Ok(Self {
            offset: 0,
            ncopied: 0,
            line: LineBuf::try_new()?,
        })
    }

    fn try_clone(&self) -> SysResult<Self> {
        Ok(Self {
            offset: self.offset,
            ncopied: self.ncopied,
            line: self.line.try_clone()?,
        })
    }

    /// Renders the report into `buf`, starting `pos` bytes into it.
    fn fill(&mut self, table: &IrqTable, buf: &mut [u8], pos: usize) -> usize {
        self.offset = pos;
        self.ncopied = 0;

        self.line.clear();
        let header = self.line.write_str(HDR_FMT);
        debug_assert!(header.is_ok(), "header longer than a report line");
        self.copy_line(buf);

        // Visiting an entry resets it, so don't start unless there is room
        // for at least part of its line.
        if self.ncopied < buf.len() {
            let flow = table.for_each(|irq, entry| self.visit(table, irq, entry, buf));
            if flow.is_break() {
                log::trace!("[IrqsSession::fill] buffer full after {} bytes", self.ncopied);
            }
        }
        self.ncopied
    }

    fn visit(
        &mut self,
        table: &IrqTable,
        irq: usize,
        entry: &IrqEntry,
        buf: &mut [u8],
    ) -> ControlFlow<()> {
        let Some(snap) = table.snapshot_and_reset(entry) else {
            return ControlFlow::Continue(());
        };
        let Some(line) = IrqLine::from_snapshot(irq, &snap, table.clock()) else {
            return ControlFlow::Continue(());
        };

        self.line.clear();
        if write!(self.line, "{line}").is_err() {
            log::error!("[IrqsSession::visit] irq {irq} line overflows scratch buffer");
            return ControlFlow::Continue(());
        }
        self.copy_line(buf);

        if self.ncopied < buf.len() {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    }

    fn copy_line(&mut self, buf: &mut [u8]) {
        let copied = proc_memcpy(
            self.line.as_bytes(),
            &mut buf[self.ncopied..],
            &mut self.offset,
        );
        self.ncopied += copied;
    }
}

pub struct IrqsFile {
    meta: FileMeta,
    table: Arc<IrqTable>,
    session: SpinLock<IrqsSession>,
}

impl IrqsFile {
    pub(crate) fn new(table: Arc<IrqTable>, flags: OpenFlags) -> SysResult<Self> {
        Ok(Self {
            meta: FileMeta::new(flags),
            table,
            session: SpinLock::new(IrqsSession::try_new()?),
        })
    }

    fn read_report(&self, buf: &mut [u8], pos: usize) -> usize {
        self.session.lock().fill(&self.table, buf, pos)
    }
}

#[async_trait]
impl File for IrqsFile {
    fn meta(&self) -> &FileMeta {
        &self.meta
    }

    async fn base_read(&self, buf: &mut [u8], pos: usize) -> SysResult<usize> {
        log::trace!("[IrqsFile::base_read] pos {pos} buf len {}", buf.len());
        Ok(self.read_report(buf, pos))
    }

    fn base_dup(&self) -> SysResult<Arc<dyn File>> {
        let session = self.session.lock().try_clone().inspect_err(|_| {
            log::error!("[IrqsFile::base_dup] failed to allocate session");
        })?;
        log::debug!("[IrqsFile::base_dup] pos {}", self.pos());
        Ok(Arc::new(Self {
            meta: self.meta.duplicate(),
            table: self.table.clone(),
            session: SpinLock::new(session),
        }))
    }
}

impl Drop for IrqsFile {
    fn drop(&mut self) {
        log::debug!("[IrqsFile::close] pos {}", self.pos());
    }
}
