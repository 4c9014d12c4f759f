//! Simulated memory: page tables and the physical frame table.
//!
//! The replacement policies never own page-table entries or frames. They
//! reach them through [`MemoryView`], keyed by `(ProcessId, PageNumber)` and
//! [`FrameId`].
//!
//! # Components
//! - [`PageTableEntry`] / [`PageTable`] - Per-process mappings and bits
//! - [`PhysicalFrame`] / [`FrameTable`] - Frame owners and aging counters
//! - [`SystemMemory`] - All page tables plus the frame table

mod frame_table;
mod page_table;

pub use frame_table::{FrameTable, PhysicalFrame};
pub use page_table::{PageTable, PageTableEntry};

use crate::common::{Error, FrameId, PageNumber, ProcessId, Result};

/// Accessor the policies use to reach authoritative memory state.
pub trait MemoryView {
    /// The page-table entry for `page` of process `pid`.
    fn page_entry(&self, pid: ProcessId, page: PageNumber) -> Option<&PageTableEntry>;

    /// A physical frame.
    fn frame(&self, frame_id: FrameId) -> Option<&PhysicalFrame>;
}

/// Page tables for a fixed set of processes plus the frame table.
///
/// Process ids are dense: process `n` owns `page_tables[n]`.
#[derive(Debug)]
pub struct SystemMemory {
    frames: FrameTable,
    page_tables: Vec<PageTable>,
}

impl SystemMemory {
    /// Create `frame_count` free frames and `process_count` empty page tables
    /// of `pages_per_process` entries each.
    pub fn new(frame_count: usize, process_count: usize, pages_per_process: usize) -> Self {
        Self {
            frames: FrameTable::new(frame_count),
            page_tables: (0..process_count)
                .map(|_| PageTable::new(pages_per_process))
                .collect(),
        }
    }

    /// The frame table.
    #[inline]
    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    /// The page table of `pid`.
    #[inline]
    pub fn page_table(&self, pid: ProcessId) -> Option<&PageTable> {
        self.page_tables.get(pid.index())
    }

    /// Resolve an entry, distinguishing an unknown process from a bad page.
    pub fn entry_checked(&self, pid: ProcessId, page: PageNumber) -> Result<&PageTableEntry> {
        let table = self.page_table(pid).ok_or(Error::UnknownProcess(pid))?;
        table.entry(page).ok_or(Error::PageOutOfRange { pid, page })
    }

    /// Map `page` of `pid` into `frame_id`, claiming the frame.
    ///
    /// The frame's aging counter restarts from zero.
    pub fn map(&self, pid: ProcessId, page: PageNumber, frame_id: FrameId) -> Result<()> {
        let entry = self.entry_checked(pid, page)?;
        let frame = self.frames.frame(frame_id).ok_or(Error::UnknownFrame(frame_id))?;

        frame.reset();
        frame.set_owner(Some((pid, page)));
        entry.map(frame_id);
        Ok(())
    }

    /// Invalidate the mapping of `page` and free its frame.
    ///
    /// Returns the freed frame, or None if the page was not resident.
    pub fn unmap(&self, pid: ProcessId, page: PageNumber) -> Result<Option<FrameId>> {
        let entry = self.entry_checked(pid, page)?;
        let freed = entry.unmap();
        if let Some(frame_id) = freed {
            let frame = self.frames.frame(frame_id).ok_or(Error::UnknownFrame(frame_id))?;
            frame.reset();
        }
        Ok(freed)
    }
}

impl MemoryView for SystemMemory {
    fn page_entry(&self, pid: ProcessId, page: PageNumber) -> Option<&PageTableEntry> {
        self.page_table(pid)?.entry(page)
    }

    fn frame(&self, frame_id: FrameId) -> Option<&PhysicalFrame> {
        self.frames.frame(frame_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: u32) -> ProcessId {
        ProcessId::new(n)
    }

    fn page(n: u32) -> PageNumber {
        PageNumber::new(n)
    }

    #[test]
    fn test_map_claims_frame() {
        let mem = SystemMemory::new(2, 2, 4);
        mem.frames().frame(FrameId::new(1)).unwrap().set_age(7);

        mem.map(pid(1), page(2), FrameId::new(1)).unwrap();

        let entry = mem.page_entry(pid(1), page(2)).unwrap();
        assert_eq!(entry.frame(), Some(FrameId::new(1)));

        let frame = mem.frame(FrameId::new(1)).unwrap();
        assert_eq!(frame.owner(), Some((pid(1), page(2))));
        assert_eq!(frame.age(), 0);
    }

    #[test]
    fn test_unmap_frees_frame() {
        let mem = SystemMemory::new(2, 1, 4);
        mem.map(pid(0), page(0), FrameId::new(0)).unwrap();

        assert_eq!(mem.unmap(pid(0), page(0)).unwrap(), Some(FrameId::new(0)));
        assert!(mem.frame(FrameId::new(0)).unwrap().is_free());
        assert_eq!(mem.unmap(pid(0), page(0)).unwrap(), None);
    }

    #[test]
    fn test_lookup_errors() {
        let mem = SystemMemory::new(1, 1, 4);

        assert_eq!(
            mem.entry_checked(pid(5), page(0)).unwrap_err(),
            Error::UnknownProcess(pid(5))
        );
        assert_eq!(
            mem.entry_checked(pid(0), page(4)).unwrap_err(),
            Error::PageOutOfRange { pid: pid(0), page: page(4) }
        );
        assert_eq!(
            mem.map(pid(0), page(0), FrameId::new(3)).unwrap_err(),
            Error::UnknownFrame(FrameId::new(3))
        );
    }
}
