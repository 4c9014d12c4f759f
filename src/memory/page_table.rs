//! Page-table entries and per-process page tables.
//!
//! A [`PageTableEntry`] carries the bits the replacement policies read and
//! reset: the reference bit and the frame index. Entries are shared between
//! the access path (which sets bits) and the policy sweep (which clears them),
//! so every field is atomic.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::common::{FrameId, PageNumber};

/// One virtual-to-physical mapping.
///
/// # Thread Safety
/// - `valid` uses Acquire/Release so a reader that sees a mapping also sees
///   its frame index.
/// - `referenced` and `dirty` use `Relaxed`. A sweep may see a concurrent
///   reference one sweep late; the policies tolerate that.
#[derive(Debug)]
pub struct PageTableEntry {
    /// Frame backing this page. Meaningless unless `valid` is set.
    frame: AtomicUsize,

    /// Whether the page is resident.
    valid: AtomicBool,

    /// Set on every access, cleared by replacement sweeps.
    referenced: AtomicBool,

    /// Set on write access, cleared on write-back.
    dirty: AtomicBool,
}

impl PageTableEntry {
    /// Create an unmapped entry with all bits clear.
    pub fn new() -> Self {
        Self {
            frame: AtomicUsize::new(0),
            valid: AtomicBool::new(false),
            referenced: AtomicBool::new(false),
            dirty: AtomicBool::new(false),
        }
    }

    // ========================================================================
    // Mapping
    // ========================================================================

    /// Map this page to `frame`.
    ///
    /// The mapping starts clean and unreferenced. Bits left over from an
    /// earlier residency, or set by a hit that raced the eviction, are dropped
    /// before the mapping becomes visible.
    pub fn map(&self, frame: FrameId) {
        self.referenced.store(false, Ordering::Relaxed);
        self.dirty.store(false, Ordering::Relaxed);
        self.frame.store(frame.0, Ordering::Relaxed);
        self.valid.store(true, Ordering::Release);
    }

    /// Invalidate the mapping. Returns the frame it held, if any.
    pub fn unmap(&self) -> Option<FrameId> {
        if self.valid.swap(false, Ordering::AcqRel) {
            Some(FrameId::new(self.frame.load(Ordering::Relaxed)))
        } else {
            None
        }
    }

    /// Check if the page is resident.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    /// The frame backing this page, or None if unmapped.
    #[inline]
    pub fn frame(&self) -> Option<FrameId> {
        if self.is_valid() {
            Some(FrameId::new(self.frame.load(Ordering::Relaxed)))
        } else {
            None
        }
    }

    // ========================================================================
    // Reference bit
    // ========================================================================

    /// Record an access (sets the reference bit).
    #[inline]
    pub fn touch(&self) {
        self.referenced.store(true, Ordering::Relaxed);
    }

    /// Check the reference bit.
    #[inline]
    pub fn is_referenced(&self) -> bool {
        self.referenced.load(Ordering::Relaxed)
    }

    /// Clear the reference bit.
    #[inline]
    pub fn clear_referenced(&self) {
        self.referenced.store(false, Ordering::Relaxed);
    }

    /// Clear the reference bit, returning whether it was set.
    #[inline]
    pub fn take_referenced(&self) -> bool {
        self.referenced.swap(false, Ordering::Relaxed)
    }

    // ========================================================================
    // Dirty bit
    // ========================================================================

    /// Mark the page as modified.
    #[inline]
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Relaxed);
    }

    /// Clear the dirty bit, returning whether it was set.
    #[inline]
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::Relaxed)
    }

    /// Check the dirty bit.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }
}

impl Default for PageTableEntry {
    fn default() -> Self {
        Self::new()
    }
}

/// The page table of one process: one entry per virtual page.
#[derive(Debug)]
pub struct PageTable {
    entries: Vec<PageTableEntry>,
}

impl PageTable {
    /// Create a page table with `pages` unmapped entries.
    pub fn new(pages: usize) -> Self {
        Self {
            entries: (0..pages).map(|_| PageTableEntry::new()).collect(),
        }
    }

    /// Look up the entry for `page`.
    #[inline]
    pub fn entry(&self, page: PageNumber) -> Option<&PageTableEntry> {
        self.entries.get(page.index())
    }

    /// Number of virtual pages.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the address space has no pages.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pages currently mapped to a frame.
    pub fn resident_pages(&self) -> impl Iterator<Item = PageNumber> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_valid())
            .map(|(i, _)| PageNumber::new(i as u32))
    }
}
