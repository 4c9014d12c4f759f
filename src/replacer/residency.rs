//! The frame residency ring.
//!
//! A circular, doubly linked list of resident-page records. Records live in
//! an arena and link to each other by slot index, so unlinking is O(1) and
//! there are no ownership cycles.
//!
//! ```text
//!          head
//!           │
//!           ▼
//!   ┌──▶ [rec A] ──▶ [rec B] ──▶ [rec C] ──┐
//!   │                                        │
//!   └──────────────── next ◀─────────────────┘
//! ```
//!
//! New records go in at the tail (just before the head). The head is the
//! next candidate a sweep looks at.

use std::fmt;

use crate::common::{Error, PageNumber, ProcessId, Result};
use crate::memory::PageTableEntry;

/// Stable handle to a record in a [`ResidencyRing`].
///
/// Handles stay valid until the record is removed. A removed handle's slot
/// may be reused by a later insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(pub usize);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record({})", self.0)
    }
}

/// One page currently occupying a frame.
///
/// The page-table entry is named, not owned: `(pid, page)` is resolved
/// through a [`MemoryView`](crate::memory::MemoryView) whenever a policy
/// needs the entry's bits or frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    /// Owning process.
    pub pid: ProcessId,

    /// Page whose entry this record tracks.
    pub page: PageNumber,
}

#[derive(Debug)]
struct Slot {
    record: Record,
    next: usize,
    prev: usize,
}

/// Circular residency list backed by an index arena.
#[derive(Debug, Default)]
pub struct ResidencyRing {
    /// Arena of records. `None` marks a reclaimed slot.
    slots: Vec<Option<Slot>>,

    /// Reclaimed slot indices (LIFO).
    free_slots: Vec<usize>,

    /// Next candidate, or None if the ring is empty.
    head: Option<usize>,

    /// Number of live records.
    len: usize,
}

impl ResidencyRing {
    /// Create an empty ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every record and release the arena.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_slots.clear();
        self.head = None;
        self.len = 0;
    }

    // ========================================================================
    // Insertion and removal
    // ========================================================================

    /// Append a record at the tail and clear the entry's reference bit.
    ///
    /// If the ring was empty the new record becomes the head of a ring of
    /// size one.
    ///
    /// # Errors
    /// - `Error::AllocationFailed` if the arena cannot grow. Neither the ring
    ///   nor the entry is modified in that case.
    pub fn insert(
        &mut self,
        pid: ProcessId,
        page: PageNumber,
        entry: &PageTableEntry,
    ) -> Result<RecordId> {
        if self.free_slots.is_empty() {
            self.slots
                .try_reserve(1)
                .map_err(|_| Error::AllocationFailed)?;
        }

        entry.clear_referenced();

        let record = Record { pid, page };
        let index = match self.free_slots.pop() {
            Some(index) => index,
            None => {
                self.slots.push(None);
                self.slots.len() - 1
            }
        };

        let (next, prev) = match self.head {
            None => {
                self.head = Some(index);
                (index, index)
            }
            Some(head) => {
                let tail = self.slot(head).prev;
                self.slot_mut(tail).next = index;
                self.slot_mut(head).prev = index;
                (head, tail)
            }
        };

        self.slots[index] = Some(Slot { record, next, prev });
        self.len += 1;
        Ok(RecordId(index))
    }

    /// Unlink a record and reclaim its slot.
    ///
    /// If the record was the head, the head moves to its successor. Removing
    /// the last record leaves the ring empty.
    ///
    /// # Errors
    /// - `Error::UnknownRecord` if `id` is not a live record.
    pub fn remove(&mut self, id: RecordId) -> Result<Record> {
        let slot = self
            .slots
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(Error::UnknownRecord(id.0))?;

        if slot.next == id.0 {
            self.head = None;
        } else {
            self.slot_mut(slot.prev).next = slot.next;
            self.slot_mut(slot.next).prev = slot.prev;
            if self.head == Some(id.0) {
                self.head = Some(slot.next);
            }
        }

        self.free_slots.push(id.0);
        self.len -= 1;
        Ok(slot.record)
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// The next candidate record.
    #[inline]
    pub fn head(&self) -> Option<RecordId> {
        self.head.map(RecordId)
    }

    /// Move the head to `id`.
    pub fn set_head(&mut self, id: RecordId) -> Result<()> {
        if !self.contains(id) {
            return Err(Error::UnknownRecord(id.0));
        }
        self.head = Some(id.0);
        Ok(())
    }

    /// Successor of `id` in ring order.
    #[inline]
    pub fn next(&self, id: RecordId) -> Option<RecordId> {
        self.live(id.0).map(|slot| RecordId(slot.next))
    }

    /// Predecessor of `id` in ring order.
    #[inline]
    pub fn prev(&self, id: RecordId) -> Option<RecordId> {
        self.live(id.0).map(|slot| RecordId(slot.prev))
    }

    /// The record behind `id`.
    #[inline]
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.live(id.0).map(|slot| &slot.record)
    }

    /// Check if `id` names a live record.
    #[inline]
    pub fn contains(&self, id: RecordId) -> bool {
        self.live(id.0).is_some()
    }

    /// Number of live records.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the ring holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of arena slots, live or reclaimed.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Visit every record once, in ring order starting at the head.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            ring: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    // ========================================================================
    // Internal
    // ========================================================================

    #[inline]
    fn live(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    // Links always point at live slots, so these lookups cannot miss while
    // the ring is consistent.
    fn slot(&self, index: usize) -> &Slot {
        match self.live(index) {
            Some(slot) => slot,
            None => unreachable!("ring link to reclaimed slot {index}"),
        }
    }

    fn slot_mut(&mut self, index: usize) -> &mut Slot {
        match self.slots.get_mut(index).and_then(Option::as_mut) {
            Some(slot) => slot,
            None => unreachable!("ring link to reclaimed slot {index}"),
        }
    }
}

/// Iterator over a ring, one revolution from the head.
pub struct Iter<'a> {
    ring: &'a ResidencyRing,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (RecordId, &'a Record);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.cursor?;
        let slot = self.ring.live(index)?;
        self.cursor = Some(slot.next);
        self.remaining -= 1;
        Some((RecordId(index), &slot.record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pages(ring: &ResidencyRing) -> Vec<u32> {
        ring.iter().map(|(_, r)| r.page.0).collect()
    }

    fn insert_page(ring: &mut ResidencyRing, page: u32) -> RecordId {
        let entry = PageTableEntry::new();
        ring.insert(ProcessId::new(0), PageNumber::new(page), &entry)
            .unwrap()
    }

    /// Walk `next` from `start` and count steps until we come back.
    fn revolution_len(ring: &ResidencyRing, start: RecordId) -> usize {
        let mut steps = 1;
        let mut cursor = ring.next(start).unwrap();
        while cursor != start {
            cursor = ring.next(cursor).unwrap();
            steps += 1;
            assert!(steps <= ring.len(), "ring does not close");
        }
        steps
    }

    #[test]
    fn test_new_ring_is_empty() {
        let ring = ResidencyRing::new();
        assert!(ring.is_empty());
        assert_eq!(ring.head(), None);
        assert_eq!(ring.iter().count(), 0);
    }

    #[test]
    fn test_single_record_links_to_itself() {
        let mut ring = ResidencyRing::new();
        let id = insert_page(&mut ring, 1);

        assert_eq!(ring.head(), Some(id));
        assert_eq!(ring.next(id), Some(id));
        assert_eq!(ring.prev(id), Some(id));
    }

    #[test]
    fn test_insert_appends_at_tail() {
        let mut ring = ResidencyRing::new();
        let a = insert_page(&mut ring, 1);
        insert_page(&mut ring, 2);
        let c = insert_page(&mut ring, 3);

        assert_eq!(ring.head(), Some(a));
        assert_eq!(pages(&ring), vec![1, 2, 3]);
        assert_eq!(ring.prev(a), Some(c));
        assert_eq!(ring.next(c), Some(a));
    }

    #[test]
    fn test_insert_clears_reference_bit() {
        let mut ring = ResidencyRing::new();
        let entry = PageTableEntry::new();
        entry.touch();

        ring.insert(ProcessId::new(2), PageNumber::new(5), &entry)
            .unwrap();

        assert!(!entry.is_referenced());
    }

    #[test]
    fn test_remove_head_advances() {
        let mut ring = ResidencyRing::new();
        let a = insert_page(&mut ring, 1);
        let b = insert_page(&mut ring, 2);
        insert_page(&mut ring, 3);

        let removed = ring.remove(a).unwrap();
        assert_eq!(removed.page, PageNumber::new(1));
        assert_eq!(ring.head(), Some(b));
        assert_eq!(pages(&ring), vec![2, 3]);
    }

    #[test]
    fn test_remove_middle_repairs_links() {
        let mut ring = ResidencyRing::new();
        let a = insert_page(&mut ring, 1);
        let b = insert_page(&mut ring, 2);
        let c = insert_page(&mut ring, 3);

        ring.remove(b).unwrap();

        assert_eq!(ring.next(a), Some(c));
        assert_eq!(ring.prev(c), Some(a));
        assert_eq!(ring.head(), Some(a));
    }

    #[test]
    fn test_remove_last_empties_ring() {
        let mut ring = ResidencyRing::new();
        let a = insert_page(&mut ring, 1);

        ring.remove(a).unwrap();

        assert!(ring.is_empty());
        assert_eq!(ring.head(), None);
    }

    #[test]
    fn test_remove_stale_id_fails() {
        let mut ring = ResidencyRing::new();
        let a = insert_page(&mut ring, 1);
        ring.remove(a).unwrap();

        assert_eq!(ring.remove(a), Err(Error::UnknownRecord(a.0)));
        assert_eq!(ring.remove(RecordId(99)), Err(Error::UnknownRecord(99)));
    }

    #[test]
    fn test_removed_slot_is_reused() {
        let mut ring = ResidencyRing::new();
        insert_page(&mut ring, 1);
        let b = insert_page(&mut ring, 2);
        insert_page(&mut ring, 3);

        ring.remove(b).unwrap();
        let d = insert_page(&mut ring, 4);

        assert_eq!(d, b);
        assert_eq!(ring.capacity(), 3);
        assert_eq!(pages(&ring), vec![1, 3, 4]);
    }

    #[test]
    fn test_set_head() {
        let mut ring = ResidencyRing::new();
        insert_page(&mut ring, 1);
        let b = insert_page(&mut ring, 2);
        insert_page(&mut ring, 3);

        ring.set_head(b).unwrap();
        assert_eq!(pages(&ring), vec![2, 3, 1]);
        assert!(ring.set_head(RecordId(10)).is_err());
    }

    #[test]
    fn test_clear() {
        let mut ring = ResidencyRing::new();
        insert_page(&mut ring, 1);
        insert_page(&mut ring, 2);

        ring.clear();

        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 0);
    }

    proptest! {
        #[test]
        fn prop_inserts_form_closed_ring(n in 1usize..64) {
            let mut ring = ResidencyRing::new();
            let ids: Vec<_> = (0..n).map(|i| insert_page(&mut ring, i as u32)).collect();

            prop_assert_eq!(ring.len(), n);
            for &id in &ids {
                prop_assert_eq!(revolution_len(&ring, id), n);
            }
        }

        #[test]
        fn prop_removals_keep_ring_closed(
            n in 2usize..48,
            removals in proptest::collection::vec(any::<prop::sample::Index>(), 1..24),
        ) {
            let mut ring = ResidencyRing::new();
            let mut live: Vec<_> = (0..n).map(|i| insert_page(&mut ring, i as u32)).collect();

            for index in removals {
                if live.len() <= 1 {
                    break;
                }
                let id = live.remove(index.index(live.len()));
                ring.remove(id).unwrap();

                prop_assert_eq!(ring.len(), live.len());
                prop_assert!(!ring.contains(id));
                let head = ring.head().unwrap();
                prop_assert_eq!(revolution_len(&ring, head), live.len());
                for &other in &live {
                    prop_assert!(ring.contains(other));
                }
            }
        }
    }
}
