//! Page replacement policies (replacers).
//!
//! Currently implements:
//! - [`LruApproxPolicy`] - Clock sweep with per-frame aging counters
//! - [`SecondChancePolicy`] - Classic clock over reference bits
//!
//! Both keep their own [`ResidencyRing`] and expose the same
//! `init` / `replace` / `update` contract through [`ReplacementPolicy`], so
//! the fault handler can swap them at runtime via [`PolicyKind`].

mod lru_approx;
mod residency;
mod second_chance;
mod shared;

use std::fmt;

use log::debug;

pub use lru_approx::LruApproxPolicy;
pub use residency::{Iter, Record, RecordId, ResidencyRing};
pub use second_chance::SecondChancePolicy;
pub use shared::SharedPolicy;

use crate::common::config::LruApproxConfig;
use crate::common::{Error, FrameId, PageNumber, ProcessId, Result};
use crate::memory::{MemoryView, PageTableEntry};

/// The page chosen for eviction.
///
/// The caller invalidates `(pid, page)` in its page table and reuses
/// `frame` for the incoming page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Victim {
    /// Process that owned the evicted page.
    pub pid: ProcessId,

    /// Frame the evicted page occupied, now free for reuse.
    pub frame: FrameId,

    /// Evicted page. Its entry must be invalidated by the caller.
    pub page: PageNumber,
}

impl fmt::Display for Victim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} in {}", self.pid, self.page, self.frame)
    }
}

/// Selects a replacement policy at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    /// LRU approximation with aging counters.
    LruApprox,

    /// Second chance (clock).
    SecondChance,
}

impl PolicyKind {
    /// Construct an empty policy of this kind.
    ///
    /// `lru` is only consulted for [`PolicyKind::LruApprox`].
    pub fn build(self, lru: LruApproxConfig) -> Result<Box<dyn ReplacementPolicy>> {
        let policy: Box<dyn ReplacementPolicy> = match self {
            PolicyKind::LruApprox => Box::new(LruApproxPolicy::with_config(lru)?),
            PolicyKind::SecondChance => Box::new(SecondChancePolicy::new()),
        };
        Ok(policy)
    }

    /// Short human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            PolicyKind::LruApprox => "lru-approx",
            PolicyKind::SecondChance => "second-chance",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which records an LRU-approximation sweep ages and considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SweepScope {
    /// Every record, head included, is aged and is a candidate.
    #[default]
    Full,

    /// The head is skipped: not aged, not a candidate. A ring holding only
    /// the head still evicts it.
    ExcludeHead,
}

/// Counters a policy keeps about its own decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyStats {
    /// Completed `replace` calls.
    pub evictions: u64,

    /// Records looked at across all sweeps.
    pub records_visited: u64,

    /// Reference bits found set and cleared during sweeps.
    pub references_cleared: u64,

    /// Records tracked through `update`.
    pub insertions: u64,
}

impl fmt::Display for PolicyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PolicyStats {{ evictions: {}, visited: {}, refs_cleared: {}, insertions: {} }}",
            self.evictions, self.records_visited, self.references_cleared, self.insertions
        )
    }
}

/// Contract shared by all replacement policies.
///
/// One policy instance serves one simulated memory. Callers must not run two
/// operations on the same instance concurrently; wrap it in a
/// [`SharedPolicy`] when several threads handle faults.
pub trait ReplacementPolicy: Send {
    /// Which policy this is.
    fn kind(&self) -> PolicyKind;

    /// Reset to an empty resident set.
    fn init(&mut self) -> Result<()>;

    /// Choose a resident page, evict it from the ring, and return it.
    ///
    /// # Errors
    /// - `Error::EmptyResidentSet` if nothing is resident
    /// - `Error::UnknownEntry` / `Error::EntryNotMapped` if a record's entry
    ///   can no longer be resolved to a frame
    fn replace(&mut self, mem: &dyn MemoryView) -> Result<Victim>;

    /// Start tracking a page that was just mapped to a frame.
    ///
    /// Clears the entry's reference bit.
    ///
    /// # Errors
    /// - `Error::UnknownEntry` if `(pid, page)` has no entry
    /// - `Error::EntryNotMapped` if the entry has no frame
    /// - `Error::AllocationFailed` if the record cannot be allocated
    fn update(&mut self, mem: &dyn MemoryView, pid: ProcessId, page: PageNumber) -> Result<()>;

    /// The policy's residency ring.
    fn ring(&self) -> &ResidencyRing;

    /// Decision counters.
    fn stats(&self) -> PolicyStats;

    /// Number of tracked resident pages.
    fn len(&self) -> usize {
        self.ring().len()
    }

    /// Check if no page is tracked.
    fn is_empty(&self) -> bool {
        self.ring().is_empty()
    }
}

// ============================================================================
// Shared mechanics
// ============================================================================

/// Resolve the entry a record points at.
pub(crate) fn resolve_entry<'m>(
    mem: &'m dyn MemoryView,
    record: &Record,
) -> Result<&'m PageTableEntry> {
    mem.page_entry(record.pid, record.page)
        .ok_or(Error::UnknownEntry {
            pid: record.pid,
            page: record.page,
        })
}

/// Resolve the frame a record's entry is mapped to.
pub(crate) fn resolve_frame(mem: &dyn MemoryView, record: &Record) -> Result<FrameId> {
    resolve_entry(mem, record)?
        .frame()
        .ok_or(Error::EntryNotMapped {
            pid: record.pid,
            page: record.page,
        })
}

/// Insert a freshly mapped page at the tail of `ring`.
pub(crate) fn track(
    ring: &mut ResidencyRing,
    mem: &dyn MemoryView,
    pid: ProcessId,
    page: PageNumber,
) -> Result<RecordId> {
    let entry = mem
        .page_entry(pid, page)
        .ok_or(Error::UnknownEntry { pid, page })?;
    if !entry.is_valid() {
        return Err(Error::EntryNotMapped { pid, page });
    }
    ring.insert(pid, page, entry)
}

/// Unlink the chosen record and move the head past it.
///
/// The frame is resolved before anything is unlinked, so a failure leaves
/// the ring intact.
pub(crate) fn evict(
    ring: &mut ResidencyRing,
    mem: &dyn MemoryView,
    id: RecordId,
) -> Result<Victim> {
    let record = *ring.get(id).ok_or(Error::UnknownRecord(id.0))?;
    let frame = resolve_frame(mem, &record)?;
    let successor = ring.next(id).ok_or(Error::UnknownRecord(id.0))?;

    ring.remove(id)?;
    if !ring.is_empty() {
        ring.set_head(successor)?;
    }

    let victim = Victim {
        pid: record.pid,
        frame,
        page: record.page,
    };
    debug!("evicting {}", victim);
    Ok(victim)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_policy_kind_build() {
        let lru = PolicyKind::LruApprox.build(LruApproxConfig::default()).unwrap();
        assert_eq!(lru.kind(), PolicyKind::LruApprox);
        assert!(lru.is_empty());

        let second = PolicyKind::SecondChance
            .build(LruApproxConfig::default())
            .unwrap();
        assert_eq!(second.kind(), PolicyKind::SecondChance);
    }

    #[test]
    fn test_policy_kind_rejects_bad_lru_config() {
        let config = LruApproxConfig {
            counter_bits: 0,
            ..LruApproxConfig::default()
        };
        assert!(PolicyKind::LruApprox.build(config).is_err());
    }

    #[test]
    fn test_policy_kind_display() {
        assert_eq!(PolicyKind::LruApprox.to_string(), "lru-approx");
        assert_eq!(PolicyKind::SecondChance.to_string(), "second-chance");
    }

    #[test]
    fn test_track_rejects_unmapped_entry() {
        let mem = memory_with_pages(1);
        mem.unmap(PID, page(0)).unwrap();
        let mut ring = ResidencyRing::new();

        assert_eq!(
            track(&mut ring, &mem, PID, page(0)),
            Err(Error::EntryNotMapped { pid: PID, page: page(0) })
        );
        assert_eq!(
            track(&mut ring, &mem, ProcessId::new(4), page(0)),
            Err(Error::UnknownEntry { pid: ProcessId::new(4), page: page(0) })
        );
        assert!(ring.is_empty());
    }

    #[test]
    fn test_evict_moves_head_to_successor() {
        let mem = memory_with_pages(3);
        let mut ring = ResidencyRing::new();
        for i in 0..3 {
            track(&mut ring, &mem, PID, page(i)).unwrap();
        }
        let middle = ring.next(ring.head().unwrap()).unwrap();

        let victim = evict(&mut ring, &mem, middle).unwrap();

        assert_eq!(victim.page, page(1));
        assert_eq!(victim.frame, FrameId::new(1));
        let head = ring.head().unwrap();
        assert_eq!(ring.get(head).unwrap().page, page(2));
    }

    #[test]
    fn test_evict_unmapped_leaves_ring_intact() {
        let mem = memory_with_pages(2);
        let mut ring = ResidencyRing::new();
        let first = track(&mut ring, &mem, PID, page(0)).unwrap();
        track(&mut ring, &mem, PID, page(1)).unwrap();

        mem.unmap(PID, page(0)).unwrap();

        assert!(evict(&mut ring, &mem, first).is_err());
        assert_eq!(ring.len(), 2);
        assert!(ring.contains(first));
    }
}
