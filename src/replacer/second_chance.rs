//! Second-chance (clock) replacement.
//!
//! Starting at the head, a record whose reference bit is clear is evicted.
//! A record whose bit is set has the bit cleared and the hand moves on. Since
//! every passed record loses its bit, the hand stops within one revolution
//! plus one step.

use log::{debug, trace};

use super::{evict, resolve_entry, track};
use super::{PolicyKind, PolicyStats, RecordId, ReplacementPolicy, ResidencyRing, Victim};
use crate::common::{Error, PageNumber, ProcessId, Result};
use crate::memory::MemoryView;

/// Clock algorithm over reference bits, without counters.
#[derive(Debug, Default)]
pub struct SecondChancePolicy {
    ring: ResidencyRing,
    stats: PolicyStats,
}

impl SecondChancePolicy {
    /// Create a policy with an empty ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the hand until a record with a clear reference bit is found.
    fn sweep(&mut self, mem: &dyn MemoryView) -> Result<RecordId> {
        let mut cursor = self.ring.head().ok_or(Error::EmptyResidentSet)?;
        let limit = self.ring.len() + 1;

        for _ in 0..limit {
            let record = self.ring.get(cursor).ok_or(Error::UnknownRecord(cursor.0))?;
            let entry = resolve_entry(mem, record)?;
            self.stats.records_visited += 1;

            if !entry.take_referenced() {
                return Ok(cursor);
            }

            self.stats.references_cleared += 1;
            trace!("second chance for {} {}", record.pid, record.page);
            cursor = self.ring.next(cursor).ok_or(Error::UnknownRecord(cursor.0))?;
        }

        // Only reachable if the access path keeps re-setting bits behind the
        // hand; take the record under the hand.
        Ok(cursor)
    }
}

impl ReplacementPolicy for SecondChancePolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::SecondChance
    }

    fn init(&mut self) -> Result<()> {
        debug!("initializing second-chance policy");
        self.ring.clear();
        self.stats = PolicyStats::default();
        Ok(())
    }

    fn replace(&mut self, mem: &dyn MemoryView) -> Result<Victim> {
        let chosen = self.sweep(mem)?;
        let victim = evict(&mut self.ring, mem, chosen)?;
        self.stats.evictions += 1;
        Ok(victim)
    }

    fn update(&mut self, mem: &dyn MemoryView, pid: ProcessId, page: PageNumber) -> Result<()> {
        track(&mut self.ring, mem, pid, page)?;
        self.stats.insertions += 1;
        Ok(())
    }

    fn ring(&self) -> &ResidencyRing {
        &self.ring
    }

    fn stats(&self) -> PolicyStats {
        self.stats
    }
}
