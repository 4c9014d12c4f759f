//! LRU approximation via aging counters.
//!
//! Every `replace` sweeps the ring once from the head. Each visited frame's
//! counter is shifted right by one; if the page was referenced since the last
//! sweep the high bit is set and the reference bit cleared. The record with
//! the smallest counter after the sweep is evicted. On ties the record seen
//! first wins.
//!
//! ```text
//! counters before   [4, 2, 6]     no reference bits set
//! after one sweep   [2, 1, 3]     victim = second record
//! ```

use log::{debug, trace};

use super::{evict, resolve_entry, track};
use super::{
    PolicyKind, PolicyStats, RecordId, ReplacementPolicy, ResidencyRing, SweepScope, Victim,
};
use crate::common::config::LruApproxConfig;
use crate::common::{Error, PageNumber, ProcessId, Result};
use crate::memory::MemoryView;

/// Clock sweep with per-frame aging counters.
///
/// Counters live on [`PhysicalFrame`](crate::memory::PhysicalFrame), not
/// here; the frame table resets a frame's counter when it is reassigned.
#[derive(Debug)]
pub struct LruApproxPolicy {
    ring: ResidencyRing,
    config: LruApproxConfig,
    stats: PolicyStats,
}

impl LruApproxPolicy {
    /// Create a policy with the default 3-bit counters and a full sweep.
    pub fn new() -> Self {
        Self {
            ring: ResidencyRing::new(),
            config: LruApproxConfig::default(),
            stats: PolicyStats::default(),
        }
    }

    /// Create a policy with custom counter width and sweep scope.
    ///
    /// # Errors
    /// - `Error::InvalidConfig` if the counter width is out of range
    pub fn with_config(config: LruApproxConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ring: ResidencyRing::new(),
            config,
            stats: PolicyStats::default(),
        })
    }

    /// The active configuration.
    pub fn config(&self) -> LruApproxConfig {
        self.config
    }

    /// Age every record in scope and return the one with the lowest counter.
    fn sweep(&mut self, mem: &dyn MemoryView) -> Result<RecordId> {
        let head = self.ring.head().ok_or(Error::EmptyResidentSet)?;
        let skip_head = self.config.sweep == SweepScope::ExcludeHead;
        if skip_head && self.ring.len() == 1 {
            return Ok(head);
        }

        let high_bit = self.config.high_bit();
        let mut min: Option<(u32, RecordId)> = None;

        for (id, record) in self.ring.iter() {
            if skip_head && id == head {
                continue;
            }

            let entry = resolve_entry(mem, record)?;
            let frame_id = entry.frame().ok_or(Error::EntryNotMapped {
                pid: record.pid,
                page: record.page,
            })?;
            let frame = mem.frame(frame_id).ok_or(Error::UnknownFrame(frame_id))?;

            let referenced = entry.take_referenced();
            let age = frame.age_step(referenced, high_bit);

            self.stats.records_visited += 1;
            if referenced {
                self.stats.references_cleared += 1;
            }
            trace!(
                "aged {} {} in {}: counter={:#b} referenced={}",
                record.pid,
                record.page,
                frame_id,
                age,
                referenced
            );

            // Strict `<`: the first record holding the minimum keeps it.
            if min.map_or(true, |(lowest, _)| age < lowest) {
                min = Some((age, id));
            }
        }

        min.map(|(_, id)| id).ok_or(Error::EmptyResidentSet)
    }
}

impl Default for LruApproxPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplacementPolicy for LruApproxPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::LruApprox
    }

    fn init(&mut self) -> Result<()> {
        debug!("initializing lru-approx policy ({:?})", self.config);
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
