//! Simulator - the page-fault handling path.
//!
//! The [`Simulator`] provides:
//! - Resident-page lookup with reference/dirty bit tracking
//! - Free-frame allocation
//! - Victim selection through a swappable replacement policy

use std::sync::atomic::Ordering;

use log::debug;
use parking_lot::Mutex;

use super::SimulatorStats;
use crate::common::config::SimulatorConfig;
use crate::common::{FrameId, PageNumber, ProcessId, Result};
use crate::memory::{PageTableEntry, SystemMemory};
use crate::replacer::{PolicyKind, SharedPolicy, Victim};

/// Kind of memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

/// What an access did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// The page was resident.
    Hit { frame: FrameId },

    /// The page was loaded into `frame`, evicting `evicted` if no frame was
    /// free.
    Fault {
        frame: FrameId,
        evicted: Option<Victim>,
    },
}

impl AccessOutcome {
    /// Check if the access found its page resident.
    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, AccessOutcome::Hit { .. })
    }

    /// The frame now holding the page.
    #[inline]
    pub fn frame(&self) -> FrameId {
        match *self {
            AccessOutcome::Hit { frame } | AccessOutcome::Fault { frame, .. } => frame,
        }
    }

    /// The page evicted to make room, if any.
    #[inline]
    pub fn evicted(&self) -> Option<Victim> {
        match *self {
            AccessOutcome::Hit { .. } => None,
            AccessOutcome::Fault { evicted, .. } => evicted,
        }
    }
}

/// Drives a replacement policy over simulated memory.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────────┐
/// │                         Simulator                            │
/// │  ┌──────────────────┐   ┌─────────────────────────────────┐  │
/// │  │ page tables      │   │   frames: FrameTable            │  │
/// │  │ (pid, page)→PTE  │──▶│ [Frame0] [Frame1] [Frame2] ...  │  │
/// │  └──────────────────┘   └─────────────────────────────────┘  │
/// │  ┌──────────────┐  ┌──────────────────┐                      │
/// │  │  free_list   │  │  policy          │                      │
/// │  │ Vec<FrameId> │  │  SharedPolicy    │                      │
/// │  └──────────────┘  └──────────────────┘                      │
/// └──────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// - Hits are lock-free: they only set atomic bits on the entry
/// - Faults hold the policy lock from the residency re-check until the new
///   page is tracked, so at most one replacement decision runs at a time
/// - `free_list`: `Mutex`, only taken while the policy lock is held
/// - `stats`: No lock, all atomic counters
///
/// # Usage
/// ```
/// use pagesweep::{AccessKind, PageNumber, PolicyKind, ProcessId, Simulator, SimulatorConfig};
///
/// let config = SimulatorConfig {
///     frame_count: 2,
///     ..SimulatorConfig::with_policy(PolicyKind::SecondChance)
/// };
/// let sim = Simulator::new(config).unwrap();
/// let pid = ProcessId::new(0);
///
/// assert!(!sim.access(pid, PageNumber::new(0), AccessKind::Read).unwrap().is_hit());
/// assert!(sim.access(pid, PageNumber::new(0), AccessKind::Read).unwrap().is_hit());
/// ```
pub struct Simulator {
    /// Page tables and the frame table.
    memory: SystemMemory,

    /// Frames not holding any page. Popped from the back.
    free_list: Mutex<Vec<FrameId>>,

    /// Replacement policy, also the fault-path lock.
    policy: SharedPolicy,

    /// Access statistics.
    stats: SimulatorStats,

    /// Settings this simulator was built with.
    config: SimulatorConfig,
}

impl Simulator {
    /// Create a simulator with every frame free.
    ///
    /// # Errors
    /// - `Error::InvalidConfig` if `config` does not validate
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        config.validate()?;

        let memory = SystemMemory::new(
            config.frame_count,
            config.process_count,
            config.pages_per_process,
        );
        let policy = SharedPolicy::build(config.policy, config.lru)?;
        policy.init()?;

        debug!(
            "simulator: {} frames, {} processes, policy {}",
            config.frame_count, config.process_count, config.policy
        );

        Ok(Self {
            memory,
            free_list: Mutex::new(Self::all_frames(config.frame_count)),
            policy,
            stats: SimulatorStats::new(),
            config,
        })
    }

    // ========================================================================
    // Public API: Accesses
    // ========================================================================

    /// Access `page` of process `pid`, loading it on a fault.
    ///
    /// A hit sets the entry's reference bit (and dirty bit for writes). A
    /// fault maps the page into a free frame, or into the frame of a victim
    /// chosen by the policy. A freshly loaded page starts with its reference
    /// bit clear.
    ///
    /// # Errors
    /// - `Error::UnknownProcess` / `Error::PageOutOfRange` for bad addresses
    /// - Any error from the policy's `replace` or `update`
    pub fn access(
        &self,
        pid: ProcessId,
        page: PageNumber,
        kind: AccessKind,
    ) -> Result<AccessOutcome> {
        let entry = self.memory.entry_checked(pid, page)?;
        self.stats.accesses.fetch_add(1, Ordering::Relaxed);

        // Fast path: page already resident
        if let Some(frame) = entry.frame() {
            return Ok(self.handle_hit(entry, frame, kind));
        }

        self.handle_fault(pid, page, entry, kind)
    }

    /// Evict every page, clear all statistics, and re-initialize the policy.
    pub fn reset(&self) -> Result<()> {
        let mut policy = self.policy.lock();

        for pid in 0..self.config.process_count {
            let pid = ProcessId::new(pid as u32);
            let pages: Vec<_> = match self.memory.page_table(pid) {
                Some(table) => table.resident_pages().collect(),
                None => continue,
            };
            for page in pages {
                self.memory.unmap(pid, page)?;
            }
        }

        policy.init()?;
        *self.free_list.lock() = Self::all_frames(self.config.frame_count);
        self.stats.reset();
        debug!("simulator reset");
        Ok(())
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    /// Get access statistics.
    pub fn stats(&self) -> &SimulatorStats {
        &self.stats
    }

    /// The active replacement policy.
    pub fn policy_kind(&self) -> PolicyKind {
        self.config.policy
    }

    /// Handle to the replacement policy.
    pub fn policy(&self) -> &SharedPolicy {
        &self.policy
    }

    /// Simulated memory, for inspecting entries and frames.
    pub fn memory(&self) -> &SystemMemory {
        &self.memory
    }

    /// Settings this simulator was built with.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Number of physical frames.
    pub fn frame_count(&self) -> usize {
        self.config.frame_count
    }

    /// Number of frames holding no page.
    pub fn free_frame_count(&self) -> usize {
        self.free_list.lock().len()
    }

    /// Number of resident pages.
    pub fn resident_count(&self) -> usize {
        self.policy.len()
    }

    // ========================================================================
    // Internal
    // ========================================================================

    /// Free list handing out frame 0 first.
    fn all_frames(count: usize) -> Vec<FrameId> {
        (0..count).rev().map(FrameId::new).collect()
    }

    fn handle_hit(
        &self,
        entry: &PageTableEntry,
        frame: FrameId,
        kind: AccessKind,
    ) -> AccessOutcome {
        entry.touch();
        if kind == AccessKind::Write {
            entry.mark_dirty();
        }
        self.stats.hits.fetch_add(1, Ordering::Relaxed);
        AccessOutcome::Hit { frame }
    }

    fn handle_fault(
        &self,
        pid: ProcessId,
        page: PageNumber,
        entry: &PageTableEntry,
        kind: AccessKind,
    ) -> Result<AccessOutcome> {
        let mut policy = self.policy.lock();

        // Another thread may have loaded the page while we waited
        if let Some(frame) = entry.frame() {
            return Ok(self.handle_hit(entry, frame, kind));
        }

        self.stats.faults.fetch_add(1, Ordering::Relaxed);

        let free = self.free_list.lock().pop();
        let (frame, evicted) = match free {
            Some(frame) => (frame, None),
            None => {
                let victim = policy.replace(&self.memory)?;
                self.reclaim(&victim)?;
                (victim.frame, Some(victim))
            }
        };

        self.memory.map(pid, page, frame)?;
        if let Err(err) = policy.update(&self.memory, pid, page) {
            self.memory.unmap(pid, page)?;
            self.free_list.lock().push(frame);
            return Err(err);
        }
        if kind == AccessKind::Write {
            entry.mark_dirty();
        }

        debug!("fault: {} {} loaded into {}", pid, page, frame);
        Ok(AccessOutcome::Fault { frame, evicted })
    }

    /// Invalidate a victim's mapping so its frame can be reused.
    fn reclaim(&self, victim: &Victim) -> Result<()> {
        let entry = self.memory.entry_checked(victim.pid, victim.page)?;
        if entry.take_dirty() {
            self.stats.writebacks.fetch_add(1, Ordering::Relaxed);
        }
        self.memory.unmap(victim.pid, victim.page)?;
        self.stats.evictions.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
