//! Simulator statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics tracked by the simulator.
///
/// All fields are atomic for lock-free, thread-safe updates.
///
/// # Memory Ordering
/// Every counter is bumped and read with `Ordering::Relaxed`. No access
/// decision is made from these values; the page-table bits and the policy
/// lock carry all synchronization. Each counter is exact on its own, but a
/// snapshot reads them one at a time. Relations such as
/// `hits + faults == accesses` or `evictions <= faults` only hold in a
/// snapshot taken while no access is in progress.
///
/// # Example
/// ```
/// use pagesweep::SimulatorStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = SimulatorStats::new();
/// stats.hits.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.hits.load(Ordering::Relaxed), 1);
/// ```
#[derive(Debug)]
pub struct SimulatorStats {
    /// Memory accesses handled.
    pub accesses: AtomicU64,

    /// Accesses that found their page resident.
    pub hits: AtomicU64,

    /// Accesses that had to load their page.
    pub faults: AtomicU64,

    /// Faults that needed a victim because no frame was free.
    pub evictions: AtomicU64,

    /// Evicted pages that were dirty.
    pub writebacks: AtomicU64,
}

impl SimulatorStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self {
            accesses: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            faults: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            writebacks: AtomicU64::new(0),
        }
    }

    /// Get a snapshot of current statistics.
    ///
    /// This returns a non-atomic copy for display/logging.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            accesses: self.accesses.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            faults: self.faults.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            writebacks: self.writebacks.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.accesses.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        self.faults.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.writebacks.store(0, Ordering::Relaxed);
    }
}

impl Default for SimulatorStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of simulator statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub accesses: u64,
    pub hits: u64,
    pub faults: u64,
    pub evictions: u64,
    pub writebacks: u64,
}

impl StatsSnapshot {
    /// Fraction of accesses that faulted (0.0 to 1.0).
    pub fn fault_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.faults as f64 / self.accesses as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ accesses: {}, hits: {}, faults: {}, evictions: {}, writebacks: {}, \
             fault_rate: {:.2}% }}",
            self.accesses,
            self.hits,
            self.faults,
            self.evictions,
            self.writebacks,
            self.fault_rate() * 100.0
        )
    }
}
