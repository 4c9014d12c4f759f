//! A policy behind a lock, for fault handlers running on several threads.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::{PolicyKind, PolicyStats, ReplacementPolicy, Victim};
use crate::common::config::LruApproxConfig;
use crate::common::{PageNumber, ProcessId, Result};
use crate::memory::MemoryView;

/// A replacement policy shared between threads.
///
/// Every operation holds the lock for its whole duration. Nothing under the
/// lock blocks or does I/O, so hold times are bounded by the ring size.
/// Cloning is cheap and yields a handle to the same policy.
#[derive(Clone)]
pub struct SharedPolicy {
    inner: Arc<Mutex<Box<dyn ReplacementPolicy>>>,
}

impl SharedPolicy {
    /// Wrap an existing policy.
    pub fn new(policy: Box<dyn ReplacementPolicy>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(policy)),
        }
    }

    /// Build a fresh policy of `kind` and wrap it.
    pub fn build(kind: PolicyKind, lru: LruApproxConfig) -> Result<Self> {
        Ok(Self::new(kind.build(lru)?))
    }

    /// Take the lock for a sequence of operations that must not interleave
    /// with other fault handlers.
    pub fn lock(&self) -> MutexGuard<'_, Box<dyn ReplacementPolicy>> {
        self.inner.lock()
    }

    /// See [`ReplacementPolicy::init`].
    pub fn init(&self) -> Result<()> {
        self.lock().init()
    }

    /// See [`ReplacementPolicy::replace`].
    pub fn replace(&self, mem: &dyn MemoryView) -> Result<Victim> {
        self.lock().replace(mem)
    }

    /// See [`ReplacementPolicy::update`].
    pub fn update(&self, mem: &dyn MemoryView, pid: ProcessId, page: PageNumber) -> Result<()> {
        self.lock().update(mem, pid, page)
    }

    /// Which policy is wrapped.
    pub fn kind(&self) -> PolicyKind {
        self.lock().kind()
    }

    /// Number of tracked resident pages.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if no page is tracked.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Decision counters of the wrapped policy.
    pub fn stats(&self) -> PolicyStats {
        self.lock().stats()
    }
}
