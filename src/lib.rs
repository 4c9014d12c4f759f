//! pagesweep - page replacement policies for a virtual-memory simulator.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           pagesweep                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Fault Handling (simulator/)                 │   │
//! │  │      access → hit | fault → free frame or victim         │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │       Replacement (replacer/)  [Runtime Swappable]      │   │
//! │  │   ┌─────────────────────────────────────────────────┐   │   │
//! │  │   │   Policies: LRU approximation | Second chance   │   │   │
//! │  │   └─────────────────────────────────────────────────┘   │   │
//! │  │      ResidencyRing + SharedPolicy                        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Simulated Memory (memory/)                     │   │
//! │  │     PageTable + PageTableEntry + FrameTable              │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (ProcessId, PageNumber, FrameId, Error, config)
//! - [`memory`] - Page tables, reference bits, frames and aging counters
//! - [`replacer`] - The residency ring and replacement policies
//! - [`simulator`] - The fault-handling path that drives a policy
//!
//! # Quick Start
//! ```
//! use pagesweep::{PageNumber, PolicyKind, ProcessId, ReplacementPolicy, SystemMemory};
//! use pagesweep::{FrameId, LruApproxConfig};
//!
//! let mem = SystemMemory::new(2, 1, 8);
//! let pid = ProcessId::new(0);
//! let mut policy = PolicyKind::LruApprox.build(LruApproxConfig::default()).unwrap();
//!
//! for i in 0..2 {
//!     mem.map(pid, PageNumber::new(i), FrameId::new(i as usize)).unwrap();
//!     policy.update(&mem, pid, PageNumber::new(i)).unwrap();
//! }
//!
//! let victim = policy.replace(&mem).unwrap();
//! assert_eq!(victim.page, PageNumber::new(0));
//! ```

pub mod common;
pub mod memory;
pub mod replacer;
pub mod simulator;

// Re-export commonly used items at crate root for convenience
pub use common::config::{LruApproxConfig, SimulatorConfig, AGING_HIGH_BIT};
pub use common::{Error, FrameId, PageNumber, ProcessId, Result};

pub use memory::{FrameTable, MemoryView, PageTable, PageTableEntry, PhysicalFrame, SystemMemory};
pub use replacer::{
    LruApproxPolicy, PolicyKind, PolicyStats, ReplacementPolicy, ResidencyRing, SecondChancePolicy,
    SharedPolicy, SweepScope, Victim,
};
pub use simulator::{AccessKind, AccessOutcome, Simulator, SimulatorStats, StatsSnapshot};
