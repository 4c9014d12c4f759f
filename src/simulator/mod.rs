//! Fault handling over simulated memory.
//!
//! # Components
//! - [`Simulator`] - Resolves accesses, allocates frames, asks the policy
//!   for victims
//! - [`SimulatorStats`] - Access statistics

mod pager;
mod stats;

pub use pager::{AccessKind, AccessOutcome, Simulator};
pub use stats::{SimulatorStats, StatsSnapshot};
