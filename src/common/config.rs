//! Configuration constants and settings for pagesweep.

use crate::common::{Error, Result};
use crate::replacer::{PolicyKind, SweepScope};

/// Width of a frame's aging counter in bits.
///
/// Three bits keep eight distinguishable ages, which is enough to separate
/// "referenced in one of the last three sweeps" from "idle".
pub const AGING_COUNTER_BITS: u32 = 3;

/// Bit OR-ed into an aging counter when its page was referenced.
pub const AGING_HIGH_BIT: u32 = 1 << (AGING_COUNTER_BITS - 1);

/// Number of physical frames when none is configured.
pub const DEFAULT_FRAME_COUNT: usize = 16;

/// Number of simulated processes when none is configured.
pub const DEFAULT_PROCESS_COUNT: usize = 4;

/// Virtual pages per process when none is configured.
pub const DEFAULT_PAGES_PER_PROCESS: usize = 64;

/// Tuning for the LRU-approximation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LruApproxConfig {
    /// Width of each aging counter. Must be in `1..=32`.
    pub counter_bits: u32,

    /// Which records a sweep ages and considers.
    pub sweep: SweepScope,
}

impl LruApproxConfig {
    /// The bit set on a counter whose page was referenced.
    #[inline]
    pub fn high_bit(&self) -> u32 {
        1 << (self.counter_bits - 1)
    }

    /// Reject settings the policy cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.counter_bits == 0 || self.counter_bits > u32::BITS {
            return Err(Error::InvalidConfig("counter_bits must be in 1..=32"));
        }
        Ok(())
    }
}

impl Default for LruApproxConfig {
    fn default() -> Self {
        Self {
            counter_bits: AGING_COUNTER_BITS,
            sweep: SweepScope::Full,
        }
    }
}

/// Shape of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Physical frames available for resident pages.
    pub frame_count: usize,

    /// Processes with a page table. Process ids are `0..process_count`.
    pub process_count: usize,

    /// Virtual pages in each process's address space.
    pub pages_per_process: usize,

    /// Replacement policy used once all frames are occupied.
    pub policy: PolicyKind,

    /// Settings for [`PolicyKind::LruApprox`]. Ignored by second chance.
    pub lru: LruApproxConfig,
}

impl SimulatorConfig {
    /// Default shape with the given policy.
    pub fn with_policy(policy: PolicyKind) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Reject settings the simulator cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.frame_count == 0 {
            return Err(Error::InvalidConfig("frame_count must be > 0"));
        }
        if self.process_count == 0 {
            return Err(Error::InvalidConfig("process_count must be > 0"));
        }
        if self.pages_per_process == 0 || self.pages_per_process > u32::MAX as usize {
            return Err(Error::InvalidConfig("pages_per_process must fit in a page number"));
        }
        if self.process_count > u32::MAX as usize {
            return Err(Error::InvalidConfig("process_count must fit in a process id"));
        }
        self.lru.validate()
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            frame_count: DEFAULT_FRAME_COUNT,
            process_count: DEFAULT_PROCESS_COUNT,
            pages_per_process: DEFAULT_PAGES_PER_PROCESS,
            policy: PolicyKind::SecondChance,
            lru: LruApproxConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aging_high_bit() {
        assert_eq!(AGING_HIGH_BIT, 0b100);
        assert_eq!(LruApproxConfig::default().high_bit(), AGING_HIGH_BIT);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulatorConfig::default().validate().is_ok());
        assert!(LruApproxConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_configs() {
        let config = SimulatorConfig {
            frame_count: 0,
            ..SimulatorConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let lru = LruApproxConfig {
            counter_bits: 0,
            ..LruApproxConfig::default()
        };
        assert!(matches!(lru.validate(), Err(Error::InvalidConfig(_))));

        let lru = LruApproxConfig {
            counter_bits: 33,
            ..LruApproxConfig::default()
        };
        assert!(lru.validate().is_err());
    }

    #[test]
    fn test_wide_counter_high_bit() {
        let lru = LruApproxConfig {
            counter_bits: 32,
            ..LruApproxConfig::default()
        };
        assert_eq!(lru.high_bit(), 1 << 31);
    }
}
