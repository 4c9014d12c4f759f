//! Physical frames and the frame table.
//!
//! A [`PhysicalFrame`] holds the metadata the simulator keeps per frame:
//! - Which (process, page) currently occupies it
//! - The aging counter used by the LRU-approximation policy

use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;

use crate::common::{FrameId, PageNumber, ProcessId};

/// A frame of simulated physical memory.
///
/// # Thread Safety
/// - `owner`: `Mutex` for safe updates
/// - `age`: `AtomicU32`; only the policy sweep writes it, under the policy lock
#[derive(Debug)]
pub struct PhysicalFrame {
    /// The mapping occupying this frame, or None if free.
    owner: Mutex<Option<(ProcessId, PageNumber)>>,

    /// Aging register. Lower means less recently referenced.
    age: AtomicU32,
}

impl PhysicalFrame {
    /// Create a new free frame with a zero counter.
    pub fn new() -> Self {
        Self {
            owner: Mutex::new(None),
            age: AtomicU32::new(0),
        }
    }

    // ========================================================================
    // Ownership
    // ========================================================================

    /// Get the mapping that occupies this frame.
    #[inline]
    pub fn owner(&self) -> Option<(ProcessId, PageNumber)> {
        *self.owner.lock()
    }

    /// Set the mapping that occupies this frame.
    #[inline]
    pub fn set_owner(&self, owner: Option<(ProcessId, PageNumber)>) {
        *self.owner.lock() = owner;
    }

    /// Check if no page occupies this frame.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.owner().is_none()
    }

    // ========================================================================
    // Aging counter
    // ========================================================================

    /// Current value of the aging counter.
    #[inline]
    pub fn age(&self) -> u32 {
        self.age.load(Ordering::Relaxed)
    }

    /// Overwrite the aging counter.
    #[inline]
    pub fn set_age(&self, age: u32) {
        self.age.store(age, Ordering::Relaxed);
    }

    /// Apply one aging step and return the new value.
    ///
    /// The counter is shifted right by one; `high_bit` is OR-ed in when the
    /// page was referenced since the last step.
    #[inline]
    pub fn age_step(&self, referenced: bool, high_bit: u32) -> u32 {
        let mut aged = self.age() >> 1;
        if referenced {
            aged |= high_bit;
        }
        self.set_age(aged);
        aged
    }

    /// Reset the frame to the free state.
    ///
    /// Called when a frame is reclaimed before it is handed to a new page.
    pub fn reset(&self) {
        self.set_owner(None);
        self.set_age(0);
    }
}

impl Default for PhysicalFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed set of physical frames, indexable by [`FrameId`].
#[derive(Debug)]
pub struct FrameTable {
    frames: Vec<PhysicalFrame>,
}

impl FrameTable {
    /// Allocate `count` free frames.
    pub fn new(count: usize) -> Self {
        Self {
            frames: (0..count).map(|_| PhysicalFrame::new()).collect(),
        }
    }

    /// Look up a frame.
    #[inline]
    pub fn frame(&self, frame_id: FrameId) -> Option<&PhysicalFrame> {
        self.frames.get(frame_id.0)
    }

    /// Number of frames.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if the table has no frames.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Aging counters of all frames, in frame order.
    pub fn ages(&self) -> Vec<u32> {
        self.frames.iter().map(PhysicalFrame::age).collect()
    }
}
