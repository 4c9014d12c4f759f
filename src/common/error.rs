//! Error types for pagesweep.

use thiserror::Error;

use super::{FrameId, PageNumber, ProcessId};

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in pagesweep.
///
/// Most variants are precondition violations by the caller (the fault
/// handler). They surface as `Err` so a failed fault-handling attempt can be
/// aborted cleanly instead of tearing the simulation down.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// `replace` was called while no page is resident.
    ///
    /// The caller must only ask for a victim when the resident set is full.
    #[error("No resident pages to evict")]
    EmptyResidentSet,

    /// Storage for a new residency record could not be reserved.
    ///
    /// The ring is left exactly as it was.
    #[error("Failed to allocate a residency record")]
    AllocationFailed,

    /// A record id does not name a live record in the ring.
    #[error("Residency record {0} does not exist")]
    UnknownRecord(usize),

    /// The memory view has no page-table entry for this (process, page).
    #[error("No page-table entry for {pid} {page}")]
    UnknownEntry { pid: ProcessId, page: PageNumber },

    /// The frame index is outside the physical frame table.
    #[error("{0} is not in the frame table")]
    UnknownFrame(FrameId),

    /// `update` was handed an entry that is not mapped to a frame.
    #[error("{pid} {page} is not mapped to a frame")]
    EntryNotMapped { pid: ProcessId, page: PageNumber },

    /// The simulator has no page table for this process.
    #[error("Unknown process {0}")]
    UnknownProcess(ProcessId),

    /// The page number exceeds the process's address space.
    #[error("{page} is outside the address space of {pid}")]
    PageOutOfRange { pid: ProcessId, page: PageNumber },

    /// A configuration value was rejected by `validate()`.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::EmptyResidentSet;
        assert_eq!(format!("{}", err), "No resident pages to evict");

        let err = Error::EntryNotMapped {
            pid: ProcessId::new(3),
            page: PageNumber::new(7),
        };
        assert_eq!(format!("{}", err), "Process(3) Page(7) is not mapped to a frame");

        let err = Error::UnknownFrame(FrameId::new(9));
        assert_eq!(format!("{}", err), "Frame(9) is not in the frame table");
    }

    #[test]
    fn test_result_type_alias() {
        fn might_fail() -> Result<u32> {
            Ok(42)
        }

        assert_eq!(might_fail().unwrap(), 42);
    }
}
