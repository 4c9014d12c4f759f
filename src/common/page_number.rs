//! Virtual page number type.

use std::fmt;

/// Identifies a virtual page within one process's address space.
///
/// Together with a [`ProcessId`](super::ProcessId) it names exactly one
/// page-table entry. Residency records store this pair instead of a pointer
/// to the entry.
///
/// # Example
/// ```
/// use pagesweep::PageNumber;
///
/// let page = PageNumber::new(42);
/// assert_eq!(page.index(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageNumber(pub u32);

impl PageNumber {
    /// Create a new PageNumber.
    #[inline]
    pub fn new(page: u32) -> Self {
        PageNumber(page)
    }

    /// The page number as a page-table index.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page({})", self.0)
    }
}
