//! Common types and utilities shared across pagesweep.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and settings
//! - Error types
//! - Identifiers (ProcessId, PageNumber, FrameId)

pub mod config;
pub mod error;
mod frame_id;
mod page_number;
mod process_id;

pub use error::{Error, Result};
pub use frame_id::FrameId;
pub use page_number::PageNumber;
pub use process_id::ProcessId;
