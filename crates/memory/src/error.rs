//! Standalone error types for pool-memory
//!
//! Uses thiserror for clean, idiomatic Rust error definitions.

use core::alloc::Layout;
use thiserror::Error;

#[cfg(feature = "logging")]
use tracing::{error, warn};

// ============================================================================
// Main Error Types
// ============================================================================

/// Errors raised by the pool allocator and the containers built on it
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    // --- Allocation Errors ---
    #[error("Memory allocation failed: {size} bytes with {align} byte alignment")]
    AllocationFailed { size: usize, align: usize },

    #[error("Invalid release of {address:#x}: block is not currently allocated")]
    InvalidRelease { address: usize },

    #[error(
        "Layout mismatch on release: allocated as {allocated_size}/{allocated_align}, \
         released as {size}/{align}"
    )]
    LayoutMismatch {
        allocated_size: usize,
        allocated_align: usize,
        size: usize,
        align: usize,
    },

    // --- Container Errors ---
    #[error("{operation} called on an empty container")]
    EmptyContainer { operation: &'static str },

    #[error("Dereferencing the end cursor")]
    InvalidIterator,
}

impl MemoryError {
    /// Whether the caller can reasonably continue after this error
    ///
    /// Container misuse is recoverable; allocator failures are fatal for the
    /// operation that hit them.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::EmptyContainer { .. } | Self::InvalidIterator)
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AllocationFailed { .. } => "MEM:ALLOC:FAILED",
            Self::InvalidRelease { .. } => "MEM:ALLOC:RELEASE",
            Self::LayoutMismatch { .. } => "MEM:ALLOC:LAYOUT",
            Self::EmptyContainer { .. } => "MEM:LIST:EMPTY",
            Self::InvalidIterator => "MEM:LIST:ITERATOR",
        }
    }

    // ============================================================================
    // Convenience Constructors
    // ============================================================================

    /// Create allocation failed error
    pub fn allocation_failed(size: usize, align: usize) -> Self {
        #[cfg(feature = "logging")]
        error!(size, align, "memory allocation failed");

        Self::AllocationFailed { size, align }
    }

    /// Create allocation failed error from layout
    pub fn allocation_failed_with_layout(layout: Layout) -> Self {
        Self::allocation_failed(layout.size(), layout.align())
    }

    /// Create invalid release error for an address the pool does not hold
    pub fn invalid_release(address: usize) -> Self {
        #[cfg(feature = "logging")]
        warn!(address, "rejected release of untracked block");

        Self::InvalidRelease { address }
    }

    /// Create layout mismatch error
    pub fn layout_mismatch(allocated: Layout, released: Layout) -> Self {
        #[cfg(feature = "logging")]
        warn!(
            allocated_size = allocated.size(),
            released_size = released.size(),
            "rejected release with mismatched layout"
        );

        Self::LayoutMismatch {
            allocated_size: allocated.size(),
            allocated_align: allocated.align(),
            size: released.size(),
            align: released.align(),
        }
    }

    /// Create empty container error
    pub fn empty_container(operation: &'static str) -> Self {
        Self::EmptyContainer { operation }
    }

    /// Create invalid iterator error
    pub fn invalid_iterator() -> Self {
        Self::InvalidIterator
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for memory operations
pub type MemoryResult<T> = core::result::Result<T, MemoryError>;

/// Generic result type alias
pub type Result<T> = MemoryResult<T>;

/// Type aliases used by the allocator module
pub type AllocError = MemoryError;
pub type AllocResult<T> = MemoryResult<T>;

// ============================================================================
// Tests
// ============================================================================
