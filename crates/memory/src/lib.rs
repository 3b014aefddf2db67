//! # pool-memory
//!
//! Node storage recycling for linked containers.
//!
//! This crate provides:
//! - A pooling allocator that keeps released blocks in per-layout free pools
//!   and hands them out again before asking the system for more
//! - A singly-linked forward list that draws every node from such an allocator
//! - Forward cursors and iterators over the list
//!
//! ## Quick Start
//!
//! ```rust
//! use pool_memory::prelude::*;
//!
//! let pool = PoolAllocator::new();
//! let mut list = ForwardList::new_in(&pool);
//!
//! list.push_front(1)?;
//! list.push_front(2)?;
//! assert_eq!(list.pop_front()?, 2);
//!
//! // The popped node's block is parked in the pool and reused here
//! list.push_front(3)?;
//! assert_eq!(pool.free_count(), 0);
//! # Ok::<(), MemoryError>(())
//! ```
//!
//! ## Features
//!
//! - `logging` (default): structured `tracing` events for allocator activity
//!   and rejected releases

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rust_2018_idioms)]
// Allocator and node-chain internals are raw-pointer code by nature
#![allow(unsafe_code)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
// usize -> f64 casts only feed percentages and ratios
#![allow(clippy::cast_precision_loss)]

// Error types
pub mod error;

// Core modules
pub mod allocator;
pub mod list;

pub use crate::error::{MemoryError, MemoryResult, Result};

// Public API exports
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    // Error types
    pub use crate::error::{MemoryError, MemoryResult, Result};

    // Allocator types
    pub use crate::allocator::{
        AllocError, AllocResult, Allocator, MemoryUsage, PoolAllocator, PoolConfig, PoolStats,
        SystemAllocator,
    };

    // Containers
    pub use crate::list::{Cursor, ForwardList};
}

// Re-export allocator types at crate root for convenience
pub use crate::allocator::{AllocError, AllocResult};
