//!
//! Allocators for container node storage
//! This module provides the allocator trait the containers are generic over,
//! the recycling pool allocator and a system allocator fallback.

mod system;
mod traits;

// Allocator implementations
pub mod pool;

// Re-exports for convenience
pub use pool::{PoolAllocator, PoolConfig, PoolStats};

pub use crate::error::{AllocError, AllocResult};
pub use system::{SYSTEM, SystemAllocator};
pub use traits::{Allocator, MemoryUsage};
