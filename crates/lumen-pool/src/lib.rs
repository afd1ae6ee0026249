//! Thread-safe fixed-block object pools.
//!
//! [`MemoryPool`] carves fixed-size slots out of larger blocks, reuses freed
//! slots LIFO, and grows by whole blocks on demand. [`PointPool`] is the
//! point-specialized instance; it is constructed and passed explicitly rather
//! than living in a global.

mod point_pool;
mod pool;

pub use point_pool::PointPool;
pub use pool::{MemoryPool, PoolStats};
