use std::ops::Deref;
use std::ptr::NonNull;

use glam::Vec3;
use lumen_cloud::Point;
use lumen_config::PoolConfig;

use crate::MemoryPool;

/// Pool of [`Point`] slots for the point-allocation hot path.
///
/// Construct one where the application starts up and hand it (by reference
/// or inside an `Arc`) to whatever allocates points. Derefs to the
/// underlying [`MemoryPool`].
#[derive(Debug)]
pub struct PointPool {
    pool: MemoryPool<Point>,
}

impl PointPool {
    /// Points per block unless configured otherwise.
    pub const DEFAULT_BLOCK_SIZE: usize = 4096;

    /// A pool with 4096 points per block.
    pub fn new() -> Self {
        Self::with_block_size(Self::DEFAULT_BLOCK_SIZE)
    }

    /// A pool sized from `config.point_block_size`.
    pub fn from_config(config: &PoolConfig) -> Self {
        Self::with_block_size(config.point_block_size)
    }

    /// A pool with a custom block size.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero.
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            pool: MemoryPool::new(block_size),
        }
    }

    /// Allocate a point with default attributes at `position`.
    pub fn allocate_at(&self, position: Vec3) -> NonNull<Point> {
        self.pool.allocate(Point::new(position))
    }
}

impl Default for PointPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for PointPool {
    type Target = MemoryPool<Point>;

    fn deref(&self) -> &MemoryPool<Point> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_point_pool_allocates_points() {
        let pool = PointPool::new();
        assert_eq!(pool.block_size(), 4096);

        let p = pool.allocate_at(Vec3::new(1.0, 2.0, 3.0));
        // SAFETY: `p` is a live allocation from `pool`.
        let point = unsafe { p.as_ref() };
        assert_eq!(point.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(point.normal, Vec3::Z);
        assert_eq!(pool.allocated_count(), 1);

        // SAFETY: `p` is freed once and not used again.
        unsafe { pool.deallocate(p) };
        assert_eq!(pool.allocated_count(), 0);
    }

    #[test]
    fn test_from_config() {
        let config = PoolConfig {
            point_block_size: 64,
        };
        let pool = PointPool::from_config(&config);
        assert_eq!(pool.capacity(), 64);
    }

    #[test]
    fn test_pools_are_isolated() {
        let a = PointPool::with_block_size(8);
        let b = PointPool::with_block_size(8);
        a.allocate_at(Vec3::ZERO);
        assert_eq!(a.allocated_count(), 1);
        assert_eq!(b.allocated_count(), 0);
    }

    #[test]
    fn test_shared_across_threads() {
        let pool = Arc::new(PointPool::with_block_size(32));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    for i in 0..10 {
                        pool.allocate_at(Vec3::new(t as f32, i as f32, 0.0));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(pool.allocated_count(), 40);
        assert!(pool.capacity() >= 40);
    }
}
