//! Growable fixed-block allocator behind a single mutex.

use std::mem::MaybeUninit;
use std::ptr::NonNull;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

/// One contiguous run of `len` uninitialized slots.
///
/// Owned through a raw pointer so that slot pointers handed out earlier
/// stay valid when later slots are carved from the same block.
struct Block<T> {
    slots: NonNull<MaybeUninit<T>>,
    len: usize,
}

impl<T> Block<T> {
    fn new(len: usize) -> Self {
        let boxed: Box<[MaybeUninit<T>]> = Box::new_uninit_slice(len);
        let slots = NonNull::from(Box::leak(boxed)).cast::<MaybeUninit<T>>();
        Self { slots, len }
    }

    /// Pointer to slot `i`. Caller keeps `i < len`.
    fn slot(&self, i: usize) -> NonNull<T> {
        debug_assert!(i < self.len);
        // SAFETY: `i < len`, so the offset stays inside the allocation.
        unsafe { self.slots.add(i).cast() }
    }
}

impl<T> Drop for Block<T> {
    fn drop(&mut self) {
        let raw = std::ptr::slice_from_raw_parts_mut(self.slots.as_ptr(), self.len);
        // SAFETY: `raw` is exactly the pointer leaked in `Block::new`. The
        // slots are `MaybeUninit`, so no element destructors run.
        drop(unsafe { Box::from_raw(raw) });
    }
}

struct PoolState<T> {
    blocks: Vec<Block<T>>,
    /// Slots already carved from the last block.
    used: usize,
    free_list: Vec<NonNull<T>>,
    allocated: usize,
}

// SAFETY: the raw pointers only refer to blocks owned by this state, and
// every access to them happens under the pool mutex. Values of `T` may be
// created on one thread and dropped on another, hence `T: Send`.
unsafe impl<T: Send> Send for PoolState<T> {}

impl<T> PoolState<T> {
    fn fresh(block_size: usize) -> Self {
        Self {
            blocks: vec![Block::new(block_size)],
            used: 0,
            free_list: Vec::new(),
            allocated: 0,
        }
    }
}

/// Snapshot of pool accounting, taken under the pool lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Slots currently handed out.
    pub allocated: usize,
    /// Total slots across all blocks.
    pub capacity: usize,
    /// Reclaimed slots waiting for reuse.
    pub free: usize,
    /// Number of blocks.
    pub blocks: usize,
    /// Bytes reserved for slots (`capacity * size_of::<T>()`).
    pub memory_usage: usize,
}

/// Thread-safe, growable pool of fixed-size `T` slots.
///
/// Every address returned by [`allocate`](Self::allocate) is either in use
/// by exactly one caller or on the free list. Freed slots are reused LIFO.
/// The pool grows by one block at a time and never shrinks, except through
/// [`reset`](Self::reset).
///
/// All operations take one pool-wide lock.
pub struct MemoryPool<T> {
    block_size: usize,
    state: Mutex<PoolState<T>>,
}

impl<T> MemoryPool<T> {
    /// Block size used by [`MemoryPool::default`].
    pub const DEFAULT_BLOCK_SIZE: usize = 1024;

    /// Create a pool with one empty block of `block_size` slots.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero.
    pub fn new(block_size: usize) -> Self {
        assert!(block_size > 0, "block size must be positive");
        Self {
            block_size,
            state: Mutex::new(PoolState::fresh(block_size)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolState<T>> {
        // Pool state is never left half-updated, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move `value` into a pooled slot and return its address.
    ///
    /// Reuses the most recently freed slot if there is one, otherwise
    /// carves the next slot of the current block, adding a block when the
    /// current one is full. The slot stays valid until it is passed to
    /// [`deallocate`](Self::deallocate), or the pool is reset or dropped.
    pub fn allocate(&self, value: T) -> NonNull<T> {
        let mut guard = self.lock();
        let state = &mut *guard;

        let slot = match state.free_list.pop() {
            Some(slot) => slot,
            None => {
                if state.used == self.block_size {
                    state.blocks.push(Block::new(self.block_size));
                    state.used = 0;
                    debug!(
                        blocks = state.blocks.len(),
                        block_size = self.block_size,
                        "memory pool grew"
                    );
                }
                let last = state.blocks.len() - 1;
                let slot = state.blocks[last].slot(state.used);
                state.used += 1;
                slot
            }
        };

        // SAFETY: `slot` is in a live block and not handed to anyone else,
        // so writing into it cannot alias another value.
        unsafe { slot.as_ptr().write(value) };
        state.allocated += 1;
        slot
    }

    /// [`allocate`](Self::allocate) a default-constructed value.
    pub fn allocate_default(&self) -> NonNull<T>
    where
        T: Default,
    {
        self.allocate(T::default())
    }

    /// Drop the value at `ptr` and return its slot to the free list.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this pool, must not
    /// have been deallocated since, and no reset may have happened in
    /// between. The caller must not use `ptr` afterwards.
    pub unsafe fn deallocate(&self, ptr: NonNull<T>) {
        // SAFETY: the caller guarantees `ptr` holds a live value we own.
        unsafe { ptr.as_ptr().drop_in_place() };

        let mut state = self.lock();
        debug_assert!(state.allocated > 0, "deallocate without matching allocate");
        state.free_list.push(ptr);
        state.allocated -= 1;
    }

    /// Discard every block and the free list, then start over with one
    /// empty block.
    ///
    /// Every previously returned address becomes invalid. Values still
    /// allocated are forgotten, not dropped.
    pub fn reset(&self) {
        let mut state = self.lock();
        let leaked = state.allocated;
        *state = PoolState::fresh(self.block_size);
        debug!(leaked, "memory pool reset");
    }

    /// Slots per block.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Slots currently handed out.
    pub fn allocated_count(&self) -> usize {
        self.lock().allocated
    }

    /// Total slots across all blocks.
    pub fn capacity(&self) -> usize {
        self.lock().blocks.len() * self.block_size
    }

    /// Bytes reserved for slots.
    pub fn memory_usage(&self) -> usize {
        self.capacity() * std::mem::size_of::<T>()
    }

    /// Reclaimed slots waiting for reuse.
    pub fn free_count(&self) -> usize {
        self.lock().free_list.len()
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.lock().blocks.len()
    }

    /// Consistent snapshot of all counters.
    pub fn stats(&self) -> PoolStats {
        let state = self.lock();
        let capacity = state.blocks.len() * self.block_size;
        PoolStats {
            allocated: state.allocated,
            capacity,
            free: state.free_list.len(),
            blocks: state.blocks.len(),
            memory_usage: capacity * std::mem::size_of::<T>(),
        }
    }
}

impl<T> Default for MemoryPool<T> {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BLOCK_SIZE)
    }
}

impl<T> std::fmt::Debug for MemoryPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPool")
            .field("block_size", &self.block_size)
            .field("stats", &self.stats())
            .finish()
    }
}
