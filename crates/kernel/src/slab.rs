//! Fixed-block memory slab with an O(1) LIFO free list.
//!
//! The backing store is owned by the slab itself (sized by const generics,
//! the way the teacher crate's link-section statics size their buffers at
//! compile time) rather than handed in by the caller, so there is no
//! lifetime to thread through the H:4 pipeline. The free list is built
//! lazily on first allocation.

use crate::error::KernelError;
use crate::time::Timeout;
use core::cell::{Cell, UnsafeCell};
use core::ptr::NonNull;

struct FreeBlock {
    next: Option<NonNull<FreeBlock>>,
}

pub struct MemSlab<const BLOCK: usize, const COUNT: usize> {
    storage: UnsafeCell<[[u8; BLOCK]; COUNT]>,
    free: Cell<Option<NonNull<FreeBlock>>>,
    used: Cell<usize>,
    initialized: Cell<bool>,
}

unsafe impl<const BLOCK: usize, const COUNT: usize> Sync for MemSlab<BLOCK, COUNT> {}

impl<const BLOCK: usize, const COUNT: usize> MemSlab<BLOCK, COUNT> {
    pub const fn new() -> Self {
        Self {
            storage: UnsafeCell::new([[0u8; BLOCK]; COUNT]),
            free: Cell::new(None),
            used: Cell::new(0),
            initialized: Cell::new(false),
        }
    }

    fn ensure_init(&self) {
        if self.initialized.get() {
            return;
        }
        debug_assert!(BLOCK >= core::mem::size_of::<usize>(), "block too small for free-list link");

        let base = self.storage.get() as *mut u8;
        let mut prev: Option<NonNull<FreeBlock>> = None;
        for i in (0..COUNT).rev() {
            let block_ptr = unsafe { base.add(i * BLOCK) } as *mut FreeBlock;
            unsafe { block_ptr.write(FreeBlock { next: prev }) };
            prev = NonNull::new(block_ptr);
        }
        self.free.set(prev);
        self.initialized.set(true);
    }

    /// Pops the free-list head. `_timeout` is accepted for interface
    /// compatibility with the host's slab API but never blocks — allocation
    /// either succeeds immediately or fails with [`KernelError::ResourceExhausted`].
    pub fn alloc(&self, _timeout: Timeout) -> Result<NonNull<u8>, KernelError> {
        critical_section::with(|_| {
            self.ensure_init();
            match self.free.get() {
                Some(block) => {
                    let next = unsafe { block.as_ref() }.next;
                    self.free.set(next);
                    self.used.set(self.used.get() + 1);
                    Ok(block.cast())
                }
                None => Err(KernelError::ResourceExhausted),
            }
        })
    }

    /// Pushes `ptr` back onto the free list. `ptr` must have come from
    /// [`Self::alloc`] on this same slab and must not be freed twice.
    pub fn free(&self, ptr: NonNull<u8>) {
        critical_section::with(|_| {
            let block: NonNull<FreeBlock> = ptr.cast();
            unsafe { block.as_ptr().write(FreeBlock { next: self.free.get() }) };
            self.free.set(Some(block));
            self.used.set(self.used.get() - 1);
        });
    }

    pub const fn block_size(&self) -> usize {
        BLOCK
    }

    pub const fn capacity(&self) -> usize {
        COUNT
    }

    pub fn used(&self) -> usize {
        critical_section::with(|_| self.used.get())
    }
}

impl<const BLOCK: usize, const COUNT: usize> Default for MemSlab<BLOCK, COUNT> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_exhausts_then_free_restores_full_capacity() {
        static SLAB: MemSlab<16, 4> = MemSlab::new();
        let mut blocks = heapless::Vec::<NonNull<u8>, 4>::new();
        for _ in 0..4 {
            blocks.push(SLAB.alloc(Timeout::NoWait).unwrap()).ok();
        }
        assert_eq!(SLAB.used(), 4);
        assert!(matches!(SLAB.alloc(Timeout::NoWait), Err(KernelError::ResourceExhausted)));

        for b in blocks {
            SLAB.free(b);
        }
        assert_eq!(SLAB.used(), 0);

        // The free list is restored as a set: every block is allocatable
        // again, none lost or duplicated.
        let mut reallocated = heapless::Vec::<NonNull<u8>, 4>::new();
        for _ in 0..4 {
            reallocated.push(SLAB.alloc(Timeout::NoWait).unwrap()).ok();
        }
        assert_eq!(SLAB.used(), 4);
    }

    #[test]
    fn freed_block_is_reused_lifo() {
        static SLAB: MemSlab<8, 2> = MemSlab::new();
        let a = SLAB.alloc(Timeout::NoWait).unwrap();
        let _b = SLAB.alloc(Timeout::NoWait).unwrap();
        SLAB.free(a);
        let c = SLAB.alloc(Timeout::NoWait).unwrap();
        assert_eq!(a, c);
    }
}
