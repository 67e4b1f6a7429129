//! A reference region allocator for in-process hosts
//!
//! Provides the [`RawAllocator`] side of the host contract: 32K
//! power-of-two blocks from the system allocator with bump allocation
//! inside the head block, and a dedicated block for any request too
//! big to fit one. Nothing is handed back until the whole region is
//! dropped, which matches the runtime's "allocator owns everything"
//! discipline.
//!
//! Fresh block memory is filled with 0xff in debug builds to keep
//! callers honest about the undefined-contents contract.

use std::alloc::{alloc, dealloc, Layout};
use std::cell::UnsafeCell;
use std::process::abort;
use std::ptr::NonNull;

use thiserror::Error;

use crate::host::RawAllocator;
use crate::memory::units::{Bytes, WORD_SIZE};

/// 32K block
pub const BLOCK_SIZE_BITS: usize = 15;
/// 32K block
pub const BLOCK_SIZE_BYTES: usize = 1 << BLOCK_SIZE_BITS;

/// Alignment ceiling for large blocks (page size)
const MAX_BLOCK_ALIGN: usize = 4096;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockError {
    #[error("block size must be a power of two")]
    BadSize,
    #[error("out of memory")]
    OOM,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocError {
    #[error("allocation request too large")]
    BadRequest,
    #[error("out of memory")]
    OOM,
}

impl From<BlockError> for AllocError {
    fn from(e: BlockError) -> Self {
        match e {
            BlockError::BadSize => AllocError::BadRequest,
            BlockError::OOM => AllocError::OOM,
        }
    }
}

/// A block of memory acquired from the system allocator
#[derive(Debug)]
struct Block {
    /// Pointer to memory
    ptr: NonNull<u8>,
    /// Size of block
    size: usize,
}

impl Block {
    fn new(size: usize) -> Result<Self, BlockError> {
        if !size.is_power_of_two() {
            Err(BlockError::BadSize)
        } else {
            Ok(Block {
                ptr: Self::alloc_block(size)?,
                size,
            })
        }
    }

    fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    fn alloc_block(size: usize) -> Result<NonNull<u8>, BlockError> {
        // SAFETY: size is a nonzero power of two and the alignment is
        // clamped to page size, so the layout is always valid; the
        // pointer is null-checked before wrapping.
        unsafe {
            let align = size.min(MAX_BLOCK_ALIGN);
            let ptr = alloc(Layout::from_size_align_unchecked(size, align));
            if ptr.is_null() {
                Err(BlockError::OOM)
            } else {
                if cfg!(debug_assertions) {
                    // Poison fresh memory to surface reads of
                    // uninitialised payloads
                    std::slice::from_raw_parts_mut(ptr, size).fill(0xff);
                }
                Ok(NonNull::new_unchecked(ptr))
            }
        }
    }

    fn dealloc_block(ptr: NonNull<u8>, size: usize) {
        unsafe {
            dealloc(
                ptr.as_ptr(),
                Layout::from_size_align_unchecked(size, size.min(MAX_BLOCK_ALIGN)),
            )
        }
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        Self::dealloc_block(self.ptr, self.size);
    }
}

/// Bump state within the current head block
#[derive(Debug)]
struct BumpBlock {
    block: Block,
    /// Byte offset of the next free slot
    cursor: usize,
}

impl BumpBlock {
    fn new() -> Result<Self, BlockError> {
        Ok(BumpBlock {
            block: Block::new(BLOCK_SIZE_BYTES)?,
            cursor: 0,
        })
    }

    /// Carve `size` bytes off the front, if they fit
    fn bump(&mut self, size: usize) -> Option<NonNull<u8>> {
        if self.cursor + size > self.block.size {
            None
        } else {
            let ptr = unsafe { self.block.as_ptr().add(self.cursor) };
            self.cursor += size;
            NonNull::new(ptr)
        }
    }
}

#[derive(Debug, Default)]
struct RegionState {
    /// Block currently being bumped
    head: Option<BumpBlock>,
    /// Full blocks, kept live until the region drops
    retired: Vec<BumpBlock>,
    /// Dedicated blocks for oversized requests
    large: Vec<Block>,
}

/// The region allocator
///
/// Interior mutability with no locking: calls are serialised by the
/// embedding per the single-threaded host contract.
#[derive(Debug, Default)]
pub struct Region {
    state: UnsafeCell<RegionState>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks acquired so far (head, retired and large)
    pub fn block_count(&self) -> usize {
        let state = unsafe { &*self.state.get() };
        state.head.is_some() as usize + state.retired.len() + state.large.len()
    }

    /// Allocate `n` bytes, word aligned, rounded up to a whole word
    pub fn try_alloc_bytes(&self, n: Bytes) -> Result<NonNull<u8>, AllocError> {
        let size = word_aligned(n);
        let state = unsafe { &mut *self.state.get() };

        if size > BLOCK_SIZE_BYTES {
            let block_size = size
                .checked_next_power_of_two()
                .ok_or(AllocError::BadRequest)?;
            let block = Block::new(block_size)?;
            let ptr = block.ptr;
            state.large.push(block);
            return Ok(ptr);
        }

        if let Some(head) = state.head.as_mut() {
            if let Some(ptr) = head.bump(size) {
                return Ok(ptr);
            }
        }

        // Head missing or full; start a new one
        let mut head = BumpBlock::new()?;
        let ptr = head.bump(size).ok_or(AllocError::OOM)?;
        if let Some(old) = state.head.replace(head) {
            state.retired.push(old);
        }
        Ok(ptr)
    }
}

impl RawAllocator for Region {
    fn alloc_bytes(&self, n: Bytes) -> NonNull<u8> {
        self.try_alloc_bytes(n).unwrap_or_else(|_| abort())
    }
}

/// Round a byte count up to a whole number of words
fn word_aligned(n: Bytes) -> usize {
    let word = WORD_SIZE as usize;
    (n.0 as usize + word - 1) & !(word - 1)
}
