//! Seams for the symbols the embedding host provides
//!
//! The runtime is linked against four host facilities: byte- and
//! word-granular raw allocation, a non-returning trap sink, and a
//! bridge that wraps a zero-terminated byte sequence as a managed
//! text object. Each is a trait here so in-process hosts (tests,
//! benchmarks, embedders) can supply their own.
//!
//! The whole surface is single-threaded: the embedding runtime is
//! assumed to serialise calls, and nothing here suspends or yields.

use std::ffi::CStr;
use std::ptr::NonNull;

use crate::memory::layout::ManagedPtr;
use crate::memory::units::{Bytes, Words};

/// Raw heap allocation
///
/// Infallible by contract: a conforming implementation aborts or
/// diverges on exhaustion rather than returning. The runtime never
/// frees, never retains raw pointers across calls, and leaves the
/// contents of fresh storage exactly as the allocator produced them.
pub trait RawAllocator {
    /// Allocate `n` raw bytes, aligned for a word-sized header
    fn alloc_bytes(&self, n: Bytes) -> NonNull<u8>;

    /// Allocate `n` raw words
    fn alloc_words(&self, n: Words) -> NonNull<u8> {
        self.alloc_bytes(n.to_bytes())
    }
}

/// Non-returning fatal sink
pub trait TrapSink {
    /// Deliver `msg` (raw unterminated bytes) and abandon the current
    /// execution context
    fn trap(&self, msg: &[u8]) -> !;
}

/// Construction of managed text objects from static strings
pub trait TextBridge {
    /// Wrap a zero-terminated byte sequence as a managed text object
    fn text_of_cstr(&self, text: &CStr) -> ManagedPtr;
}

/// The full set of host facilities the runtime entry points need
pub trait Host: RawAllocator + TrapSink + TextBridge {}

impl<T: RawAllocator + TrapSink + TextBridge> Host for T {}
