//! The runtime entry points
//!
//! [`Runtime`] binds the host seams together and provides the
//! exported surface: header-correct blob and array allocation,
//! categorised fatal traps, and the version text. It holds no storage
//! of its own; every object it builds lives in (and is owned by) the
//! host's raw allocator.

use std::cell::Cell;
use std::ffi::CStr;
use std::ptr::NonNull;

use crate::host::Host;
use crate::memory::layout::{
    Array, Blob, ManagedPtr, Obj, ARRAY_HEADER_SIZE, BLOB_HEADER_SIZE, TAG_ARRAY, TAG_BLOB,
};
use crate::memory::units::{Bytes, Words};

/// Category prefix for traps surfaced from the IDL reader
pub const IDL_ERROR_PREFIX: &str = "IDL error: ";
/// Category prefix for traps originated by the runtime itself
pub const RTS_ERROR_PREFIX: &str = "RTS error: ";

/// Largest admissible array length in slots
///
/// The payload must stay addressable as bytes within 32 bits (a
/// factor of four for the word size) and may not exceed half the
/// addressable heap (a further factor of two).
pub const MAX_ARRAY_LEN: u32 = 1 << (32 - 2 - 1);

/// Static version string, zero-terminated for the text bridge
pub const RTS_VERSION: &CStr = c"0.1";

/// Default route for [`Runtime::version`]: wrap the static version
/// string through the host's text bridge. Mostly exercises static
/// strings and call-through-pointer against a real host.
fn get_version<H: Host>(host: &H) -> ManagedPtr {
    host.text_of_cstr(RTS_VERSION)
}

/// Runtime entry points over a borrowed host
pub struct Runtime<'host, H: Host> {
    host: &'host H,
    /// Single-slot rebindable route to the version text. Initialised
    /// to [`get_version`] and never rebound by the runtime itself.
    version_getter: Cell<fn(&H) -> ManagedPtr>,
}

impl<'host, H: Host> Runtime<'host, H> {
    pub fn new(host: &'host H) -> Self {
        Runtime {
            host,
            version_getter: Cell::new(get_version::<H>),
        }
    }

    /// Allocate a blob whose payload holds exactly `n` bytes
    ///
    /// The payload is left as the raw allocator produced it; callers
    /// that rely on zeroing must match the allocator's policy.
    pub fn alloc_blob(&self, n: Bytes) -> ManagedPtr {
        let raw = self.host.alloc_bytes(BLOB_HEADER_SIZE.to_bytes() + n);
        let blob = raw.as_ptr() as *mut Blob;
        // SAFETY: the raw allocator handed us BLOB_HEADER_SIZE words
        // plus the payload, word aligned, so the header writes are in
        // bounds
        unsafe {
            (*blob).header.tag = TAG_BLOB;
            (*blob).len = n;
            ManagedPtr::new(NonNull::new_unchecked(blob as *mut Obj))
        }
    }

    /// Allocate a fresh `n`-byte blob and return its payload pointer
    ///
    /// The blob's header stays reachable only through pointer
    /// arithmetic; with no collector in this runtime the object lives
    /// as long as the raw allocator does.
    pub fn alloc(&self, n: Bytes) -> NonNull<u8> {
        // SAFETY: alloc_blob returns a fresh well-formed blob and the
        // payload address is one header past its non-null base
        unsafe {
            let blob = self.alloc_blob(n).as_blob();
            NonNull::new_unchecked(Blob::payload_addr(blob))
        }
    }

    /// Allocate an array of `len` word slots
    ///
    /// Traps if `len` exceeds [`MAX_ARRAY_LEN`]. The bound is checked
    /// before the size computation so that it cannot wrap. Slots are
    /// left as the raw allocator produced them.
    pub fn alloc_array(&self, len: u32) -> ManagedPtr {
        if len > MAX_ARRAY_LEN {
            self.rts_trap_with("Array allocation too large");
        }
        let raw = self.host.alloc_words(ARRAY_HEADER_SIZE + Words(len));
        let arr = raw.as_ptr() as *mut Array;
        // SAFETY: as for alloc_blob
        unsafe {
            (*arr).header.tag = TAG_ARRAY;
            (*arr).len = len;
            ManagedPtr::new(NonNull::new_unchecked(arr as *mut Obj))
        }
    }

    /// Trap with the IDL category prefix
    ///
    /// The runtime only does the prefixing; IDL decode failures
    /// originate with the external reader.
    pub fn idl_trap_with(&self, body: &str) -> ! {
        self.trap_with_prefix(IDL_ERROR_PREFIX, body)
    }

    /// Trap with the RTS category prefix
    pub fn rts_trap_with(&self, body: &str) -> ! {
        self.trap_with_prefix(RTS_ERROR_PREFIX, body)
    }

    /// Hand `prefix` then `body` to the host sink as one transient
    /// buffer: no terminator, length passed separately. Control does
    /// not return, so the buffer needs no release.
    ///
    /// Every message the runtime itself originates fits the stack
    /// buffer; an oversized caller message spills to an exactly-sized
    /// heap buffer (whose growth aborts rather than traps on
    /// exhaustion).
    fn trap_with_prefix(&self, prefix: &str, body: &str) -> ! {
        const STACK_MSG_BYTES: usize = 128;

        let len = prefix.len() + body.len();
        if len <= STACK_MSG_BYTES {
            let mut msg = [0u8; STACK_MSG_BYTES];
            msg[..prefix.len()].copy_from_slice(prefix.as_bytes());
            msg[prefix.len()..len].copy_from_slice(body.as_bytes());
            self.host.trap(&msg[..len])
        } else {
            let mut msg = Vec::with_capacity(len);
            msg.extend_from_slice(prefix.as_bytes());
            msg.extend_from_slice(body.as_bytes());
            self.host.trap(&msg)
        }
    }

    /// The runtime version as a managed text object
    pub fn version(&self) -> ManagedPtr {
        (self.version_getter.get())(self.host)
    }
}
