//! Object layout and tagging
//!
//! Every managed heap object begins with a fixed-width tag word that
//! identifies its kind; further header words are kind-specific. The
//! `#[repr(C)]` structs here are the flat view that generated code
//! indexes by word offset, so their shape is ABI and must not change.
//! [`HeapObject`] layers a typed view on top for code that prefers to
//! match on kinds.

use std::ptr::NonNull;

use super::units::Bytes;
use super::units::Words;

/// Object tag
///
/// Not an enum: tags are read back from the heap and can never be
/// matched exhaustively in the face of corruption or code-generator
/// bugs.
pub type Tag = u32;

pub const TAG_ARRAY: Tag = 3;
pub const TAG_BLOB: Tag = 10;

/// Blob header size in words
pub const BLOB_HEADER_SIZE: Words = Words(2);
/// Array header size in words
pub const ARRAY_HEADER_SIZE: Words = Words(2);

/// Common prefix of every managed object
#[repr(C)]
pub struct Obj {
    pub tag: Tag,
}

/// A byte-granular opaque object
///
/// Layout: `[tag:word][length:word][payload bytes]`. The length is
/// the payload byte count requested at allocation and is never
/// mutated afterwards.
#[repr(C)]
pub struct Blob {
    pub header: Obj,
    pub len: Bytes,
    // payload bytes follow; no variable-length field is expressible
    // here so access goes through payload_addr
}

impl Blob {
    /// Address of the first payload byte
    pub unsafe fn payload_addr(this: *mut Self) -> *mut u8 {
        this.add(1) as *mut u8
    }

    /// The payload as a byte slice
    ///
    /// The caller chooses a lifetime no longer than the raw
    /// allocator's ownership of the object.
    pub unsafe fn as_slice<'scope>(this: *mut Self) -> &'scope [u8] {
        std::slice::from_raw_parts(Self::payload_addr(this), (*this).len.0 as usize)
    }
}

/// A word-granular object of managed slots
///
/// Layout: `[tag:word][length:word][slots:length words]`. Each slot
/// holds either a tagged small integer or a managed pointer under the
/// enclosing language's value representation; the runtime treats
/// slots as opaque words.
#[repr(C)]
pub struct Array {
    pub header: Obj,
    pub len: u32,
}

impl Array {
    /// Address of the first slot
    pub unsafe fn payload_addr(this: *mut Self) -> *mut u32 {
        this.add(1) as *mut u32
    }

    /// Read the slot at `idx` (no bounds check)
    pub unsafe fn get(this: *mut Self, idx: u32) -> u32 {
        *Self::payload_addr(this).add(idx as usize)
    }

    /// Write the slot at `idx` (no bounds check)
    pub unsafe fn set(this: *mut Self, idx: u32, value: u32) {
        *Self::payload_addr(this).add(idx as usize) = value;
    }
}

/// Opaque word-sized handle to a managed heap object
///
/// The runtime never frees: ownership of the storage stays with the
/// raw allocator for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedPtr(NonNull<Obj>);

impl ManagedPtr {
    pub fn new(ptr: NonNull<Obj>) -> Self {
        ManagedPtr(ptr)
    }

    pub fn as_obj(self) -> *mut Obj {
        self.0.as_ptr()
    }

    /// The object's tag word
    pub unsafe fn tag(self) -> Tag {
        (*self.as_obj()).tag
    }

    /// View as a blob header (caller has checked the tag)
    pub unsafe fn as_blob(self) -> *mut Blob {
        self.as_obj() as *mut Blob
    }

    /// View as an array header (caller has checked the tag)
    pub unsafe fn as_array(self) -> *mut Array {
        self.as_obj() as *mut Array
    }

    /// Typed view of the object, `None` for an unrecognised tag
    pub unsafe fn classify<'scope>(self) -> Option<HeapObject<'scope>> {
        match self.tag() {
            TAG_BLOB => Some(HeapObject::Blob(&*self.as_blob())),
            TAG_ARRAY => Some(HeapObject::Array(&*self.as_array())),
            _ => None,
        }
    }
}

/// Typed view over a managed object
pub enum HeapObject<'scope> {
    Blob(&'scope Blob),
    Array(&'scope Array),
}
