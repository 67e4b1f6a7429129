//! Runtime support for compiled programs
//!
//! This crate is linked alongside generated code and provides the few
//! primitives that compiled programs cannot express directly: heap
//! object allocation under a uniform header and tag discipline,
//! non-returning fatal traps with category prefixes, and the
//! (S)LEB128 integer encodings used by the interface-definition wire
//! format.
//!
//! The heavy machinery lives on the other side of the seams in
//! [`host`]: the raw allocator owns all storage, the trap sink
//! terminates execution and the text bridge builds managed text
//! objects. The entry points in [`runtime`] only establish the object
//! layout invariants on top.

pub mod host;
pub mod idl;
pub mod memory;
pub mod runtime;
