//! Wire-format support for the interface-definition layer
//!
//! Only the encoding side lives here; decoding belongs to the
//! external IDL reader.
pub mod leb128;
