//! Measurement units for heap arithmetic
//!
//! Header offsets and allocation sizes are expressed either in bytes
//! or in 4-byte machine words depending on the object kind. Newtypes
//! keep the two from being mixed silently.

use std::ops::Add;

/// Size of a machine word on the target ABI
pub const WORD_SIZE: u32 = 4;

/// A count of machine words
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Words(pub u32);

impl Words {
    pub fn to_bytes(self) -> Bytes {
        Bytes(
            self.0
                .checked_mul(WORD_SIZE)
                .expect("word count overflows bytes"),
        )
    }
}

impl Add for Words {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Words(self.0.checked_add(rhs.0).expect("word count overflow"))
    }
}

impl From<Bytes> for Words {
    fn from(bytes: Bytes) -> Words {
        bytes.to_words()
    }
}

/// A count of bytes
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Bytes(pub u32);

impl Bytes {
    /// Words required to hold this many bytes (rounds up)
    pub fn to_words(self) -> Words {
        Words(
            self.0
                .checked_add(WORD_SIZE - 1)
                .expect("byte count overflows words")
                / WORD_SIZE,
        )
    }
}

impl Add for Bytes {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Bytes(self.0.checked_add(rhs.0).expect("byte count overflow"))
    }
}

impl From<Words> for Bytes {
    fn from(words: Words) -> Bytes {
        words.to_bytes()
    }
}

/// Heap footprint of a rust type in words
pub fn size_of<T>() -> Words {
    Bytes(std::mem::size_of::<T>() as u32).to_words()
}
