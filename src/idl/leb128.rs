//! (S)LEB128 encoding of 32-bit words
//!
//! Little-endian base 128: seven payload bits per byte, continuation
//! flag in the high bit, sign extension for the signed variant. The
//! interface wire format uses these for every integer field.
//!
//! Neither encoder terminates or length-prefixes its output and
//! neither returns a count; a caller that needs the length back
//! rescans for the first byte with a clear high bit.

/// Continuation flag
const CONTINUE: u8 = 0x80;

/// Upper bound on the encoded size of any 32-bit input
pub const MAX_ENCODED_SIZE: usize = 5;

/// Encode `n` as unsigned LEB128 into the front of `buf`
///
/// Writes between 1 and [`MAX_ENCODED_SIZE`] bytes. The caller sizes
/// the buffer; a short buffer is a caller bug and panics. Never
/// traps.
pub fn leb128_encode(mut n: u32, buf: &mut [u8]) {
    let mut i = 0;
    loop {
        let byte = (n & 0x7f) as u8;
        n >>= 7;
        if n == 0 {
            buf[i] = byte;
            return;
        }
        buf[i] = byte | CONTINUE;
        i += 1;
    }
}

/// Encode `n` as signed SLEB128 into the front of `buf`
///
/// A single byte iff `n` lies in `[-64, 64)`, where the 7-bit chunk's
/// own sign bit already conveys the sign; otherwise the continuation
/// flag is set and `n` shifts right arithmetically. Same buffer
/// contract as [`leb128_encode`].
pub fn sleb128_encode(mut n: i32, buf: &mut [u8]) {
    let mut i = 0;
    loop {
        let byte = (n & 0x7f) as u8;
        if (-64..64).contains(&n) {
            buf[i] = byte;
            return;
        }
        buf[i] = byte | CONTINUE;
        n >>= 7;
        i += 1;
    }
}
