//! Order-preserving, self-delimiting byte encodings.
//!
//! [`OrderedBytesWriter`] appends one primitive at a time. Each primitive is
//! written in its ascending form and then, if the caller asked for
//! [`Direction::Descending`], every byte just written is bitwise-complemented
//! in place. Because complement is applied per-byte to a contiguous range, the
//! concatenation of several complemented ranges behaves exactly like
//! complementing the whole concatenation at once — callers never need to
//! worry about where one primitive's range starts relative to another's.

use bigdecimal::BigDecimal;
use byteorder::{BigEndian, WriteBytesExt};
use num_traits::{Signed, Zero};

/// Sort direction for one column of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn complements(self) -> bool {
        matches!(self, Direction::Descending)
    }
}

/// A single terminator byte for the escaped string/bytes encoding. Chosen so
/// that `0x00` never appears unescaped in the output, making the terminator
/// unambiguous and the encoding prefix-free.
const ESCAPE: u8 = 0x00;
const ESCAPED_ZERO: u8 = 0xFF;
const TERMINATOR: u8 = 0x01;

/// Canonical quiet-NaN bit pattern used for every NaN input, so that all NaNs
/// encode identically regardless of payload.
const CANONICAL_NAN_BITS: u64 = 0x7FF8_0000_0000_0000;

#[derive(Debug, Default, Clone)]
pub struct OrderedBytesWriter {
    buf: Vec<u8>,
}

impl OrderedBytesWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a single raw tag byte, complementing it when descending. Used
    /// for the unset sentinel, whose position relative to present values
    /// does flip with column direction.
    pub fn write_tag_byte(&mut self, tag: u8, dir: Direction) {
        let start = self.buf.len();
        self.buf.push(tag);
        self.complement_from(start, dir);
    }

    /// Writes a single raw tag byte with no direction transform at all. Used
    /// for the dialect null/present tag, whose position relative to
    /// non-null values is fixed by dialect and does *not* flip with column
    /// direction (see [`crate::scalar::encode_scalar`]).
    pub fn write_fixed_byte(&mut self, tag: u8) {
        self.buf.push(tag);
    }

    pub fn write_bool(&mut self, v: bool, dir: Direction) {
        let start = self.buf.len();
        self.buf.push(if v { 0x01 } else { 0x00 });
        self.complement_from(start, dir);
    }

    pub fn write_i64(&mut self, v: i64, dir: Direction) {
        let start = self.buf.len();
        let flipped = (v as u64) ^ 0x8000_0000_0000_0000;
        // unwrap: writing to a Vec<u8> cannot fail.
        self.buf.write_u64::<BigEndian>(flipped).unwrap();
        self.complement_from(start, dir);
    }

    pub fn write_i32(&mut self, v: i32, dir: Direction) {
        let start = self.buf.len();
        let flipped = (v as u32) ^ 0x8000_0000;
        self.buf.write_u32::<BigEndian>(flipped).unwrap();
        self.complement_from(start, dir);
    }

    pub fn write_f64(&mut self, v: f64, dir: Direction) {
        let start = self.buf.len();
        let bits = canonical_f64_bits(v);
        let transformed = if bits & (1 << 63) != 0 {
            !bits
        } else {
            bits ^ (1 << 63)
        };
        self.buf.write_u64::<BigEndian>(transformed).unwrap();
        self.complement_from(start, dir);
    }

    /// Timestamps are `(seconds, nanos)`, each encoded with the Int64 scheme,
    /// seconds first.
    pub fn write_timestamp(&mut self, seconds: i64, nanos: i32, dir: Direction) {
        // A single start marker so seconds and nanos complement as one unit,
        // matching how a single multi-byte primitive would behave.
        let start = self.buf.len();
        let flipped_secs = (seconds as u64) ^ 0x8000_0000_0000_0000;
        self.buf.write_u64::<BigEndian>(flipped_secs).unwrap();
        let flipped_nanos = (nanos as u32) ^ 0x8000_0000;
        self.buf.write_u32::<BigEndian>(flipped_nanos).unwrap();
        self.complement_from(start, dir);
    }

    pub fn write_string(&mut self, v: &str, dir: Direction) {
        self.write_escaped(v.as_bytes(), dir);
    }

    pub fn write_bytes(&mut self, v: &[u8], dir: Direction) {
        self.write_escaped(v, dir);
    }

    fn write_escaped(&mut self, v: &[u8], dir: Direction) {
        let start = self.buf.len();
        for &b in v {
            if b == ESCAPE {
                self.buf.push(ESCAPE);
                self.buf.push(ESCAPED_ZERO);
            } else {
                self.buf.push(b);
            }
        }
        self.buf.push(ESCAPE);
        self.buf.push(TERMINATOR);
        self.complement_from(start, dir);
    }

    /// JSON is encoded as the escaped raw text, no canonicalization.
    pub fn write_json_text(&mut self, v: &str, dir: Direction) {
        self.write_string(v, dir);
    }

    /// Sign-magnitude decimal encoding: a tag byte (negative/zero/positive),
    /// then for nonzero values an order-preserving exponent and normalized,
    /// trailing-zero-stripped significand, terminated.
    pub fn write_numeric(&mut self, v: &BigDecimal, dir: Direction) {
        let start = self.buf.len();
        if v.is_zero() {
            self.buf.push(0x02);
        } else {
            let negative = v.is_negative();
            let abs = v.abs();
            let (bigint, exponent) = abs.as_bigint_and_exponent();
            let digit_string = bigint.to_string();
            let len = digit_string.len() as i64;
            // value == 0.D * 10^e, where D has no leading zero (bigint > 0).
            let e = len - exponent;
            let mut digits: Vec<u8> = digit_string.bytes().map(|b| b - b'0').collect();
            while digits.last() == Some(&0) {
                digits.pop();
            }
            self.buf.push(if negative { 0x01 } else { 0x03 });
            let body_start = self.buf.len();
            let flipped_e = (e as u64) ^ 0x8000_0000_0000_0000;
            self.buf.write_u64::<BigEndian>(flipped_e).unwrap();
            for d in digits {
                self.buf.push(d + 1);
            }
            self.buf.push(0x00);
            if negative {
                for b in &mut self.buf[body_start..] {
                    *b = !*b;
                }
            }
        }
        self.complement_from(start, dir);
    }

    fn complement_from(&mut self, start: usize, dir: Direction) {
        if dir.complements() {
            for b in &mut self.buf[start..] {
                *b = !*b;
            }
        }
    }
}

fn canonical_f64_bits(v: f64) -> u64 {
    if v.is_nan() {
        CANONICAL_NAN_BITS
    } else if v == 0.0 {
        // Collapses -0.0 onto +0.0 so both compare equal.
        0
    } else {
        v.to_bits()
    }
}
