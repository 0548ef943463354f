//! Wire tag constants for Hessian 2.0.
//!
//! Unlike AMQP1.0's encoding codes, Hessian's tag ranges overlap heavily
//! (a single byte value can mean different things depending on which
//! range it falls in), so this module exposes named byte constants and
//! small range-test helpers rather than an exhaustive `#[repr(u8)]`
//! enum — the dispatch in [`crate::de`] matches on ranges directly.

#![allow(missing_docs)]

/// `N` — null.
pub const NULL: u8 = b'N';
/// `T` — boolean true.
pub const TRUE: u8 = b'T';
/// `F` — boolean false.
pub const FALSE: u8 = b'F';

// ---- integers (§4.2) ----
pub const INT_1B_START: i32 = -16;
pub const INT_1B_END: i32 = 47;
pub const INT_1B_ZERO: u8 = 0x90;

pub const INT_2B_START: i32 = -2048;
pub const INT_2B_END: i32 = 2047;
pub const INT_2B_ZERO: u8 = 0xc8;

pub const INT_3B_START: i32 = -262144;
pub const INT_3B_END: i32 = 262143;
pub const INT_3B_ZERO: u8 = 0xd4;

/// `I` — 5-byte int.
pub const INT_5B: u8 = b'I';

// ---- longs (§4.3) ----
pub const LONG_1B_START: i64 = -8;
pub const LONG_1B_END: i64 = 15;
pub const LONG_1B_ZERO: u8 = 0xe0;

pub const LONG_2B_START: i64 = -2048;
pub const LONG_2B_END: i64 = 2047;
pub const LONG_2B_ZERO: u8 = 0xf8;

pub const LONG_3B_START: i64 = -262144;
pub const LONG_3B_END: i64 = 262143;
pub const LONG_3B_ZERO: u8 = 0x3c;

/// `x59` — 5-byte long (fits in i32).
pub const LONG_5B: u8 = 0x59;
/// `L` — 9-byte long.
pub const LONG_9B: u8 = b'L';

// ---- doubles (§4.4) ----
pub const DOUBLE_ZERO: u8 = 0x5b;
pub const DOUBLE_ONE: u8 = 0x5c;
pub const DOUBLE_BYTE: u8 = 0x5d;
pub const DOUBLE_SHORT: u8 = 0x5e;
pub const DOUBLE_FLOAT: u8 = 0x5f;
/// `D` — 8-byte IEEE-754 double.
pub const DOUBLE_8B: u8 = b'D';

// ---- dates (§4.7) ----
/// `x4a` — milliseconds since epoch.
pub const DATE_MS: u8 = 0x4a;
/// `x4b` — compact form (seconds since epoch, per original_source/date.go).
pub const DATE_COMPACT: u8 = 0x4b;

// ---- strings (§4.5) ----
pub const STRING_SHORT_START: u8 = 0x00;
pub const STRING_SHORT_END: u8 = 0x1f;
pub const STRING_MEDIUM_START: u8 = 0x30;
pub const STRING_MEDIUM_END: u8 = 0x33;
/// `S` — final chunk, two-byte length.
pub const STRING_FINAL: u8 = b'S';
/// `R` — non-final chunk, two-byte length, always 2048 code points.
pub const STRING_CHUNK: u8 = b'R';

pub const STRING_CHUNK_SIZE: usize = 2048;

// ---- binary (§4.6) ----
pub const BINARY_SHORT_START: u8 = 0x20;
pub const BINARY_SHORT_END: u8 = 0x2f;
/// `b` — non-final chunk.
pub const BINARY_CHUNK: u8 = b'b';
/// `B` — final chunk (non-short form).
pub const BINARY_FINAL: u8 = b'B';

pub const BINARY_CHUNK_SIZE: usize = 4096;

// ---- lists (§4.8) ----
pub const LIST_VARIABLE_TYPED: u8 = 0x55;
/// `V` — fixed-length typed list.
pub const LIST_FIXED_TYPED: u8 = b'V';
pub const LIST_SHORT_TYPED_START: u8 = 0x70;
pub const LIST_SHORT_TYPED_END: u8 = 0x77;
pub const LIST_VARIABLE_UNTYPED: u8 = 0x57;
pub const LIST_FIXED_UNTYPED: u8 = 0x58;
pub const LIST_SHORT_UNTYPED_START: u8 = 0x78;
pub const LIST_SHORT_UNTYPED_END: u8 = 0x7f;
/// `Z` — list/map terminator.
pub const LIST_MAP_END: u8 = b'Z';

// ---- maps (§4.9) ----
/// `M` — typed map.
pub const MAP_TYPED: u8 = b'M';
/// `H` — untyped map.
pub const MAP_UNTYPED: u8 = b'H';

// ---- objects (§4.10) ----
/// `C` — class definition.
pub const CLASS_DEF: u8 = b'C';
pub const OBJECT_SHORT_START: u8 = 0x60;
pub const OBJECT_SHORT_END: u8 = 0x6f;
/// `O` — long-form object instance.
pub const OBJECT_LONG: u8 = b'O';

// ---- references (§4.11) ----
/// `x51` — back-reference.
pub const REF: u8 = 0x51;

#[inline]
pub fn is_int_1byte(v: i32) -> bool {
    (INT_1B_START..=INT_1B_END).contains(&v)
}

#[inline]
pub fn is_int_2byte(v: i32) -> bool {
    (INT_2B_START..=INT_2B_END).contains(&v)
}

#[inline]
pub fn is_int_3byte(v: i32) -> bool {
    (INT_3B_START..=INT_3B_END).contains(&v)
}

#[inline]
pub fn is_long_1byte(v: i64) -> bool {
    (LONG_1B_START..=LONG_1B_END).contains(&v)
}

#[inline]
pub fn is_long_2byte(v: i64) -> bool {
    (LONG_2B_START..=LONG_2B_END).contains(&v)
}

#[inline]
pub fn is_long_3byte(v: i64) -> bool {
    (LONG_3B_START..=LONG_3B_END).contains(&v)
}

// ---- decode-side tag-byte ranges ----
//
// The encode-side constants above describe value ranges and a tag
// "zero" base; decoding instead needs to classify an already-read tag
// byte, so these give the byte ranges directly (derived from the same
// base + value-range arithmetic, just precomputed).
pub const INT_1B_TAG_START: u8 = 0x80;
pub const INT_1B_TAG_END: u8 = 0xbf;
pub const INT_2B_TAG_START: u8 = 0xc0;
pub const INT_2B_TAG_END: u8 = 0xcf;
pub const INT_3B_TAG_START: u8 = 0xd0;
pub const INT_3B_TAG_END: u8 = 0xd7;

pub const LONG_1B_TAG_START: u8 = 0xd8;
pub const LONG_1B_TAG_END: u8 = 0xef;
pub const LONG_2B_TAG_START: u8 = 0xf0;
pub const LONG_2B_TAG_END: u8 = 0xff;
pub const LONG_3B_TAG_START: u8 = 0x38;
pub const LONG_3B_TAG_END: u8 = 0x3f;
