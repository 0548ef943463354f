#![deny(missing_docs, missing_debug_implementations)]

//! A codec for the Hessian 2.0 binary serialization format.
//!
//! # Encoding and decoding untyped values
//!
//! The untyped [`Value`] type models every form the wire supports —
//! null, booleans, 32-/64-bit integers, doubles, dates, chunked
//! strings and binary, lists, maps, and class-defined objects — with
//! shared and cyclic containers preserved across a round trip.
//!
//! Encoding:
//!
//! - [`to_vec`]
//!
//! Decoding:
//!
//! - [`from_slice`]
//! - [`from_reader`]
//!
//! ```rust
//! use hessian2::{to_vec, from_slice, Value};
//!
//! let buf = to_vec(&Value::Int(42)).unwrap();
//! assert_eq!(from_slice(&buf).unwrap(), Value::Int(42));
//! ```
//!
//! # Shared and cyclic graphs
//!
//! A container that appears more than once in an encoded graph is
//! written once; subsequent occurrences become a back-reference tag,
//! and decoding restores the shared identity rather than duplicating
//! the container:
//!
//! ```rust
//! use hessian2::{to_vec, from_slice, Value};
//!
//! let node = Value::list();
//! if let Value::List(rc) = &node {
//!     rc.borrow_mut().items.push(Value::Int(1));
//!     rc.borrow_mut().items.push(node.clone());
//! }
//! let buf = to_vec(&node).unwrap();
//! let decoded = from_slice(&buf).unwrap();
//! if let Value::List(rc) = &decoded {
//!     assert_eq!(rc.borrow().items[1], decoded);
//! }
//! ```
//!
//! # Typed host structs
//!
//! A struct that derives [`HessianClass`](reflect::HessianClass) (via
//! the `"derive"` feature) encodes and decodes as a named class,
//! without passing through the untyped [`Value`] representation. See
//! [`ser::Encoder::write_object`] and
//! [`reflect::HessianClass::from_field_values`].
//!
//! # Feature flags
//!
//! - `"derive"`: enables the `#[derive(HessianClass)]` macro.

pub mod de;
pub mod error;
pub mod format_code;
pub mod object;
pub mod read;
pub mod reflect;
pub mod refs;
pub mod ser;
pub mod value;

pub use de::{from_reader, from_slice, Decoder};
pub use error::Error;
pub use ser::{to_vec, Encoder};
pub use value::Value;

/// Re-exported so `#[derive(HessianClass)]`'s generated code can name the
/// map type [`reflect::HessianClass::from_field_values`] takes without
/// requiring a direct `indexmap` dependency.
pub use indexmap::IndexMap;

#[cfg(feature = "derive")]
pub use hessian2_derive::HessianClass;
