//! Untyped representation of a decoded Hessian value.
//!
//! Grounded in the teacher's `value/mod.rs` shape (a flat enum carrying
//! one variant per wire form), but the variant set follows spec §3's
//! value domain rather than AMQP's primitive set, the read/write logic
//! lives on the session types in `ser.rs`/`de.rs` rather than in a
//! `serde::Serialize`/`Deserialize` impl (a codec this dynamic has
//! nothing for those traits to dispatch on), and the three container
//! variants wrap `Rc<RefCell<_>>` rather than owning their contents
//! directly. This is the Rust answer to spec §9's "port needs an arena
//! of container slots indexed by identity": an `Rc` clone of a
//! container *is* its identity, so the reference engine (`refs.rs`) can
//! key on `Rc::as_ptr` without a side-table of handles.
//!
//! Equality, ordering and hashing on the three container variants are
//! defined over that `Rc` pointer identity rather than deep structural
//! comparison, because a `Value` can be cyclic (§4.11, §8 cycle law)
//! and a structural comparison would not terminate. See `DESIGN.md` for
//! this Open Question's resolution.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;

/// A decoded (or about-to-be-encoded) Hessian value with no host type
/// attached.
///
/// `List`, `Map`, and `Object` are reference-counted so that the same
/// `Value` can occupy more than one position in a graph — the
/// construction a decoded back-reference (§4.11) produces.
#[derive(Debug, Clone)]
pub enum Value {
    /// `N` — absence of a value.
    Null,
    /// `T` / `F`.
    Bool(bool),
    /// A 32-bit signed integer (§4.2).
    Int(i32),
    /// A 64-bit signed integer (§4.3).
    Long(i64),
    /// An IEEE-754 double (§4.4).
    Double(OrderedFloat<f64>),
    /// Milliseconds or seconds since the Unix epoch (§4.7); the codec
    /// always stores milliseconds internally and decides the wire form
    /// at encode time.
    Date(i64),
    /// A UTF-8 string, already de-chunked (§4.5).
    String(String),
    /// Opaque bytes, already de-chunked (§4.6).
    Binary(Vec<u8>),
    /// An ordered sequence, with an optional wire type name (§4.8).
    List(Rc<RefCell<ListValue>>),
    /// A key/value mapping, with an optional wire type name (§4.9).
    Map(Rc<RefCell<MapValue>>),
    /// A named-class instance with ordered field values (§4.10).
    Object(Rc<RefCell<ObjectValue>>),
}

/// Backing storage for [`Value::List`].
#[derive(Debug, Clone, Default)]
pub struct ListValue {
    /// The wire type name, if the list was typed.
    pub type_name: Option<String>,
    /// Elements in wire order.
    pub items: Vec<Value>,
}

/// Backing storage for [`Value::Map`].
#[derive(Debug, Clone, Default)]
pub struct MapValue {
    /// The wire type name, if the map was typed.
    pub type_name: Option<String>,
    /// Entries in wire (insertion) order.
    pub entries: IndexMap<Value, Value>,
}

/// Backing storage for [`Value::Object`].
#[derive(Debug, Clone, Default)]
pub struct ObjectValue {
    /// The wire class name.
    pub class_name: String,
    /// Field values in class-definition order, keyed by field name.
    pub fields: IndexMap<String, Value>,
}

impl Value {
    /// Returns a new empty untyped list.
    pub fn list() -> Self {
        Value::List(Rc::new(RefCell::new(ListValue::default())))
    }

    /// Returns a new empty untyped map.
    pub fn map() -> Self {
        Value::Map(Rc::new(RefCell::new(MapValue::default())))
    }

    /// `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Identity of a container for pointer-based equality/hashing: the
/// three container variants compare and hash by `Rc` address, never by
/// content, to stay well-defined on cyclic graphs.
pub(crate) fn container_identity(value: &Value) -> Option<usize> {
    match value {
        Value::List(rc) => Some(Rc::as_ptr(rc) as usize),
        Value::Map(rc) => Some(Rc::as_ptr(rc) as usize),
        Value::Object(rc) => Some(Rc::as_ptr(rc) as usize),
        _ => None,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            _ => match (container_identity(self), container_identity(other)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::Int(v) => v.hash(state),
            Value::Long(v) => v.hash(state),
            Value::Double(v) => v.hash(state),
            Value::Date(v) => v.hash(state),
            Value::String(v) => v.hash(state),
            Value::Binary(v) => v.hash(state),
            _ => container_identity(self).hash(state),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Long(a), Value::Long(b)) => a.partial_cmp(b),
            (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
            (Value::Date(a), Value::Date(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            (Value::Binary(a), Value::Binary(b)) => a.partial_cmp(b),
            _ => container_identity(self).partial_cmp(&container_identity(other)),
        }
    }
}

// Conversions from host scalar types, used by the `HessianClass` derive
// macro's generated `field_values` bodies.

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Int(v as i32)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v as i32)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Int(v as i32)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Int(v as i32)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Long(v as i64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Long(v as i64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Double(OrderedFloat(v as f64))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(OrderedFloat(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}
