//! Reflection bridge (§4.12): host-type name ↔ wire-class name maps,
//! and the `HessianClass` adapter that stands in for compile-time-
//! unknown struct field access.
//!
//! `original_source` walks arbitrary structs with Go's `reflect`
//! package at every encode/decode. Spec §9 ("Reflective field access")
//! recommends the Rust-idiomatic replacement: a derive macro that
//! generates, per struct, the adapter spec §9 names directly —
//! `write_fields`/`read_fields`, here called `HessianClass`. The
//! class-definition table (`object.rs`) becomes this adapter's
//! registry: one [`ClassDef`](crate::object::ClassDef) per
//! `HessianClass` impl that has actually been seen on the wire.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::Error;
use crate::value::{ListValue, ObjectValue, Value};

/// Host-type name → wire class name, populated by the caller (spec §3
/// "Name map"). Read-only and safely shared across sessions.
#[derive(Debug, Clone, Default)]
pub struct NameMap {
    entries: IndexMap<String, String>,
}

impl NameMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `host_name` as encoding to `wire_name`.
    pub fn insert(&mut self, host_name: impl Into<String>, wire_name: impl Into<String>) {
        self.entries.insert(host_name.into(), wire_name.into());
    }

    /// Looks up the wire name for a host type name, falling back to
    /// the host name itself if unregistered (mirrors
    /// `original_source/object.go`'s `writeObject`, which seeds
    /// `nameMap[clsName] = clsName` on first use of an unmapped type).
    pub fn wire_name<'a>(&'a self, host_name: &'a str) -> &'a str {
        self.entries
            .get(host_name)
            .map(String::as_str)
            .unwrap_or(host_name)
    }
}

/// Wire class name → host type descriptor, populated by the caller
/// (spec §3 "Type map"). An absent entry fails a typed-object decode
/// but not an untyped list/map decode.
#[derive(Debug, Clone, Default)]
pub struct TypeMap {
    entries: IndexMap<String, TypeDescriptor>,
}

impl TypeMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a host type under `wire_name`.
    pub fn insert(&mut self, wire_name: impl Into<String>, descriptor: TypeDescriptor) {
        self.entries.insert(wire_name.into(), descriptor);
    }

    /// Looks up the host type descriptor registered for `wire_name`.
    pub fn get(&self, wire_name: &str) -> Option<&TypeDescriptor> {
        self.entries.get(wire_name)
    }
}

/// A caller-supplied factory/parser pair for one host type, keyed by
/// wire class name in a [`TypeMap`].
///
/// This is intentionally a plain function pointer rather than a
/// `dyn Any`-based registry: the decoder only ever needs "build me a
/// `Value::Object`'s fields into this host type", which a free
/// function over `&IndexMap<String, Value>` expresses without unsafe
/// downcasting.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    /// Builds a `Value::Object` already holding (class name, field
    /// values) into a `HessianClass` value, returned boxed as `Value`
    /// so heterogeneous registries stay possible; concrete callers
    /// typically use [`HessianClass::from_field_values`] directly
    /// instead of going through this indirection.
    pub from_fields: fn(&IndexMap<String, Value>) -> Result<Value, Error>,
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor").finish_non_exhaustive()
    }
}

/// Adapter a host struct type implements (normally via
/// `#[derive(HessianClass)]`) to participate in object encode/decode
/// without runtime reflection.
///
/// Grounded in spec §9's recommended replacement for
/// `original_source/object.go`'s `reflect.Value` field walk: the
/// derive macro in `hessian2-derive` generates this trait's methods by
/// reading struct field names and types at compile time instead of at
/// every encode/decode call.
pub trait HessianClass: Sized {
    /// The wire class name this type encodes as (§4.10).
    fn class_name() -> &'static str;

    /// Field names in declaration order, lowercase-initial by default
    /// (§4.10 "Field-name case conversion"), overridable per-field via
    /// `#[hessian(rename = "...")]`.
    fn field_names() -> &'static [&'static str];

    /// Returns this value's fields as wire-ready [`Value`]s, in the
    /// same order as [`Self::field_names`].
    fn field_values(&self) -> Vec<Value>;

    /// Builds a value of this type from a decoded field-name → value
    /// map.
    ///
    /// Per §4.10's "Unknown fields" rule, `fields` may contain keys
    /// absent from [`Self::field_names`] (the decoder has already
    /// consumed their bytes); implementations built by the derive
    /// macro simply ignore keys they don't declare. Missing keys that
    /// *are* declared are filled with each field type's default
    /// decode (numeric coercion happens before this call, in the
    /// decoder).
    fn from_field_values(fields: &IndexMap<String, Value>) -> Result<Self, Error>;
}

/// Lowercases the first ASCII letter of `name`, the default host → wire
/// field rename (§4.10). Non-ASCII-letter leading characters pass
/// through unchanged.
pub fn lower_initial(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Capitalizes the first ASCII letter of `name`, the decoder's
/// fallback match after an exact-name lookup fails (§4.10).
pub fn upper_initial(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Looks up a decoded field by wire name, matching §4.10's "Field-name
/// case conversion": exact name first, then the capitalized-initial
/// fallback. Centralized here (rather than in each derive-generated
/// body) the same way numeric coercion and unknown-field tolerance are
/// centralized in the decoder instead of per derived type.
pub fn lookup_field<'a>(fields: &'a IndexMap<String, Value>, name: &str) -> Option<&'a Value> {
    fields
        .get(name)
        .or_else(|| fields.get(upper_initial(name).as_str()))
}

/// Coerces a decoded numeric [`Value`] into the narrower/wider host
/// integer width requested, per §4.12 "Numeric coercion". Narrowing
/// that would lose data is a decode error.
pub fn coerce_i64(value: &Value, field: &str) -> Result<i64, Error> {
    match value {
        Value::Int(v) => Ok(*v as i64),
        Value::Long(v) => Ok(*v),
        _ => Err(Error::field_kind_mismatch(field.to_string(), "integer")),
    }
}

/// Coerces a decoded numeric [`Value`] into an `i32`, erroring if the
/// wire value doesn't fit (narrowing loses data).
pub fn coerce_i32(value: &Value, field: &str) -> Result<i32, Error> {
    match value {
        Value::Int(v) => Ok(*v),
        Value::Long(v) => i32::try_from(*v)
            .map_err(|_| Error::field_kind_mismatch(field.to_string(), "i32")),
        _ => Err(Error::field_kind_mismatch(field.to_string(), "integer")),
    }
}

/// Coerces a decoded numeric [`Value`] into an `f64` (float32 ↔
/// float64 per §4.12; Hessian has no narrower double form on the
/// wire, so this never loses precision in the widening direction).
pub fn coerce_f64(value: &Value, field: &str) -> Result<f64, Error> {
    match value {
        Value::Double(v) => Ok(v.into_inner()),
        Value::Int(v) => Ok(*v as f64),
        Value::Long(v) => Ok(*v as f64),
        _ => Err(Error::field_kind_mismatch(field.to_string(), "double")),
    }
}

/// Coerces a decoded numeric [`Value`] into an `f32`. Per §4.12,
/// narrowing a wire double into `f32` that cannot round-trip is a
/// decode error (mirrors the `(double)(float)v == v` test the encoder
/// itself uses to pick the float form, §4.4).
pub fn coerce_f32(value: &Value, field: &str) -> Result<f32, Error> {
    let wide = coerce_f64(value, field)?;
    let narrow = wide as f32;
    if narrow as f64 == wide {
        Ok(narrow)
    } else {
        Err(Error::field_kind_mismatch(field.to_string(), "f32"))
    }
}

/// Coerces a decoded numeric [`Value`] into an `i8`, erroring on
/// narrowing that loses data (§4.12 "Numeric coercion").
pub fn coerce_i8(value: &Value, field: &str) -> Result<i8, Error> {
    let wide = coerce_i64(value, field)?;
    i8::try_from(wide).map_err(|_| Error::field_kind_mismatch(field.to_string(), "i8"))
}

/// Coerces a decoded numeric [`Value`] into an `i16`.
pub fn coerce_i16(value: &Value, field: &str) -> Result<i16, Error> {
    let wide = coerce_i64(value, field)?;
    i16::try_from(wide).map_err(|_| Error::field_kind_mismatch(field.to_string(), "i16"))
}

/// Coerces a decoded numeric [`Value`] into a `u8`.
pub fn coerce_u8(value: &Value, field: &str) -> Result<u8, Error> {
    let wide = coerce_i64(value, field)?;
    u8::try_from(wide).map_err(|_| Error::field_kind_mismatch(field.to_string(), "u8"))
}

/// Coerces a decoded numeric [`Value`] into a `u16`.
pub fn coerce_u16(value: &Value, field: &str) -> Result<u16, Error> {
    let wide = coerce_i64(value, field)?;
    u16::try_from(wide).map_err(|_| Error::field_kind_mismatch(field.to_string(), "u16"))
}

/// Coerces a decoded numeric [`Value`] into a `u32`.
pub fn coerce_u32(value: &Value, field: &str) -> Result<u32, Error> {
    let wide = coerce_i64(value, field)?;
    u32::try_from(wide).map_err(|_| Error::field_kind_mismatch(field.to_string(), "u32"))
}

/// Coerces a decoded numeric [`Value`] into a `u64`. The wire's widest
/// integer form is a signed 64-bit long, so this rejects negative
/// values rather than silently reinterpreting their bits.
pub fn coerce_u64(value: &Value, field: &str) -> Result<u64, Error> {
    let wide = coerce_i64(value, field)?;
    u64::try_from(wide).map_err(|_| Error::field_kind_mismatch(field.to_string(), "u64"))
}

/// Coerces a decoded [`Value`] into a `bool`.
pub fn coerce_bool(value: &Value, field: &str) -> Result<bool, Error> {
    match value {
        Value::Bool(v) => Ok(*v),
        _ => Err(Error::field_kind_mismatch(field.to_string(), "boolean")),
    }
}

/// Coerces a decoded [`Value`] into a `String`, cloning it.
pub fn coerce_string(value: &Value, field: &str) -> Result<String, Error> {
    match value {
        Value::String(v) => Ok(v.clone()),
        _ => Err(Error::field_kind_mismatch(field.to_string(), "string")),
    }
}

/// Coerces a decoded [`Value`] into a `Vec<u8>`, cloning it.
pub fn coerce_bytes(value: &Value, field: &str) -> Result<Vec<u8>, Error> {
    match value {
        Value::Binary(v) => Ok(v.clone()),
        _ => Err(Error::field_kind_mismatch(field.to_string(), "binary")),
    }
}

/// Builds a `Value::List` out of a host slice, per §4.12 "Slice/array
/// set" — the derive macro's generated `field_values` bodies call this
/// for `Vec<T>` fields, converting each element with `f`.
pub fn list_value_from<T>(items: &[T], mut f: impl FnMut(&T) -> Value) -> Value {
    let values: Vec<Value> = items.iter().map(|item| f(item)).collect();
    Value::List(Rc::new(RefCell::new(ListValue {
        type_name: None,
        items: values,
    })))
}

/// Coerces a decoded `Value::List` into a host `Vec<T>`, converting
/// each element with `f` (§4.12 "Slice/array set": "each element is
/// converted element-wise using the same coercions").
pub fn coerce_list<T>(
    value: &Value,
    field: &str,
    mut f: impl FnMut(&Value, &str) -> Result<T, Error>,
) -> Result<Vec<T>, Error> {
    match value {
        Value::List(rc) => rc.borrow().items.iter().map(|v| f(v, field)).collect(),
        _ => Err(Error::field_kind_mismatch(field.to_string(), "list")),
    }
}

/// Wraps a `HessianClass` value as a `Value::Object`, used by the derive
/// macro's generated `field_values` bodies for struct-typed fields.
pub fn object_value_from<T: HessianClass>(value: &T) -> Value {
    let fields = T::field_names()
        .iter()
        .map(|name| name.to_string())
        .zip(value.field_values())
        .collect();
    Value::Object(Rc::new(RefCell::new(ObjectValue {
        class_name: T::class_name().to_string(),
        fields,
    })))
}

/// Builds a `HessianClass` value out of a decoded `Value::Object`, used by
/// the derive macro's generated `from_field_values` bodies for
/// struct-typed fields.
pub fn coerce_object<T: HessianClass>(value: &Value, field: &str) -> Result<T, Error> {
    match value {
        Value::Object(rc) => T::from_field_values(&rc.borrow().fields),
        _ => Err(Error::field_kind_mismatch(field.to_string(), "object")),
    }
}

/// Builds a [`TypeDescriptor`] for `T`, for registration in a
/// [`TypeMap`] under `T::class_name()`.
///
/// The descriptor decodes an object's fields into `T` and immediately
/// re-wraps the result as a `Value::Object` — this looks redundant but
/// is the point: it runs every coercion and unknown-field rule
/// `T::from_field_values` declares, so a caller that only has a
/// `TypeMap` (no compile-time `T` in scope, e.g. a generic relay) still
/// gets a decode failure exactly when a direct `T::from_field_values`
/// call would, rather than silently accepting a structurally-wrong
/// object. A caller that does have `T` in scope should prefer calling
/// [`HessianClass::from_field_values`] directly and skip the type map
/// entirely.
pub fn type_descriptor<T: HessianClass>() -> TypeDescriptor {
    TypeDescriptor {
        from_fields: |fields| {
            let typed = T::from_field_values(fields)?;
            Ok(object_value_from(&typed))
        },
    }
}

/// Registers `T` in `types` under its wire class name (§6 "A helper
/// traverses a representative value to populate both" maps — in a
/// compile-time-typed port there is no value to traverse, so the
/// "representative value" is `T` itself, known statically via
/// [`HessianClass`]).
pub fn register<T: HessianClass>(types: &mut TypeMap) {
    types.insert(T::class_name(), type_descriptor::<T>());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_map_falls_back_to_host_name() {
        let map = NameMap::new();
        assert_eq!(map.wire_name("Car"), "Car");
    }

    #[test]
    fn name_map_uses_registered_name() {
        let mut map = NameMap::new();
        map.insert("Car", "example.Car");
        assert_eq!(map.wire_name("Car"), "example.Car");
    }

    #[test]
    fn lower_initial_only_touches_first_char() {
        assert_eq!(lower_initial("Color"), "color");
        assert_eq!(lower_initial("URL"), "uRL");
        assert_eq!(lower_initial(""), "");
    }

    #[test]
    fn upper_initial_roundtrips_lower_initial() {
        assert_eq!(upper_initial(&lower_initial("Model")), "Model");
    }

    #[test]
    fn lookup_field_prefers_exact_name() {
        let mut fields = IndexMap::new();
        fields.insert("color".to_string(), Value::Int(1));
        fields.insert("Color".to_string(), Value::Int(2));
        assert_eq!(lookup_field(&fields, "color"), Some(&Value::Int(1)));
    }

    #[test]
    fn lookup_field_falls_back_to_capitalized_initial() {
        let mut fields = IndexMap::new();
        fields.insert("Color".to_string(), Value::Int(2));
        assert_eq!(lookup_field(&fields, "color"), Some(&Value::Int(2)));
    }

    #[test]
    fn lookup_field_missing_is_none() {
        let fields = IndexMap::new();
        assert_eq!(lookup_field(&fields, "color"), None);
    }

    #[test]
    fn coerce_i32_rejects_lossy_narrowing() {
        let big = Value::Long(i64::MAX);
        assert!(coerce_i32(&big, "count").is_err());
    }

    #[test]
    fn coerce_i64_widens_int() {
        let v = Value::Int(42);
        assert_eq!(coerce_i64(&v, "n").unwrap(), 42);
    }
}
