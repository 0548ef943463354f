//! Encoder implementation

use std::io::Write;

use crate::error::Error;
use crate::format_code;
use crate::object::{object_instance_tag, ClassDef, ClassDefTable, ObjectInstanceTag};
use crate::reflect::{lower_initial, HessianClass, NameMap};
use crate::refs::RefMap;
use crate::value::Value;

/// Serializes `value` into a fresh byte vector.
pub fn to_vec(value: &Value) -> Result<Vec<u8>, Error> {
    let mut writer = Vec::new();
    let mut encoder = Encoder::new(&mut writer);
    encoder.write_value(value)?;
    Ok(writer)
}

/// A session that encodes values into Hessian 2.0 wire format.
///
/// Holds the per-stream tables spec §4.13 assigns to the encoder side:
/// the class-definition table and the reference map. The name map is
/// caller-supplied and may be shared read-only across sessions (§5
/// "Shared resources").
#[derive(Debug)]
pub struct Encoder<W> {
    writer: W,
    class_defs: ClassDefTable,
    refs: RefMap,
    names: NameMap,
}

impl<W: Write> From<W> for Encoder<W> {
    fn from(writer: W) -> Self {
        Self::new(writer)
    }
}

impl<W: Write> Encoder<W> {
    /// Creates a new encoder writing to `writer`, with an empty name
    /// map.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            class_defs: ClassDefTable::new(),
            refs: RefMap::new(),
            names: NameMap::new(),
        }
    }

    /// Creates a new encoder using a caller-populated name map.
    pub fn with_name_map(writer: W, names: NameMap) -> Self {
        Self {
            writer,
            class_defs: ClassDefTable::new(),
            refs: RefMap::new(),
            names,
        }
    }

    /// Clears the class-definition table and reference map. Sessions
    /// are reset between independent top-level values (spec §3
    /// Lifecycle) — the protocol does not span such values with shared
    /// references by default.
    pub fn reset(&mut self) {
        self.class_defs.reset();
        self.refs.reset();
    }

    /// Consumes the encoder, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_tag(&mut self, tag: u8) -> Result<(), Error> {
        self.writer.write_all(&[tag])?;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.writer.write_all(bytes)?;
        Ok(())
    }

    /// Writes one complete value, dispatching on its runtime variant.
    ///
    /// Mirrors `original_source`'s `WriteData` switch, but as an
    /// exhaustive match over a sum type rather than a type-assertion
    /// chain (spec §9 "Dynamic dispatch by wire tag").
    pub fn write_value(&mut self, value: &Value) -> Result<(), Error> {
        match value {
            Value::Null => self.write_tag(format_code::NULL),
            Value::Bool(b) => self.write_bool(*b),
            Value::Int(v) => self.write_int(*v),
            Value::Long(v) => self.write_long(*v),
            Value::Double(v) => self.write_double(v.into_inner()),
            Value::Date(millis) => self.write_date(*millis),
            Value::String(s) => self.write_string(s),
            Value::Binary(b) => self.write_binary(b),
            Value::List(_) | Value::Map(_) | Value::Object(_) => self.write_container(value),
        }
    }

    /// Writes the next value in a multi-value stream sharing this
    /// session's class-definition table and reference map with whatever
    /// was written before it (spec §4.13 "streaming ... write next").
    /// Identical to [`Self::write_value`] — the session's tables persist
    /// across calls by default; call [`Self::reset`] between
    /// independent top-level values per spec §3's Lifecycle rule.
    pub fn write_next(&mut self, value: &Value) -> Result<(), Error> {
        self.write_value(value)
    }

    fn write_container(&mut self, value: &Value) -> Result<(), Error> {
        if let Some(index) = self.refs.check_and_insert(value) {
            return self.write_ref(index);
        }
        match value {
            Value::List(list) => {
                let list = list.borrow();
                self.write_list(list.type_name.as_deref(), &list.items)
            }
            Value::Map(map) => {
                let map = map.borrow();
                self.write_map(map.type_name.as_deref(), map.entries.iter())
            }
            Value::Object(object) => {
                let object = object.borrow();
                self.write_object_value(&object.class_name, &object.fields)
            }
            _ => unreachable!("write_container only called for container variants"),
        }
    }

    /// §4.2 — shortest-form 32-bit integer.
    pub fn write_int(&mut self, v: i32) -> Result<(), Error> {
        if format_code::is_int_1byte(v) {
            self.write_tag((format_code::INT_1B_ZERO as i32 + v) as u8)
        } else if format_code::is_int_2byte(v) {
            let b0 = (format_code::INT_2B_ZERO as i32 + (v >> 8)) as u8;
            let b1 = (v & 0xff) as u8;
            self.write_bytes(&[b0, b1])
        } else if format_code::is_int_3byte(v) {
            let b0 = (format_code::INT_3B_ZERO as i32 + (v >> 16)) as u8;
            let b1 = ((v >> 8) & 0xff) as u8;
            let b2 = (v & 0xff) as u8;
            self.write_bytes(&[b0, b1, b2])
        } else {
            self.write_tag(format_code::INT_5B)?;
            self.write_bytes(&v.to_be_bytes())
        }
    }

    /// §4.3 — shortest-form 64-bit integer.
    pub fn write_long(&mut self, v: i64) -> Result<(), Error> {
        if format_code::is_long_1byte(v) {
            self.write_tag((format_code::LONG_1B_ZERO as i64 + v) as u8)
        } else if format_code::is_long_2byte(v) {
            let b0 = (format_code::LONG_2B_ZERO as i64 + (v >> 8)) as u8;
            let b1 = (v & 0xff) as u8;
            self.write_bytes(&[b0, b1])
        } else if format_code::is_long_3byte(v) {
            let b0 = (format_code::LONG_3B_ZERO as i64 + (v >> 16)) as u8;
            let b1 = ((v >> 8) & 0xff) as u8;
            let b2 = (v & 0xff) as u8;
            self.write_bytes(&[b0, b1, b2])
        } else if let Ok(as_i32) = i32::try_from(v) {
            self.write_tag(format_code::LONG_5B)?;
            self.write_bytes(&as_i32.to_be_bytes())
        } else {
            self.write_tag(format_code::LONG_9B)?;
            self.write_bytes(&v.to_be_bytes())
        }
    }

    /// §4.4 — shortest lossless double encoding.
    pub fn write_double(&mut self, v: f64) -> Result<(), Error> {
        if v == 0.0 {
            return self.write_tag(format_code::DOUBLE_ZERO);
        }
        if v == 1.0 {
            return self.write_tag(format_code::DOUBLE_ONE);
        }
        if v == (v as i64) as f64 {
            let as_int = v as i64;
            if (-128..=127).contains(&as_int) {
                self.write_tag(format_code::DOUBLE_BYTE)?;
                return self.write_bytes(&[as_int as u8]);
            }
            if (-32768..=32767).contains(&as_int) {
                self.write_tag(format_code::DOUBLE_SHORT)?;
                return self.write_bytes(&(as_int as i16).to_be_bytes());
            }
        }
        if v == (v as f32) as f64 {
            self.write_tag(format_code::DOUBLE_FLOAT)?;
            return self.write_bytes(&(v as f32).to_be_bytes());
        }
        self.write_tag(format_code::DOUBLE_8B)?;
        self.write_bytes(&v.to_be_bytes())
    }

    fn write_bool(&mut self, v: bool) -> Result<(), Error> {
        self.write_tag(if v {
            format_code::TRUE
        } else {
            format_code::FALSE
        })
    }

    /// §4.7 — date. `millis` is milliseconds since the Unix epoch; `0`
    /// is reserved by this crate for "unset" and writes `'N'`, matching
    /// spec §4.7's "A zero/unset instant encodes as the null tag".
    ///
    /// The compact 4-byte form is chosen when the instant is aligned to
    /// a whole second. Per `original_source/date.go` (and the Open
    /// Question this resolves, recorded in `DESIGN.md`), the 4 bytes
    /// that follow are **seconds** since the epoch, not minutes,
    /// reproducing the original's exact on-wire behavior rather than
    /// the format's prose description.
    pub fn write_date(&mut self, millis: i64) -> Result<(), Error> {
        if millis == 0 {
            return self.write_tag(format_code::NULL);
        }
        if millis % 1000 == 0 {
            let seconds = millis / 1000;
            if let Ok(seconds) = i32::try_from(seconds) {
                self.write_tag(format_code::DATE_COMPACT)?;
                return self.write_bytes(&seconds.to_be_bytes());
            }
        }
        self.write_tag(format_code::DATE_MS)?;
        self.write_bytes(&millis.to_be_bytes())
    }

    /// §4.5 — chunked UTF-8 string.
    pub fn write_string(&mut self, s: &str) -> Result<(), Error> {
        let chars: Vec<char> = s.chars().collect();
        let mut offset = 0;
        if chars.is_empty() {
            return self.write_string_chunk(&chars[0..0], true);
        }
        while offset < chars.len() {
            let remaining = chars.len() - offset;
            if remaining > format_code::STRING_CHUNK_SIZE {
                let end = offset + format_code::STRING_CHUNK_SIZE;
                self.write_string_chunk(&chars[offset..end], false)?;
                offset = end;
            } else {
                self.write_string_chunk(&chars[offset..], true)?;
                offset = chars.len();
            }
        }
        Ok(())
    }

    fn write_string_chunk(&mut self, chunk: &[char], is_final: bool) -> Result<(), Error> {
        let len = chunk.len();
        if is_final && len <= 31 {
            self.write_tag(format_code::STRING_SHORT_START + len as u8)?;
        } else if is_final && len <= 1023 {
            let b0 = format_code::STRING_MEDIUM_START + (len >> 8) as u8;
            let b1 = (len & 0xff) as u8;
            self.write_bytes(&[b0, b1])?;
        } else {
            let tag = if is_final {
                format_code::STRING_FINAL
            } else {
                format_code::STRING_CHUNK
            };
            let len = u16::try_from(len).map_err(|_| Error::too_long())?;
            self.write_tag(tag)?;
            self.write_bytes(&len.to_be_bytes())?;
        }
        let mut buf = [0u8; 4];
        for &c in chunk {
            self.write_bytes(c.encode_utf8(&mut buf).as_bytes())?;
        }
        Ok(())
    }

    /// §4.6 — chunked opaque binary.
    pub fn write_binary(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if bytes.is_empty() {
            return self.write_tag(format_code::BINARY_SHORT_START);
        }
        let mut offset = 0;
        while offset < bytes.len() {
            let remaining = bytes.len() - offset;
            if remaining > format_code::BINARY_CHUNK_SIZE {
                let end = offset + format_code::BINARY_CHUNK_SIZE;
                self.write_binary_chunk(&bytes[offset..end], false)?;
                offset = end;
            } else {
                self.write_binary_chunk(&bytes[offset..], true)?;
                offset = bytes.len();
            }
        }
        Ok(())
    }

    fn write_binary_chunk(&mut self, chunk: &[u8], is_final: bool) -> Result<(), Error> {
        let len = chunk.len();
        if is_final && len <= 15 {
            self.write_tag(format_code::BINARY_SHORT_START + len as u8)?;
        } else {
            let tag = if is_final {
                format_code::BINARY_FINAL
            } else {
                format_code::BINARY_CHUNK
            };
            let len = u16::try_from(len).map_err(|_| Error::too_long())?;
            self.write_tag(tag)?;
            self.write_bytes(&len.to_be_bytes())?;
        }
        self.write_bytes(chunk)
    }

    /// §4.8 — writes a list. `type_name` absent means untyped; the
    /// element count always fits the fixed-length forms since `items`
    /// is fully materialized in memory (the variable-length/`'Z'`-
    /// terminated forms exist for streaming producers, which this
    /// in-memory `Value` representation never needs to emit, though
    /// the decoder still accepts them on read).
    pub fn write_list<'a>(
        &mut self,
        type_name: Option<&str>,
        items: impl IntoIterator<Item = &'a Value>,
    ) -> Result<(), Error> {
        let items: Vec<&Value> = items.into_iter().collect();
        let len = items.len();
        match type_name {
            Some(name) => {
                let max_short = (format_code::LIST_SHORT_TYPED_END
                    - format_code::LIST_SHORT_TYPED_START) as usize;
                if len <= max_short {
                    self.write_tag(format_code::LIST_SHORT_TYPED_START + len as u8)?;
                } else {
                    self.write_tag(format_code::LIST_FIXED_TYPED)?;
                }
                self.write_string(name)?;
                if len > max_short {
                    self.write_int(len as i32)?;
                }
            }
            None => {
                let max_short = (format_code::LIST_SHORT_UNTYPED_END
                    - format_code::LIST_SHORT_UNTYPED_START) as usize;
                if len <= max_short {
                    self.write_tag(format_code::LIST_SHORT_UNTYPED_START + len as u8)?;
                } else {
                    self.write_tag(format_code::LIST_FIXED_UNTYPED)?;
                    self.write_int(len as i32)?;
                }
            }
        }
        for item in items {
            self.write_value(item)?;
        }
        Ok(())
    }

    /// §4.9 — writes a map. `type_name` absent means untyped.
    pub fn write_map<'a>(
        &mut self,
        type_name: Option<&str>,
        entries: impl IntoIterator<Item = (&'a Value, &'a Value)>,
    ) -> Result<(), Error> {
        match type_name {
            Some(name) => {
                self.write_tag(format_code::MAP_TYPED)?;
                self.write_string(name)?;
            }
            None => self.write_tag(format_code::MAP_UNTYPED)?,
        }
        for (key, value) in entries {
            self.write_value(key)?;
            self.write_value(value)?;
        }
        self.write_tag(format_code::LIST_MAP_END)
    }

    /// Writes an untyped map whose entries are (field name, value)
    /// pairs backing a struct-as-map encode, keyed by `&str` for
    /// callers that don't already hold `Value` keys.
    pub fn write_field_map<'a>(
        &mut self,
        type_name: Option<&str>,
        fields: impl IntoIterator<Item = (&'a str, &'a Value)>,
    ) -> Result<(), Error> {
        match type_name {
            Some(name) => {
                self.write_tag(format_code::MAP_TYPED)?;
                self.write_string(name)?;
            }
            None => self.write_tag(format_code::MAP_UNTYPED)?,
        }
        for (key, value) in fields {
            self.write_string(key)?;
            self.write_value(value)?;
        }
        self.write_tag(format_code::LIST_MAP_END)
    }

    fn write_object_value(
        &mut self,
        class_name: &str,
        fields: &indexmap::IndexMap<String, Value>,
    ) -> Result<(), Error> {
        let index = match self.class_defs.index_of(class_name) {
            Some(index) => index,
            None => {
                let names: Vec<String> = fields.keys().cloned().collect();
                self.write_class_def(class_name, &names)?
            }
        };
        self.write_object_instance_tag(index)?;
        for value in fields.values() {
            self.write_value(value)?;
        }
        Ok(())
    }

    fn write_class_def(&mut self, class_name: &str, fields: &[String]) -> Result<usize, Error> {
        self.write_tag(format_code::CLASS_DEF)?;
        self.write_string(class_name)?;
        self.write_int(fields.len() as i32)?;
        for field in fields {
            self.write_string(field)?;
        }
        Ok(self.class_defs.push(ClassDef {
            name: class_name.to_string(),
            fields: fields.to_vec(),
        }))
    }

    fn write_object_instance_tag(&mut self, index: usize) -> Result<(), Error> {
        match object_instance_tag(index) {
            ObjectInstanceTag::Short(tag) => self.write_tag(tag),
            ObjectInstanceTag::Long(index) => {
                self.write_tag(format_code::OBJECT_LONG)?;
                self.write_int(index)
            }
        }
    }

    /// §4.11 — writes a back-reference.
    fn write_ref(&mut self, index: u32) -> Result<(), Error> {
        self.write_tag(format_code::REF)?;
        self.write_int(index as i32)
    }

    /// Writes a host struct implementing [`HessianClass`] as an
    /// object, handling field renaming and class-definition interning.
    ///
    /// This is the non-`Value` encode path: callers with a concrete
    /// `#[derive(HessianClass)]` type skip building an intermediate
    /// `Value::Object` entirely.
    pub fn write_object<T: HessianClass>(&mut self, value: &T) -> Result<(), Error> {
        // Keeps this session's reference indices aligned with the
        // decoder, which inserts a handle into `RefTable` for every
        // object it reads regardless of which encoder path wrote it
        // (see `RefMap::reserve`).
        self.refs.reserve();
        let class_name = self.names.wire_name(T::class_name()).to_string();
        let index = match self.class_defs.index_of(&class_name) {
            Some(index) => index,
            None => {
                let fields: Vec<String> =
                    T::field_names().iter().map(|f| lower_initial(f)).collect();
                self.write_class_def(&class_name, &fields)?
            }
        };
        self.write_object_instance_tag(index)?;
        for field in value.field_values() {
            self.write_value(&field)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_shortest_int_forms() {
        assert_eq!(to_vec(&Value::Int(-17)).unwrap().len(), 2);
        assert_eq!(to_vec(&Value::Int(-16)).unwrap().len(), 1);
        assert_eq!(to_vec(&Value::Int(47)).unwrap().len(), 1);
        assert_eq!(to_vec(&Value::Int(48)).unwrap().len(), 2);
    }

    #[test]
    fn writes_shortest_long_forms() {
        assert_eq!(to_vec(&Value::Long(-9)).unwrap().len(), 2);
        assert_eq!(to_vec(&Value::Long(-8)).unwrap().len(), 1);
        assert_eq!(to_vec(&Value::Long(15)).unwrap().len(), 1);
        assert_eq!(to_vec(&Value::Long(16)).unwrap().len(), 2);
    }

    #[test]
    fn writes_zero_and_one_double_compactly() {
        assert_eq!(to_vec(&Value::Double(0.0.into())).unwrap(), vec![0x5b]);
        assert_eq!(to_vec(&Value::Double(1.0.into())).unwrap(), vec![0x5c]);
    }

    #[test]
    fn writes_double_float_form_when_lossless() {
        let bytes = to_vec(&Value::Double(1.5.into())).unwrap();
        assert_eq!(bytes[0], format_code::DOUBLE_FLOAT);
        assert_eq!(bytes.len(), 5);
    }

    #[test]
    fn writes_double_8byte_when_not_float_compatible() {
        let bytes = to_vec(&Value::Double(0.1.into())).unwrap();
        assert_eq!(bytes[0], format_code::DOUBLE_8B);
        assert_eq!(bytes.len(), 9);
    }

    #[test]
    fn writes_short_string() {
        let bytes = to_vec(&Value::String("hi".to_string())).unwrap();
        assert_eq!(bytes[0], 0x02);
        assert_eq!(&bytes[1..], b"hi");
    }

    #[test]
    fn writes_empty_binary_as_single_byte() {
        let bytes = to_vec(&Value::Binary(Vec::new())).unwrap();
        assert_eq!(bytes, vec![format_code::BINARY_SHORT_START]);
    }

    #[test]
    fn date_uses_compact_form_on_second_boundary() {
        let bytes = to_vec(&Value::Date(5_000)).unwrap();
        assert_eq!(bytes[0], format_code::DATE_COMPACT);
        assert_eq!(bytes.len(), 5);
    }

    #[test]
    fn date_uses_millisecond_form_otherwise() {
        let bytes = to_vec(&Value::Date(1_234)).unwrap();
        assert_eq!(bytes[0], format_code::DATE_MS);
        assert_eq!(bytes.len(), 9);
    }

    #[test]
    fn shared_list_emits_one_body_and_a_ref() {
        let inner = Value::list();
        if let Value::List(rc) = &inner {
            rc.borrow_mut().items.push(Value::Int(1));
        }
        let outer = Value::list();
        if let Value::List(rc) = &outer {
            rc.borrow_mut().items.push(inner.clone());
            rc.borrow_mut().items.push(inner);
        }
        let bytes = to_vec(&outer).unwrap();
        // short untyped list of 2, then nested short list of 1 holding
        // Int(1), then a ref tag back to it.
        assert!(bytes.contains(&format_code::REF));
    }
}
