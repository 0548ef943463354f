//! Reference engine (§4.11) for shared and cyclic list/map/object
//! graphs, plus the `Shared<T>` cycle-aware wrapper spec §9 calls for.
//!
//! Grounded in `original_source/object.go` and `list.go`: on the
//! encode side the Go original keys a map by the `reflect.Value`'s
//! heap address (`checkEncodeRefMap`); on the decode side it inserts a
//! placeholder (`addDecoderRef`) into an ordered slice *before* reading
//! a container's interior, so a back-reference encountered while
//! reading that same container's fields resolves to the
//! not-yet-complete value, which is exactly what a self-reference
//! needs.
//!
//! This port replaces "heap address of a `reflect.Value`" with
//! `Rc::as_ptr` of the [`crate::value::Value`] container variants
//! themselves (the encoder side, in `encode_ref_map`), and replaces
//! the decoder's ordered slice-of-placeholders with an ordered
//! `Vec<Value>` of already-`Rc`-wrapped containers (the decode side,
//! in `RefTable`) — because `Value`'s containers are already
//! `Rc<RefCell<_>>`, "insert a handle before reading the interior" is
//! simply "push the `Rc` clone, then mutate through the `RefCell`
//! afterwards", with no separate indirection-record type needed for
//! growable sequences (`RefCell` already allows in-place mutation after
//! the handle has been shared).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Error;
use crate::value::{container_identity, Value};

/// Encoder-side map from a container's identity to the index at which
/// it was first emitted (spec §4.11 "Reference map").
#[derive(Debug, Default)]
pub struct RefMap {
    seen: HashMap<usize, u32>,
    next: u32,
}

impl RefMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards all recorded identities.
    pub fn reset(&mut self) {
        self.seen.clear();
        self.next = 0;
    }

    /// If `value`'s container identity has already been emitted,
    /// returns its index. Otherwise records it as emitted at the next
    /// index and returns `None`.
    pub fn check_and_insert(&mut self, value: &Value) -> Option<u32> {
        let identity = container_identity(value)?;
        if let Some(&index) = self.seen.get(&identity) {
            return Some(index);
        }
        let index = self.next;
        self.next += 1;
        self.seen.insert(identity, index);
        None
    }

    /// Advances the next reference index without recording any
    /// identity to dedup against.
    ///
    /// `Encoder::write_object`'s by-value `HessianClass` path has no
    /// `Rc`-backed container to key on, so it can never itself be the
    /// target of a back-reference — but the decoder's
    /// `RefTable::insert` still counts every object it reads,
    /// including ones written this way (`Decoder::read_object_instance`
    /// makes no distinction). Without this call the two sides' indices
    /// would drift apart as soon as a session mixes `write_object` with
    /// `write_value`/`write_container` calls that do emit back-references.
    pub fn reserve(&mut self) -> u32 {
        let index = self.next;
        self.next += 1;
        index
    }
}

/// Decoder-side ordered list of previously-instantiated containers
/// (spec §4.11 "Reference table").
///
/// Entries are pushed *before* a container's interior is read (the
/// caller clones the `Rc` into both the table and the in-progress
/// decode), so a back-reference read mid-decode of that same container
/// resolves to the same `Rc`, satisfying the cycle law (§8).
#[derive(Debug, Default)]
pub struct RefTable {
    handles: Vec<Value>,
}

impl RefTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards all recorded handles.
    pub fn reset(&mut self) {
        self.handles.clear();
    }

    /// Records `value` as the next handle, returning its index.
    pub fn insert(&mut self, value: Value) -> u32 {
        let index = self.handles.len() as u32;
        self.handles.push(value);
        index
    }

    /// Resolves a back-reference index to its handle.
    pub fn resolve(&self, index: u32) -> Result<Value, Error> {
        self.handles
            .get(index as usize)
            .cloned()
            .ok_or_else(|| Error::reference_out_of_range(index))
    }

    /// Number of handles recorded so far.
    pub fn len(&self) -> usize {
        self.handles.len()
    }
}

/// A cycle-aware wrapper for a host struct field that participates in
/// the reference engine.
///
/// Plain struct fields are encoded/decoded by value and never consult
/// the reference engine (spec §9: "explicit opt-in participation via a
/// cycle-aware wrapper"). Wrap a field in `Shared<T>` when it may point
/// at a container shared elsewhere in the graph, or at itself.
#[derive(Debug)]
pub struct Shared<T>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    /// Wraps `inner` in a fresh, uniquely-owned shared cell.
    pub fn new(inner: T) -> Self {
        Self(Rc::new(RefCell::new(inner)))
    }

    /// Returns another handle to the same underlying cell.
    pub fn clone_handle(&self) -> Self {
        Self(Rc::clone(&self.0))
    }

    /// Runs `f` with a shared borrow of the inner value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.borrow())
    }

    /// Runs `f` with a mutable borrow of the inner value.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }

    /// Identity used by the reference engine: two `Shared<T>` handles
    /// to the same cell share this value.
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        self.clone_handle()
    }
}

impl<T> PartialEq for Shared<T> {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl<T> Eq for Shared<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ListValue, Value};
    use std::cell::RefCell as StdRefCell;
    use std::rc::Rc as StdRc;

    #[test]
    fn ref_map_assigns_increasing_indices() {
        let mut map = RefMap::new();
        let a = Value::List(StdRc::new(StdRefCell::new(ListValue::default())));
        let b = Value::List(StdRc::new(StdRefCell::new(ListValue::default())));
        assert_eq!(map.check_and_insert(&a), None);
        assert_eq!(map.check_and_insert(&b), None);
        assert_eq!(map.check_and_insert(&a), Some(0));
        assert_eq!(map.check_and_insert(&b), Some(1));
    }

    #[test]
    fn reserve_advances_index_without_recording_identity() {
        let mut map = RefMap::new();
        assert_eq!(map.reserve(), 0);
        let a = Value::List(StdRc::new(StdRefCell::new(ListValue::default())));
        // The reserved slot isn't keyed by any identity, so the next
        // real container still gets assigned the following index.
        assert_eq!(map.check_and_insert(&a), None);
        assert_eq!(map.check_and_insert(&a), Some(1));
    }

    #[test]
    fn ref_table_resolves_self_reference() {
        let mut table = RefTable::new();
        let node = Value::List(StdRc::new(StdRefCell::new(ListValue::default())));
        let index = table.insert(node.clone());
        if let Value::List(rc) = &node {
            rc.borrow_mut().items.push(table.resolve(index).unwrap());
        }
        if let Value::List(rc) = &node {
            assert_eq!(rc.borrow().items.len(), 1);
        }
    }

    #[test]
    fn ref_table_out_of_range_is_error() {
        let table = RefTable::new();
        assert!(table.resolve(0).is_err());
    }

    #[test]
    fn shared_clones_share_identity() {
        let a = Shared::new(42i32);
        let b = a.clone_handle();
        assert_eq!(a, b);
        b.with_mut(|v| *v = 7);
        assert_eq!(a.with(|v| *v), 7);
    }
}
