use hessian2::value::{ListValue, MapValue, ObjectValue, Value};
use hessian2::{from_slice, to_vec};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn roundtrips_null_and_bool() {
    assert_eq!(from_slice(&to_vec(&Value::Null).unwrap()).unwrap(), Value::Null);
    assert_eq!(
        from_slice(&to_vec(&Value::Bool(true)).unwrap()).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        from_slice(&to_vec(&Value::Bool(false)).unwrap()).unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn roundtrips_untyped_list() {
    let list = Value::List(Rc::new(RefCell::new(ListValue {
        type_name: None,
        items: vec![Value::Int(1), Value::String("two".to_string()), Value::Null],
    })));
    let bytes = to_vec(&list).unwrap();
    let decoded = from_slice(&bytes).unwrap();
    match decoded {
        Value::List(rc) => {
            let items = &rc.borrow().items;
            assert_eq!(items[0], Value::Int(1));
            assert_eq!(items[1], Value::String("two".to_string()));
            assert_eq!(items[2], Value::Null);
        }
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn roundtrips_typed_list() {
    let list = Value::List(Rc::new(RefCell::new(ListValue {
        type_name: Some("[int".to_string()),
        items: vec![Value::Int(1), Value::Int(2), Value::Int(3)],
    })));
    let bytes = to_vec(&list).unwrap();
    match from_slice(&bytes).unwrap() {
        Value::List(rc) => {
            let list = rc.borrow();
            assert_eq!(list.type_name.as_deref(), Some("[int"));
            assert_eq!(list.items.len(), 3);
        }
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn roundtrips_untyped_map() {
    let mut entries = IndexMap::new();
    entries.insert(Value::String("a".to_string()), Value::Int(1));
    entries.insert(Value::String("b".to_string()), Value::Int(2));
    let map = Value::Map(Rc::new(RefCell::new(MapValue {
        type_name: None,
        entries,
    })));
    let bytes = to_vec(&map).unwrap();
    match from_slice(&bytes).unwrap() {
        Value::Map(rc) => {
            let map = rc.borrow();
            assert_eq!(map.entries.get(&Value::String("a".to_string())), Some(&Value::Int(1)));
            assert_eq!(map.entries.get(&Value::String("b".to_string())), Some(&Value::Int(2)));
        }
        other => panic!("expected map, got {other:?}"),
    }
}

#[test]
fn roundtrips_object_and_reuses_class_def() {
    let mut fields = IndexMap::new();
    fields.insert("color".to_string(), Value::String("red".to_string()));
    fields.insert("model".to_string(), Value::String("Prius".to_string()));
    let car_a = Value::Object(Rc::new(RefCell::new(ObjectValue {
        class_name: "example.Vehicle".to_string(),
        fields: fields.clone(),
    })));
    let car_b = Value::Object(Rc::new(RefCell::new(ObjectValue {
        class_name: "example.Vehicle".to_string(),
        fields,
    })));
    let list = Value::List(Rc::new(RefCell::new(ListValue {
        type_name: None,
        items: vec![car_a, car_b],
    })));

    let bytes = to_vec(&list).unwrap();
    // Only one class definition should be interned for both instances.
    // The class name is deliberately free of an ASCII 'C' so counting the
    // `CLASS_DEF` tag byte can't be fooled by a literal 'C' inside the
    // class-name string itself (as "example.Car" would produce).
    assert!(!"example.Vehicle".contains('C'));
    assert_eq!(bytes.iter().filter(|&&b| b == b'C').count(), 1);

    match from_slice(&bytes).unwrap() {
        Value::List(rc) => {
            let items = &rc.borrow().items;
            assert_eq!(items.len(), 2);
            for item in items {
                match item {
                    Value::Object(rc) => {
                        let object = rc.borrow();
                        assert_eq!(object.class_name, "example.Vehicle");
                        assert_eq!(
                            object.fields.get("color"),
                            Some(&Value::String("red".to_string()))
                        );
                    }
                    other => panic!("expected object, got {other:?}"),
                }
            }
        }
        other => panic!("expected list, got {other:?}"),
    }
}
