//! Exercises `#[derive(HessianClass)]` end to end: field renaming,
//! nested structs, optional fields, byte and element lists, and the
//! class-definition reuse across repeated instances.
//!
//! cargo test --features "derive" --test derive

#![cfg(feature = "derive")]

use hessian2::reflect::HessianClass;
use hessian2::{from_slice, Decoder, Encoder, Value};

#[derive(Debug, Clone, PartialEq, HessianClass)]
#[hessian(class = "example.Address")]
struct Address {
    city: String,
    zip: i32,
}

#[derive(Debug, Clone, PartialEq, HessianClass)]
#[hessian(class = "example.Car")]
struct Car {
    color: String,
    mileage: i64,
    #[hessian(rename = "msrp")]
    price: f64,
    tags: Vec<String>,
    thumbnail: Vec<u8>,
    owner_address: Option<Address>,
    previous_owner: Option<Address>,
}

fn sample_car() -> Car {
    Car {
        color: "red".to_string(),
        mileage: 12_345,
        price: 24_999.5,
        tags: vec!["hatchback".to_string(), "hybrid".to_string()],
        thumbnail: vec![0xde, 0xad, 0xbe, 0xef],
        owner_address: Some(Address {
            city: "Springfield".to_string(),
            zip: 90210,
        }),
        previous_owner: None,
    }
}

#[test]
fn field_names_are_lowercase_initial_by_default_and_overridable() {
    assert_eq!(
        Car::field_names(),
        &["color", "mileage", "msrp", "tags", "thumbnail", "owner_address", "previous_owner"]
    );
}

#[test]
fn roundtrips_through_field_values() {
    let car = sample_car();
    let values = car.field_values();
    let mut fields = hessian2::IndexMap::new();
    for (name, value) in Car::field_names().iter().zip(values) {
        fields.insert(name.to_string(), value);
    }
    let back = Car::from_field_values(&fields).unwrap();
    assert_eq!(back, car);
}

#[test]
fn roundtrips_through_the_wire_via_write_object() {
    let car = sample_car();
    let mut buf = Vec::new();
    {
        let mut encoder = Encoder::new(&mut buf);
        encoder.write_object(&car).unwrap();
    }

    let decoded = from_slice(&buf).unwrap();
    let Value::Object(rc) = decoded else {
        panic!("expected an object");
    };
    let object = rc.borrow();
    assert_eq!(object.class_name, "example.Car");
    let fields = Car::from_field_values(&object.fields).unwrap();
    assert_eq!(fields, car);
}

#[test]
fn unknown_wire_field_is_consumed_but_ignored() {
    // A decoded field map carrying an extra "vin" key the Car struct
    // has no field for (§4.10 "Unknown fields") — the decoder already
    // consumed its bytes before handing the map to `from_field_values`.
    let mut fields = hessian2::IndexMap::new();
    fields.insert("color".to_string(), Value::String("blue".to_string()));
    fields.insert("mileage".to_string(), Value::Long(1));
    fields.insert("msrp".to_string(), Value::Double(1.0.into()));
    fields.insert("tags".to_string(), Value::list());
    fields.insert("thumbnail".to_string(), Value::Binary(vec![]));
    fields.insert("owner_address".to_string(), Value::Null);
    fields.insert("previous_owner".to_string(), Value::Null);
    fields.insert("vin".to_string(), Value::String("unknown-to-host".to_string()));

    let car = Car::from_field_values(&fields).unwrap();
    assert_eq!(car.color, "blue");
}

#[test]
fn capitalized_wire_field_name_falls_back_to_exact_then_upper_initial() {
    // §4.10 "Field-name case conversion": the decoder matches fields "by
    // exact name first, then by capitalizing the first letter" — a wire
    // map that arrives with `Color` instead of the expected `color`
    // (e.g. a peer that didn't lowercase-initial on encode) must still
    // resolve.
    let mut fields = hessian2::IndexMap::new();
    fields.insert("Color".to_string(), Value::String("green".to_string()));
    fields.insert("mileage".to_string(), Value::Long(1));
    fields.insert("msrp".to_string(), Value::Double(1.0.into()));
    fields.insert("tags".to_string(), Value::list());
    fields.insert("thumbnail".to_string(), Value::Binary(vec![]));
    fields.insert("owner_address".to_string(), Value::Null);
    fields.insert("previous_owner".to_string(), Value::Null);

    let car = Car::from_field_values(&fields).unwrap();
    assert_eq!(car.color, "green");
}

#[test]
fn write_object_keeps_reference_indices_aligned_with_later_containers() {
    // `write_object`'s by-value path has no `Rc` to dedup on, but the
    // decoder still counts every object it reads into `RefTable`
    // (`Decoder::read_object_instance`). If the encoder didn't also
    // reserve an index for it, a shared container written afterwards in
    // the same session would be assigned an index the decoder has
    // already given to the object, and a later back-reference to that
    // container would resolve to the wrong value.
    let car = sample_car();
    let shared = Value::list();
    if let Value::List(rc) = &shared {
        rc.borrow_mut().items.push(Value::Int(7));
    }

    let mut buf = Vec::new();
    {
        let mut encoder = Encoder::new(&mut buf);
        encoder.write_object(&car).unwrap();
        encoder.write_value(&shared).unwrap();
        encoder.write_value(&shared).unwrap();
    }

    let mut decoder = Decoder::from_slice(&buf);
    let decoded_car = decoder.read_value().unwrap();
    assert!(matches!(decoded_car, Value::Object(_)));
    let first_list = decoder.read_value().unwrap();
    let second_list = decoder.read_value().unwrap();
    assert_eq!(first_list, second_list);
}

#[test]
fn type_map_rejects_unresolvable_class_on_read_typed_value() {
    let car = sample_car();
    let buf = to_vec_object(&car);

    let mut decoder = Decoder::from_slice(&buf);
    assert!(decoder.read_typed_value().is_err());

    let mut types = hessian2::reflect::TypeMap::new();
    hessian2::reflect::register::<Car>(&mut types);
    let mut decoder = Decoder::with_type_map(hessian2::read::SliceReader::new(&buf), types);
    assert!(decoder.read_typed_value().is_ok());
}

fn to_vec_object(car: &Car) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut encoder = Encoder::new(&mut buf);
    encoder.write_object(car).unwrap();
    buf
}
