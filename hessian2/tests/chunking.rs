use hessian2::format_code;
use hessian2::value::Value;
use hessian2::{from_slice, to_vec};

#[test]
fn string_exactly_one_chunk_stays_final() {
    let s: String = std::iter::repeat('x')
        .take(format_code::STRING_CHUNK_SIZE)
        .collect();
    let bytes = to_vec(&Value::String(s.clone())).unwrap();
    assert_eq!(bytes[0], format_code::STRING_FINAL);
    assert_eq!(from_slice(&bytes).unwrap(), Value::String(s));
}

#[test]
fn string_one_char_over_chunk_boundary_splits() {
    let s: String = std::iter::repeat('x')
        .take(format_code::STRING_CHUNK_SIZE + 1)
        .collect();
    let bytes = to_vec(&Value::String(s.clone())).unwrap();
    assert_eq!(bytes[0], format_code::STRING_CHUNK);
    assert_eq!(from_slice(&bytes).unwrap(), Value::String(s));
}

#[test]
fn string_counts_code_points_not_bytes() {
    // each char is a 2-byte UTF-8 sequence; chunking must still split on
    // code point count, not byte count.
    let s: String = std::iter::repeat('\u{00e9}')
        .take(format_code::STRING_CHUNK_SIZE + 10)
        .collect();
    let bytes = to_vec(&Value::String(s.clone())).unwrap();
    assert_eq!(bytes[0], format_code::STRING_CHUNK);
    assert_eq!(from_slice(&bytes).unwrap(), Value::String(s));
}

#[test]
fn binary_exactly_one_chunk_stays_final() {
    let data: Vec<u8> = (0..format_code::BINARY_CHUNK_SIZE)
        .map(|i| (i % 256) as u8)
        .collect();
    let bytes = to_vec(&Value::Binary(data.clone())).unwrap();
    assert_eq!(bytes[0], format_code::BINARY_FINAL);
    assert_eq!(from_slice(&bytes).unwrap(), Value::Binary(data));
}

#[test]
fn binary_one_byte_over_chunk_boundary_splits() {
    let data: Vec<u8> = (0..format_code::BINARY_CHUNK_SIZE + 1)
        .map(|i| (i % 256) as u8)
        .collect();
    let bytes = to_vec(&Value::Binary(data.clone())).unwrap();
    assert_eq!(bytes[0], format_code::BINARY_CHUNK);
    assert_eq!(from_slice(&bytes).unwrap(), Value::Binary(data));
}

#[test]
fn short_binary_form_used_under_sixteen_bytes() {
    let data = vec![1u8, 2, 3];
    let bytes = to_vec(&Value::Binary(data.clone())).unwrap();
    assert_eq!(bytes[0], format_code::BINARY_SHORT_START + 3);
    assert_eq!(from_slice(&bytes).unwrap(), Value::Binary(data));
}
