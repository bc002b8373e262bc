//! Randomized checks over generated values.

use rand::Rng;

use bare::{Codec, Config, DecodeError, ErrorKind, Schema, Value, Width};

const ROUNDS: usize = 200;

fn order_schema() -> Schema {
    Schema::structure([
        ("id", Schema::uint()),
        ("delta", Schema::int()),
        ("qty", Schema::Uint(Width::W16)),
        ("price", Schema::F64),
        ("paid", Schema::Bool),
        ("note", Schema::optional(Schema::Str)),
        ("digest", Schema::FixedData(4)),
        ("tags", Schema::slice(Schema::Str)),
        ("status", Schema::enumeration([("OPEN", 0), ("SHIPPED", 1), ("CLOSED", 5)])),
        (
            "payment",
            Schema::union([
                ("CARD", 0, Schema::Data),
                ("CASH", 1, Schema::Void),
                ("POINTS", 4, Schema::Int(Width::W32)),
            ]),
        ),
        ("extra", Schema::map(Schema::Str, Schema::uint())),
    ])
}

fn random_str<R: Rng>(rng: &mut R) -> String {
    let len = rng.gen_range(0..12);
    (0..len).map(|_| rng.gen::<char>()).collect()
}

fn random_order<R: Rng>(rng: &mut R) -> Value {
    let note = match rng.gen_bool(0.5) {
        true => Value::present(Value::Str(random_str(rng))),
        false => Value::absent(),
    };

    let tags = (0..rng.gen_range(0..4))
        .map(|_| Value::Str(random_str(rng)))
        .collect();

    let payment = match rng.gen_range(0..3) {
        0 => Value::union(0, Value::Data((0..rng.gen_range(0..8)).map(|_| rng.gen()).collect())),
        1 => Value::union(1, Value::Void),
        _ => Value::union(4, Value::Int(rng.gen::<i32>() as i64)),
    };

    // distinct keys
    let extra = (0..rng.gen_range(0..4u64))
        .map(|i| (Value::Str(format!("k{}", i)), Value::Uint(rng.gen())))
        .collect();

    Value::Struct(vec![
        Value::Uint(rng.gen::<u64>() >> rng.gen_range(0..64)),
        Value::Int(rng.gen::<i64>() >> rng.gen_range(0..64)),
        Value::Uint(rng.gen::<u16>() as u64),
        Value::F64(rng.gen()),
        Value::Bool(rng.gen()),
        note,
        Value::Data(rng.gen::<[u8; 4]>().to_vec()),
        Value::Array(tags),
        Value::Enum([0, 1, 5][rng.gen_range(0..3)]),
        payment,
        Value::Map(extra),
    ])
}

#[test]
fn test_random_round_trip() {
    let codec = Codec::new(order_schema()).unwrap();
    let mut rng = rand::thread_rng();

    for _ in 0..ROUNDS {
        let value = random_order(&mut rng);
        let bytes = codec.encode(&value).unwrap();

        assert_eq!(codec.decode(&bytes).unwrap(), value);

        // canonical: re-encoding the decoded value gives the same bytes
        let again = codec.encode(&codec.decode(&bytes).unwrap()).unwrap();
        assert_eq!(again, bytes);
    }
}

#[test]
fn test_every_prefix_fails() {
    let codec = Codec::new(order_schema()).unwrap();
    let mut rng = rand::thread_rng();

    for _ in 0..ROUNDS / 10 {
        let value = random_order(&mut rng);
        let bytes = codec.encode(&value).unwrap();

        for end in 0..bytes.len() {
            let err = codec.decode(&bytes[..end]).unwrap_err();
            assert_eq!(err.kind, ErrorKind::TruncatedInput, "prefix of {} bytes", end);
            assert!(err.offset <= end);
        }
    }
}

#[test]
fn test_trailing_bytes_rejected() {
    let codec = Codec::new(order_schema()).unwrap();
    let mut bytes = codec.encode(&random_order(&mut rand::thread_rng())).unwrap();
    let end = bytes.len();
    bytes.push(0);

    assert_eq!(
        codec.decode(&bytes).unwrap_err(),
        DecodeError::new(ErrorKind::TrailingBytes, end)
    );
}

#[test]
fn test_tag_one_past_maximum() {
    let enum_schema = Schema::enumeration([("A", 0), ("B", 1), ("C", 2)]);
    assert_eq!(
        bare::decode(&[3], &enum_schema).unwrap_err(),
        DecodeError::new(ErrorKind::UnknownEnumTag, 0)
    );

    let union_schema = Schema::union([("A", 0, Schema::Bool), ("B", 1, Schema::Void)]);
    assert_eq!(
        bare::decode(&[2, 1], &union_schema).unwrap_err(),
        DecodeError::new(ErrorKind::UnknownUnionTag, 0)
    );

    assert_eq!(
        bare::encode(&Value::Enum(3), &enum_schema).unwrap_err().kind(),
        ErrorKind::UnknownEnumTag
    );
    assert_eq!(
        bare::encode(&Value::union(2, Value::Void), &union_schema).unwrap_err().kind(),
        ErrorKind::UnknownUnionTag
    );
}

#[test]
fn test_absent_optional_consumes_one_byte() {
    let schema = Schema::optional(Schema::structure([("a", Schema::F64), ("b", Schema::Str)]));

    let config = Config::default().with_trailing_bytes(true);
    let codec = Codec::with_config(schema, config).unwrap();

    assert_eq!(codec.decode(&[0, 0xff, 0xff]).unwrap(), Value::absent());
    assert_eq!(codec.encode(&Value::absent()).unwrap(), [0]);
}

#[test]
fn test_random_garbage_never_panics() {
    let codec = Codec::new(order_schema()).unwrap();
    let mut rng = rand::thread_rng();

    for _ in 0..ROUNDS {
        let len = rng.gen_range(0..64);
        let bytes = (0..len).map(|_| rng.gen()).collect::<Vec<u8>>();

        // any outcome is fine as long as it is reported, not panicked
        let _ = codec.decode(&bytes);
    }
}
