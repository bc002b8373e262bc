//! Encoding and decoding throughput for the user/session records.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use serde::{Deserialize, Serialize};

use bare::{BareRecord, Codec, Data, Uint};

#[derive(Debug, Clone, Serialize, Deserialize, BareRecord)]
enum UserRole {
    Admin,
    User,
    Guest,
}

#[derive(Debug, Clone, Serialize, Deserialize, BareRecord)]
struct Session {
    token: Data,
    expires: Uint,
}

#[derive(Debug, Clone, Serialize, Deserialize, BareRecord)]
struct User {
    id: Uint,
    name: String,
    email: String,
    role: UserRole,
    session: Option<Session>,
}

fn admin_sample() -> User {
    User {
        id: Uint(42),
        name: "Jane Doe".to_string(),
        email: "jdoe@example.com".to_string(),
        role: UserRole::Admin,
        session: Some(Session {
            token: Data(b"a2b08ecd0a0dc594ebccd607033e79262d1fa049a6d44165631b10028f97b611".to_vec()),
            expires: Uint(42424242),
        }),
    }
}

fn guest_sample() -> User {
    User {
        id: Uint(112),
        name: "John Doe".to_string(),
        email: "john@example.com".to_string(),
        role: UserRole::Guest,
        session: None,
    }
}

fn bench_sample(c: &mut Criterion, label: &str, sample: User) {
    let bytes = bare::to_bytes(&sample).unwrap();
    let codec = Codec::new(User::schema()).unwrap();
    let value = sample.to_value();

    let mut group = c.benchmark_group(format!("{} encoding", label));
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("record", |b| b.iter(|| bare::to_bytes(black_box(&sample)).unwrap()));
    group.bench_function("serde", |b| b.iter(|| bare::to_vec(black_box(&sample)).unwrap()));
    group.bench_function("codec", |b| {
        let mut buffer = Vec::with_capacity(128);
        b.iter(|| {
            buffer.clear();
            codec.encode_into(&mut buffer, black_box(&value)).unwrap();
        })
    });
    group.finish();

    let mut group = c.benchmark_group(format!("{} decoding", label));
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("record", |b| {
        b.iter(|| bare::from_bytes::<User>(black_box(&bytes)).unwrap())
    });
    group.bench_function("serde", |b| {
        b.iter(|| bare::from_slice::<User>(black_box(&bytes)).unwrap())
    });
    group.bench_function("codec", |b| b.iter(|| codec.decode(black_box(&bytes)).unwrap()));
    group.finish();
}

fn bench_admin(c: &mut Criterion) {
    bench_sample(c, "admin", admin_sample());
}

fn bench_guest(c: &mut Criterion) {
    bench_sample(c, "guest", guest_sample());
}

criterion_group!(admin, bench_admin);
criterion_group!(guest, bench_guest);
criterion_main!(admin, guest);
