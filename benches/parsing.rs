use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::path::Path;

use mailtree::parser::eml::parse_bytes;
use mailtree::MessageTreeBuilder;

fn bench_parse_nested(c: &mut Criterion) {
    let fixture_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("nested.eml");
    let data = std::fs::read(&fixture_path).unwrap();
    let builder = MessageTreeBuilder::default();

    c.bench_function("parse_nested_eml", |b| {
        b.iter(|| parse_bytes(black_box(&data), &builder).unwrap())
    });
}

fn bench_parse_many_attachments(c: &mut Criterion) {
    let mut raw = String::from("Content-Type: multipart/mixed; boundary=\"bulk\"\n\n");
    for i in 0..200 {
        raw.push_str(&format!(
            "--bulk\nContent-Type: application/octet-stream\n\
             Content-Disposition: attachment; filename=\"file{i}.bin\"\n\
             Content-Transfer-Encoding: base64\n\n\
             SGVsbG8sIHdvcmxkIQ==\n"
        ));
    }
    raw.push_str("--bulk--\n");

    c.bench_function("parse_200_attachments", |b| {
        b.iter(|| mailtree::parse_message(black_box(&raw)).unwrap())
    });
}

fn bench_validate(c: &mut Criterion) {
    let addresses = [
        "user@example.com",
        "Jane Doe <jane.doe+tag@mail.example.org>",
        "a..b@example.com",
        "\"quoted local\"@example.com",
    ];

    c.bench_function("validate_addresses", |b| {
        b.iter(|| {
            addresses
                .iter()
                .filter(|a| mailtree::validate(black_box(a), None).is_ok())
                .count()
        })
    });
}

criterion_group!(
    benches,
    bench_parse_nested,
    bench_parse_many_attachments,
    bench_validate
);
criterion_main!(benches);
