#![allow(clippy::panic)]

use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};
use std::sync::Arc;
use urdf_store::{Dictionary, QuadStore};

fn store_load(c: &mut Criterion) {
    let dictionary = Arc::new(Dictionary::from_iris(
        [
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
            "https://schema.org/name",
            "https://schema.org/isPartOf",
        ]
        .map(String::from),
    ));
    let dataset = generate_dataset(10_000);

    c.bench_function("QuadStore::load", |b| {
        b.iter(|| {
            let mut store = QuadStore::new(Arc::clone(&dictionary), "urn:graph:default");
            store.load(&dataset).unwrap();
            store.size(None)
        });
    });
}

criterion_group!(store, store_load);
criterion_main!(store);

fn generate_dataset(count: u64) -> Value {
    let nodes: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "@id": format!("urn:bench:n{i}"),
                "@type": ["https://schema.org/SoftwareSourceCode"],
                "https://schema.org/name": [{"@value": format!("node {i}")}],
                "https://schema.org/isPartOf": [{"@id": "urn:bench:root"}],
            })
        })
        .collect();
    json!([{ "@id": "urn:graph:bench", "@graph": nodes }])
}
