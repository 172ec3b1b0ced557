//! # UoW Ledger Benchmarks
//!
//! | Scenario | Shape |
//! |----------|-------|
//! | Write batch | Inserts over a 20-type reference chain, staged backwards |
//! | Mixed batch | Inserts followed by deletes over the same chain |
//! | Single type | Skipped batch, measures the fast path |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use std::time::Duration;
use uow_ledger::{
    Document, DocumentMapping, OperationLedger, StorageModel, StorageOperation, UnitOfWorkApi,
};

const CHAIN_LENGTH: usize = 20;

fn type_name(level: usize) -> String {
    format!("Level{level:02}")
}

/// `Level{n}` references `Level{n-1}`
fn chain_model() -> StorageModel {
    let mut builder = StorageModel::builder();
    for level in 0..CHAIN_LENGTH {
        let mut mapping = DocumentMapping::new(type_name(level));
        if level > 0 {
            mapping = mapping.references(type_name(level - 1));
        }
        builder = builder.document(mapping);
    }
    builder.build().expect("chain model is valid")
}

fn write_batch(size: usize) -> Vec<StorageOperation> {
    (0..size)
        .map(|i| {
            let level = CHAIN_LENGTH - 1 - (i % CHAIN_LENGTH);
            let document = Document::new(format!("doc-{i}"), type_name(level), json!({ "n": i }));
            StorageOperation::insert(document.shared())
        })
        .collect()
}

fn mixed_batch(size: usize) -> Vec<StorageOperation> {
    let mut operations = write_batch(size / 2);
    operations.extend(
        (0..size / 2).map(|i| StorageOperation::delete_by_id(type_name(i % CHAIN_LENGTH), format!("old-{i}"))),
    );
    operations
}

fn run_sort(model: &StorageModel, operations: &[StorageOperation]) -> usize {
    let mut ledger = OperationLedger::for_model(model);
    for op in operations {
        ledger.add(op.clone());
    }
    ledger.sort(model).expect("chain has no cycles");
    ledger.len()
}

fn bench_sort(c: &mut Criterion) {
    let model = chain_model();
    let mut group = c.benchmark_group("uow-ledger-sort");
    group.measurement_time(Duration::from_secs(5));

    for size in [100, 1_000, 10_000] {
        let writes = write_batch(size);
        let mixed = mixed_batch(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("write_batch", size), &writes, |b, ops| {
            b.iter(|| black_box(run_sort(&model, ops)))
        });
        group.bench_with_input(BenchmarkId::new("mixed_batch", size), &mixed, |b, ops| {
            b.iter(|| black_box(run_sort(&model, ops)))
        });
    }

    let single: Vec<_> = (0..1_000)
        .map(|i| StorageOperation::insert(Document::new(format!("doc-{i}"), "Level00", json!({})).shared()))
        .collect();
    group.bench_function("single_type_skip", |b| {
        b.iter(|| black_box(run_sort(&model, &single)))
    });

    group.finish();
}

criterion_group!(benches, bench_sort);
criterion_main!(benches);
