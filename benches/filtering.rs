//! Benchmarks for snapshot filtering and search.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use reclaim::{DirectorySnapshot, Item, ItemFilter, ItemId, OwnerId, Status, Timestamp};

fn build_snapshot(n: usize) -> DirectorySnapshot {
    let statuses = [Status::Lost, Status::Found, Status::Claimed];
    let items = (0..n)
        .map(|ix| Item {
            id: Some(ItemId(format!("id{ix}"))),
            owner_id: OwnerId(format!("owner-{}", ix % 7)),
            title: format!("Item number {ix}"),
            description: format!("Description for item {ix} with some filler text"),
            location: if ix % 3 == 0 {
                Some(format!("Locker {ix} near the park"))
            } else {
                None
            },
            contact_name: "Sam".to_string(),
            contact_phone: "555-0101".to_string(),
            contact_email: None,
            status: statuses[ix % 3],
            photo: None,
            created_at: Timestamp(ix as i64),
            updated_at: Timestamp(ix as i64),
        })
        .collect();
    DirectorySnapshot::new(items)
}

fn bench_filtered(c: &mut Criterion) {
    let mut group = c.benchmark_group("filtered");

    for n in [1_000, 10_000] {
        let snapshot = build_snapshot(n);
        group.bench_with_input(BenchmarkId::new("all", n), &snapshot, |b, snapshot| {
            b.iter(|| black_box(snapshot.filtered(ItemFilter::All)));
        });
        group.bench_with_input(BenchmarkId::new("lost_only", n), &snapshot, |b, snapshot| {
            b.iter(|| black_box(snapshot.filtered(ItemFilter::LostOnly)));
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for n in [1_000, 10_000] {
        let snapshot = build_snapshot(n);
        // Hits roughly a third of the items via their location.
        group.bench_with_input(BenchmarkId::new("hit", n), &snapshot, |b, snapshot| {
            b.iter(|| black_box(snapshot.search("park", ItemFilter::All)));
        });
        // Matches nothing; pure scan cost.
        group.bench_with_input(BenchmarkId::new("miss", n), &snapshot, |b, snapshot| {
            b.iter(|| black_box(snapshot.search("zeppelin", ItemFilter::All)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_filtered, bench_search);
criterion_main!(benches);
