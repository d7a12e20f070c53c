//! Benchmarks for merging block lists.
//!
//! Lists are filled with random domains, with a shared slice so that the
//! deduplication path is exercised.

use criterion::{BenchmarkId, Criterion, Throughput, black_box};
use rand::Rng;

use hosts_server::combine::combine_lists;
use hosts_server::lists::{DomainSet, ListStore};
use hosts_server::selector::Selector;

const LIST_SIZES: [usize; 3] = [1_000, 10_000, 100_000];

fn random_domain(rng: &mut impl Rng) -> String {
    let len = rng.random_range(4..16);
    let label: String = (0..len)
        .map(|_| rng.random_range(b'a'..=b'z') as char)
        .collect();
    format!("{label}.example.com")
}

/// Three lists of `size` domains; a tenth of each list is shared by all.
fn build_store(size: usize) -> ListStore {
    let mut rng = rand::rng();
    let shared: Vec<String> = (0..size / 10).map(|_| random_domain(&mut rng)).collect();

    (1..=3u64)
        .map(|id| {
            let own = (0..size - shared.len()).map(|_| random_domain(&mut rng));
            let domains: DomainSet = shared.iter().cloned().chain(own).collect();
            (id, domains)
        })
        .collect()
}

fn bench_combine(c: &mut Criterion) {
    let mut group = c.benchmark_group("combine");

    for size in LIST_SIZES {
        let store = build_store(size);
        let single = Selector::resolve("/1", &store).unwrap();
        let all = Selector::resolve("/3-1-2", &store).unwrap();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("single_list", size), &single, |b, s| {
            b.iter(|| combine_lists(black_box(&store), black_box(s)))
        });

        group.throughput(Throughput::Elements(3 * size as u64));
        group.bench_with_input(BenchmarkId::new("three_lists", size), &all, |b, s| {
            b.iter(|| combine_lists(black_box(&store), black_box(s)))
        });
    }

    group.finish();
}

fn main() {
    let mut criterion = Criterion::default().configure_from_args();
    bench_combine(&mut criterion);
    criterion.final_summary();
}
