// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Covering relation construction benchmarks
//!
//! Run with: cargo bench -p fcalattice-index --bench lattice_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fcalattice_core::{BitSet, BitVectorTable, Concept, LatticeStrategy};
use fcalattice_index::{LatticeBuilder, PartialOrderSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

/// Closures of random object pairs in a random sparse table
fn random_concepts(n_objects: usize, n_attributes: usize, target: usize) -> Vec<Concept> {
    let mut rng = StdRng::seed_from_u64(42);
    let rows: Vec<Vec<bool>> = (0..n_objects)
        .map(|_| (0..n_attributes).map(|_| rng.gen_bool(0.3)).collect())
        .collect();
    let table = BitVectorTable::from_rows(&rows).unwrap();

    let mut seen = HashSet::new();
    let mut concepts = Vec::new();
    for _ in 0..target * 10 {
        if concepts.len() == target {
            break;
        }
        let mut generator = BitSet::empty(n_objects);
        generator.insert(rng.gen_range(0..n_objects));
        generator.insert(rng.gen_range(0..n_objects));
        let concept = Concept::from_extent(&table, &generator);
        if seen.insert(concept.extent().clone()) {
            concepts.push(concept);
        }
    }
    concepts
}

fn bench_covering(c: &mut Criterion) {
    let _ = tracing_subscriber::fmt().with_max_level(tracing::Level::WARN).try_init();
    let mut group = c.benchmark_group("covering");

    for size in [100usize, 500, 1000].iter() {
        let concepts = random_concepts(200, 40, *size);
        group.throughput(Throughput::Elements(concepts.len() as u64));

        group.bench_with_input(BenchmarkId::new("spanning_tree", size), &concepts, |b, concepts| {
            b.iter(|| LatticeBuilder::new().build(black_box(concepts)).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("spanning_tree_4w", size), &concepts, |b, concepts| {
            b.iter(|| {
                LatticeBuilder::new()
                    .with_workers(4)
                    .build(black_box(concepts))
                    .unwrap()
            });
        });

        group.bench_with_input(BenchmarkId::new("pairwise", size), &concepts, |b, concepts| {
            b.iter(|| {
                LatticeBuilder::new()
                    .with_strategy(LatticeStrategy::CompletePairwise)
                    .build(black_box(concepts))
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_poset_cache(c: &mut Criterion) {
    let concepts = random_concepts(200, 40, 300);
    let covering = LatticeBuilder::new().build(&concepts).unwrap();

    c.bench_function("poset_fill_up_cache", |b| {
        b.iter(|| {
            let poset = PartialOrderSet::with_covering(
                concepts.clone(),
                |a: &Concept, b: &Concept| a.is_subconcept_of(b),
                &covering,
            )
            .unwrap();
            poset.fill_up_cache().unwrap();
            black_box(poset.len())
        });
    });
}

criterion_group!(benches, bench_covering, bench_poset_cache);
criterion_main!(benches);
