// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Neighbor generation throughput over a single long path.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sextant_ls::operator::relocate::Relocate;
use sextant_ls::operator::two_opt::TwoOpt;
use sextant_ls::operator::LocalSearchOperator;
use sextant_model::assignment::Assignment;
use sextant_model::index::VarIndex;

/// Builds one path 0 → 1 → … → n-1 with end sentinel n.
fn line_assignment(num_nodes: usize) -> Assignment<i64> {
    let mut assignment = Assignment::with_capacity(num_nodes);
    for i in 0..num_nodes {
        assignment.add(VarIndex::new(i), (i + 1) as i64);
    }
    assignment
}

fn exhaust<O: LocalSearchOperator<i64>>(operator: &mut O, reference: &Assignment<i64>) -> u64 {
    operator.start(reference);
    let mut delta = Assignment::new();
    let mut deltadelta = Assignment::new();
    let mut neighbors = 0;
    loop {
        delta.clear();
        deltadelta.clear();
        if !operator.make_next_neighbor(&mut delta, &mut deltadelta) {
            break;
        }
        neighbors += 1;
    }
    neighbors
}

fn bench_neighbor_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor_generation");
    for num_nodes in [16usize, 64, 128] {
        let reference = line_assignment(num_nodes);
        group.throughput(Throughput::Elements(num_nodes as u64));
        group.bench_with_input(
            BenchmarkId::new("two_opt", num_nodes),
            &num_nodes,
            |b, &n| {
                let mut operator = TwoOpt::<i64>::new((0..n).map(VarIndex::new).collect(), None);
                b.iter(|| exhaust(&mut operator, &reference));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("relocate", num_nodes),
            &num_nodes,
            |b, &n| {
                let mut operator =
                    Relocate::<i64>::new((0..n).map(VarIndex::new).collect(), None);
                b.iter(|| exhaust(&mut operator, &reference));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_neighbor_generation);
criterion_main!(benches);
