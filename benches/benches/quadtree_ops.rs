// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Circle, Point, Rect, Vec2};
use understory_quadtree::{Config, LooseQuadTree, ObjectKey};

const WORLD: f64 = 4096.0;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
    /// Uniform in `[-half, half)`.
    fn centered(&mut self, half: f64) -> f64 {
        (self.next_f64() - 0.5) * 2.0 * half
    }
}

fn gen_circles(count: usize, max_radius: f64, seed: u64) -> Vec<Circle> {
    let mut rng = Rng::new(seed);
    let half = WORLD / 2.0;
    (0..count)
        .map(|_| {
            Circle::new(
                (rng.centered(half), rng.centered(half)),
                rng.next_f64() * max_radius,
            )
        })
        .collect()
}

fn gen_clustered_circles(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Circle> {
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    for _ in 0..n_clusters {
        let (cx, cy) = (rng.centered(WORLD / 3.0), rng.centered(WORLD / 3.0));
        for _ in 0..per_cluster {
            out.push(Circle::new(
                (cx + rng.centered(spread), cy + rng.centered(spread)),
                4.0,
            ));
        }
    }
    out
}

fn config() -> Config {
    Config::new(WORLD).with_max_depth(8)
}

fn filled(circles: &[Circle]) -> (LooseQuadTree<u32>, Vec<ObjectKey>) {
    let mut tree = LooseQuadTree::new(config()).unwrap();
    let keys = circles
        .iter()
        .enumerate()
        .map(|(i, &c)| tree.insert(c, i as u32).unwrap().key)
        .collect();
    (tree, keys)
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &n in &[1_000usize, 10_000] {
        let circles = gen_circles(n, 16.0, 0xCAFE_F00D_DEAD_BEEF);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("uniform_n{}", n), |b| {
            b.iter_batched(
                || LooseQuadTree::<u32>::new(config()).unwrap(),
                |mut tree| {
                    for (i, &c) in circles.iter().enumerate() {
                        black_box(tree.insert(c, i as u32));
                    }
                    black_box(tree.count_nodes());
                },
                BatchSize::SmallInput,
            )
        });
    }
    let circles = gen_clustered_circles(16, 512, 120.0);
    group.bench_function("clustered", |b| {
        b.iter_batched(
            || LooseQuadTree::<u32>::new(config()).unwrap(),
            |mut tree| {
                for (i, &c) in circles.iter().enumerate() {
                    black_box(tree.insert(c, i as u32));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    let circles = gen_circles(10_000, 16.0, 0xBADC_F00D_1234_5678);
    group.throughput(Throughput::Elements(circles.len() as u64));
    // Step sizes relative to the deepest cell: mostly absorbed by looseness vs. mostly relocating.
    for &(name, step) in &[("small_steps", 4.0), ("large_steps", 200.0)] {
        group.bench_function(name, |b| {
            b.iter_batched(
                || {
                    let (tree, keys) = filled(&circles);
                    let mut rng = Rng::new(0xFACE_FEED_CAFE_BABE);
                    let moves: Vec<(ObjectKey, Point)> = keys
                        .iter()
                        .zip(&circles)
                        .map(|(&k, c)| {
                            let p = c.center + Vec2::new(rng.centered(step), rng.centered(step));
                            (k, p)
                        })
                        .collect();
                    (tree, moves)
                },
                |(mut tree, moves)| {
                    for (k, p) in moves {
                        tree.set_position(k, p);
                    }
                    black_box(tree.update());
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.bench_function("settled", |b| {
        let (mut tree, _) = filled(&circles);
        let _ = tree.update();
        b.iter(|| black_box(tree.update()));
    });
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    let circles = gen_circles(10_000, 16.0, 0x5EED_0000_1111_2222);
    let (tree, _) = filled(&circles);
    for &(name, side) in &[("viewport_small", 256.0), ("viewport_large", 1600.0)] {
        let view = Rect::from_center_size(Point::ORIGIN, (side, side));
        group.bench_function(name, |b| {
            b.iter(|| black_box(tree.query(&view).len()));
        });
    }
    let lens = Circle::new(Point::new(300.0, -200.0), 400.0);
    group.bench_function("circle_region", |b| {
        b.iter(|| black_box(tree.query_with_visibility(&lens).len()));
    });
    group.finish();
}

fn bench_prune(c: &mut Criterion) {
    let mut group = c.benchmark_group("prune");
    let circles = gen_circles(10_000, 16.0, 0x0DDB_A11C_AFE0_0001);
    group.bench_function("after_half_removed", |b| {
        b.iter_batched(
            || {
                let (mut tree, keys) = filled(&circles);
                for k in keys.iter().step_by(2) {
                    tree.remove(*k);
                }
                tree
            },
            |mut tree| black_box(tree.prune_empty_nodes()),
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_update, bench_query, bench_prune);
criterion_main!(benches);
