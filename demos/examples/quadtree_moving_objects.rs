// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame loop over moving objects.
//!
//! Each frame moves every object, settles the tree with one update pass, prunes nodes left
//! empty, and culls against a fixed viewport.
//!
//! Run (set `RUST_LOG=understory_quadtree=trace` to see individual relocations):
//! - `cargo run -p understory_examples --example quadtree_moving_objects`

use kurbo::{Circle, Rect, Vec2};
use tracing::info;
use tracing_subscriber::EnvFilter;
use understory_quadtree::{Config, LooseQuadTree};

const FRAMES: usize = 10;
const OBJECTS: u32 = 200;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let mut tree: LooseQuadTree<u32> =
        LooseQuadTree::new(Config::new(2000.0).with_max_depth(6)).expect("valid config");

    // Objects spiral outwards from the center with per-object velocities.
    let mut bodies = Vec::new();
    for i in 0..OBJECTS {
        let t = f64::from(i);
        let angle = t * 0.37;
        let center = (angle.cos() * t * 4.0, angle.sin() * t * 4.0);
        let radius = 1.0 + (t % 7.0);
        let p = tree
            .insert(Circle::new(center, radius), i)
            .expect("valid circle");
        let velocity = Vec2::new(-angle.sin(), angle.cos()) * (5.0 + t % 25.0);
        bodies.push((p.key, velocity));
    }
    info!(objects = tree.len(), nodes = tree.count_nodes(), "populated");

    let view = Rect::new(-250.0, -250.0, 250.0, 250.0);
    for frame in 0..FRAMES {
        for &(key, velocity) in &bodies {
            let c = tree.circle(key).expect("tracked object");
            tree.set_position(key, c.center + velocity);
        }
        let stats = tree.update();
        let pruned = tree.prune_empty_nodes();
        let visible = tree.query(&view).len();
        info!(
            frame,
            moved = stats.moved(),
            root_fallbacks = stats.root_fallbacks,
            pruned,
            nodes = tree.count_nodes(),
            visible,
            "frame"
        );
    }
}
