// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loose quadtree basics.
//!
//! Insert a few objects, inspect where they landed, walk the tree, and cull against a viewport.
//!
//! Run:
//! - `cargo run -p understory_examples --example quadtree_basics`

use kurbo::{Circle, Rect};
use understory_quadtree::{Config, LooseQuadTree, Visibility};

fn main() {
    let config = Config::new(1000.0).with_max_depth(5);
    let mut tree: LooseQuadTree<&str> = LooseQuadTree::new(config).expect("valid config");

    let objects = [
        ("dust", Circle::new((0.0, 0.0), 1.0)),
        ("ship", Circle::new((100.0, 100.0), 1.0)),
        ("station", Circle::new((-300.0, 250.0), 40.0)),
        ("planet", Circle::new((0.0, 0.0), 1000.0)),
    ];
    for (name, circle) in objects {
        let p = tree.insert(circle, name).expect("valid circle");
        let bounds = tree.node_bounds(p.node).unwrap();
        println!("{name:>8}: depth {} in loose box {bounds:?}", p.depth);
    }
    println!("nodes: {}", tree.count_nodes());

    // Print the tree structure.
    for id in tree.depth_first(tree.root()) {
        let depth = tree.node_depth(id).unwrap();
        let quadrant = tree
            .node_quadrant(id)
            .map_or_else(|| "root".to_string(), |q| format!("{q:?}"));
        let names: Vec<_> = tree
            .objects_at(id)
            .iter()
            .filter_map(|&k| tree.get(k))
            .collect();
        println!("{:indent$}{quadrant} {names:?}", "", indent = usize::from(depth) * 2);
    }

    // Cull against a viewport.
    let view = Rect::new(50.0, 50.0, 150.0, 150.0);
    for (_, name, vis) in tree.query_with_visibility(&view) {
        let clip = if vis == Visibility::FullyVisible {
            "no clipping"
        } else {
            "needs clipping"
        };
        println!("visible: {name} ({clip})");
    }
}
