// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_quadtree --heading-base-level=0

//! Understory Quadtree: a loose quadtree for many moving, bounded-radius objects.
//!
//! - Insert circles with user payloads and receive stable [`ObjectKey`]s.
//! - Move or resize objects freely, then settle the tree with one [`LooseQuadTree::update`] pass.
//! - Cull against any [`Region`] with tri-state [`Visibility`] that prunes whole subtrees.
//!
//! Each node at depth `d` owns a square cell of half-width `world_size / 2^(d+1)`, but accepts any
//! object whose circle fits a box `loose_k` times larger around the same center. That slack lets
//! objects move a fair distance before they have to change nodes, which keeps per-frame updates
//! cheap. An object lives in the deepest node whose loose box contains it, routed by its center.
//!
//! Nodes are kept in an arena and addressed by generational [`NodeId`]s, so ids of pruned nodes go
//! stale instead of dangling. Nodes emptied by updates stay around until
//! [`LooseQuadTree::prune_empty_nodes`] is called.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Circle, Point, Rect};
//! use understory_quadtree::{Config, LooseQuadTree};
//!
//! let mut tree: LooseQuadTree<&str> = LooseQuadTree::new(Config::new(1000.0)).unwrap();
//! let ship = tree.insert(Circle::new((100.0, 100.0), 1.0), "ship").unwrap();
//! let planet = tree.insert(Circle::new((0.0, 0.0), 1000.0), "planet").unwrap();
//! assert_eq!(ship.depth, 4);
//! assert_eq!(planet.depth, 0);
//!
//! // Move the ship into the opposite quadrant and settle the tree.
//! tree.set_position(ship.key, Point::new(-100.0, -100.0));
//! let stats = tree.update();
//! assert_eq!(stats.moved(), 1);
//!
//! // Cull against a viewport.
//! let hits = tree.query(&Rect::new(-120.0, -120.0, -80.0, -80.0));
//! assert_eq!(hits.len(), 2);
//! assert!(hits.contains(&(ship.key, "ship")));
//!
//! // The old path is empty now.
//! assert!(tree.prune_empty_nodes() > 0);
//! ```
//!
//! Queries also report how much of each object is visible:
//!
//! ```rust
//! use kurbo::{Circle, Rect};
//! use understory_quadtree::{Config, LooseQuadTree, Visibility};
//!
//! let mut tree: LooseQuadTree<u32> = LooseQuadTree::new(Config::new(1000.0)).unwrap();
//! let _ = tree.insert(Circle::new((50.0, 50.0), 5.0), 1);
//! let _ = tree.insert(Circle::new((100.0, 50.0), 5.0), 2);
//!
//! let hits = tree.query_with_visibility(&Rect::new(0.0, 0.0, 100.0, 100.0));
//! for (_, payload, vis) in hits {
//!     let expected = if payload == 1 {
//!         Visibility::FullyVisible
//!     } else {
//!         Visibility::PartiallyVisible
//!     };
//!     assert_eq!(vis, expected);
//! }
//! ```
//!
//! ## Configuration
//!
//! [`Config`] fixes the world square, the looseness factor (`2.0` by default) and the maximum
//! depth (`5` by default). Objects are placed at depth at most `max_depth - 1`. Objects that
//! leave the world square are kept at the root, and queries always test the root's objects.
//!
//! ## Logging
//!
//! The update and pruning passes emit [`tracing`] events: `debug` summaries when objects move or
//! nodes are pruned, and `trace` events per relocated object. Install any subscriber to see them.
//!
//! ### Float semantics
//!
//! Circles must have finite centers and non-negative radii. Invalid circles are rejected by
//! [`LooseQuadTree::insert`] and ignored by the setters; debug builds assert.

#![no_std]

extern crate alloc;

pub mod config;
pub mod region;
pub mod traverse;
pub mod types;
pub mod update;

mod node;
mod prune;
mod query;
mod tree;

pub use config::{Config, ConfigError};
pub use region::{Region, Visibility};
pub use traverse::{Ancestors, BreadthFirst, DepthFirst, ObjectsIn, PostOrder};
pub use tree::LooseQuadTree;
pub use types::{NodeId, ObjectKey, Placement, Quadrant};
pub use update::UpdateStats;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use kurbo::{Circle, Point, Rect};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn tree() -> LooseQuadTree<u32> {
        LooseQuadTree::new(Config::new(1000.0)).unwrap()
    }

    fn random_circle(rng: &mut StdRng) -> Circle {
        let r = if rng.random_range(0..10) == 0 {
            rng.random_range(50.0..400.0)
        } else {
            rng.random_range(0.0..8.0)
        };
        Circle::new(
            (rng.random_range(-520.0..520.0), rng.random_range(-520.0..520.0)),
            r,
        )
    }

    fn check_structure(t: &LooseQuadTree<u32>) {
        let root = t.root();
        let world = t.config().world_bounds();
        let mut seen = 0;
        for id in t.depth_first(root) {
            assert!(t.num_children(id) <= 4);
            for c in t.children(id) {
                assert_eq!(t.parent(c), Some(id));
                assert_eq!(t.node_depth(c), t.node_depth(id).map(|d| d + 1));
            }
            for &key in t.objects_at(id) {
                seen += 1;
                assert_eq!(t.node_of(key), Some(id), "back-reference matches list");
                let circle = t.circle(key).unwrap();
                let outside = !world.contains(circle.center);
                assert!(
                    t.fits_in_node(id, &circle) || (id == root && outside),
                    "object must fit its node after update"
                );
                assert!(
                    !t.fits_in_child_node(id, &circle),
                    "object must be as deep as it can go"
                );
            }
        }
        assert_eq!(seen, t.len(), "every object is stored exactly once");
    }

    #[test]
    fn huge_object_at_center_stays_at_root() {
        let mut t = tree();
        let p = t.insert(Circle::new((0.0, 0.0), 1000.0), 1).unwrap();
        assert_eq!(p.depth, 0);
        assert_eq!(p.node, t.root());
        assert_eq!(t.count_nodes(), 1);
    }

    #[test]
    fn node_count_is_root_plus_distinct_path_nodes() {
        let mut t = tree();
        let spots = [(-400.0, -400.0), (400.0, 400.0), (400.0, -400.0), (380.0, 380.0)];
        let mut path_nodes: Vec<NodeId> = Vec::new();
        for (i, &(x, y)) in spots.iter().enumerate() {
            let payload = u32::try_from(i).unwrap();
            let p = t.insert(Circle::new((x, y), 1.0), payload).unwrap();
            for id in t.ancestors(p.node) {
                if id != t.root() && !path_nodes.contains(&id) {
                    path_nodes.push(id);
                }
            }
        }
        assert_eq!(t.count_nodes(), 1 + path_nodes.len());
    }

    #[test]
    fn randomized_moves_keep_the_tree_consistent() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut t = tree();
        let mut keys = Vec::new();
        for i in 0..300_u32 {
            let c = random_circle(&mut rng);
            keys.push(t.insert(c, i).unwrap().key);
        }
        check_structure(&t);

        for _ in 0..20 {
            for &k in &keys {
                if rng.random_range(0..3) == 0 {
                    let c = t.circle(k).unwrap();
                    let step = Point::new(
                        c.center.x + rng.random_range(-60.0..60.0),
                        c.center.y + rng.random_range(-60.0..60.0),
                    );
                    t.set_position(k, step);
                }
                if rng.random_range(0..20) == 0 {
                    t.set_radius(k, random_circle(&mut rng).radius);
                }
            }
            let stats = t.update();
            assert_eq!(stats.examined, t.len());
            check_structure(&t);
            assert_eq!(t.update().moved(), 0, "a second pass changes nothing");

            let before = t.count_nodes();
            let pruned = t.prune_empty_nodes();
            assert_eq!(t.count_nodes(), before - pruned);
            check_structure(&t);
            for id in t.depth_first(t.root()) {
                if id != t.root() {
                    assert!(t.num_children(id) > 0 || !t.objects_at(id).is_empty());
                }
            }
        }

        // Queries agree with a linear scan.
        let view = Rect::new(-200.0, -150.0, 120.0, 260.0);
        let mut hits: Vec<u32> = t.query(&view).into_iter().map(|(_, p)| p).collect();
        let mut expected: Vec<u32> = t
            .iter()
            .filter(|&(k, _)| {
                let c = t.circle(k).unwrap();
                view.classify_circle(c).is_visible()
            })
            .map(|(_, p)| p)
            .collect();
        hits.sort_unstable();
        expected.sort_unstable();
        assert_eq!(hits, expected);
    }
}
