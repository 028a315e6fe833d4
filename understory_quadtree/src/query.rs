// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hierarchical tri-state culling.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::region::{Region, Visibility};
use crate::tree::LooseQuadTree;
use crate::types::ObjectKey;

impl<P: Copy + Debug> LooseQuadTree<P> {
    /// Objects whose bounding circles overlap `region`, in pre-order node order.
    ///
    /// Node boxes are classified only while their ancestors straddle the region boundary:
    /// a box outside the region prunes its subtree, a box inside it makes the whole subtree
    /// visible without further box tests. Objects are always tested individually, since a
    /// loose box may overlap the region while an object inside it does not.
    pub fn query<R: Region + ?Sized>(&self, region: &R) -> Vec<(ObjectKey, P)> {
        let mut out = Vec::new();
        self.cull(region, |key, payload, _| out.push((key, payload)));
        out
    }

    /// Like [`query`](Self::query), also returning each object's own classification.
    ///
    /// [`Visibility::FullyVisible`] objects need no clipping against the region.
    pub fn query_with_visibility<R: Region + ?Sized>(
        &self,
        region: &R,
    ) -> Vec<(ObjectKey, P, Visibility)> {
        let mut out = Vec::new();
        self.cull(region, |key, payload, vis| out.push((key, payload, vis)));
        out
    }

    fn cull<R: Region + ?Sized>(&self, region: &R, mut emit: impl FnMut(ObjectKey, P, Visibility)) {
        let root = self.root();
        // (node, visibility inherited from its parent)
        let mut stack = vec![(root, Visibility::PartiallyVisible)];
        while let Some((id, inherited)) = stack.pop() {
            let node = self.nodes.node(id);
            let vis = match inherited {
                Visibility::PartiallyVisible => region.classify_box(self.loose_box(node)),
                settled => settled,
            };
            // The root also holds objects outside its box, so its list is always tested.
            if vis == Visibility::NotVisible && id != root {
                continue;
            }
            for &key in &node.objects {
                let Some(e) = self.entry(key) else {
                    continue;
                };
                let v = region.classify_circle(e.circle);
                if v.is_visible() {
                    emit(key, e.payload, v);
                }
            }
            if vis.is_visible() {
                stack.extend(node.children.iter().rev().flatten().map(|&c| (c, vis)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::region::Visibility;
    use crate::tree::LooseQuadTree;
    use alloc::vec::Vec;
    use kurbo::{Circle, Point, Rect};

    fn tree() -> LooseQuadTree<u32> {
        LooseQuadTree::new(Config::new(1000.0)).unwrap()
    }

    #[test]
    fn inserted_object_is_found_by_containing_region() {
        let mut t = tree();
        let a = t.insert(Circle::new((123.0, -77.0), 4.0), 7).unwrap();
        let hits = t.query(&Rect::new(110.0, -90.0, 130.0, -70.0));
        assert_eq!(hits, [(a.key, 7)]);
    }

    #[test]
    fn region_far_away_finds_nothing() {
        let mut t = tree();
        let _ = t.insert(Circle::new((123.0, -77.0), 4.0), 7).unwrap();
        assert!(t.query(&Rect::new(-400.0, 300.0, -300.0, 400.0)).is_empty());
    }

    #[test]
    fn objects_are_tested_individually() {
        let mut t = tree();
        // Same deepest node, only one overlaps the region.
        let a = t.insert(Circle::new((100.0, 100.0), 1.0), 1).unwrap();
        let b = t.insert(Circle::new((120.0, 120.0), 1.0), 2).unwrap();
        assert_eq!(a.node, b.node);
        let hits = t.query(&Rect::new(95.0, 95.0, 105.0, 105.0));
        assert_eq!(hits, [(a.key, 1)]);
    }

    #[test]
    fn whole_world_region_returns_everything_once() {
        let mut t = tree();
        let mut keys: Vec<_> = [
            (0.0, 0.0, 1.0),
            (-450.0, 450.0, 10.0),
            (300.0, -20.0, 200.0),
            (0.0, 0.0, 1000.0),
            (499.0, 499.0, 0.0),
        ]
        .iter()
        .enumerate()
        .map(|(i, &(x, y, r))| {
            let payload = u32::try_from(i).unwrap();
            t.insert(Circle::new((x, y), r), payload).unwrap().key
        })
        .collect();
        let mut hits: Vec<_> = t
            .query(&t.config().world_bounds())
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(hits.len(), keys.len());
        let order = |k: &crate::ObjectKey| (k.0, k.1);
        hits.sort_by_key(order);
        keys.sort_by_key(order);
        assert_eq!(hits, keys);
    }

    #[test]
    fn classification_is_reported_per_object() {
        let mut t = tree();
        let inside = t.insert(Circle::new((50.0, 50.0), 5.0), 1).unwrap();
        let edge = t.insert(Circle::new((100.0, 50.0), 5.0), 2).unwrap();
        let hits = t.query_with_visibility(&Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(hits.len(), 2);
        for (key, _, vis) in hits {
            if key == inside.key {
                assert_eq!(vis, Visibility::FullyVisible);
            } else {
                assert_eq!(key, edge.key);
                assert_eq!(vis, Visibility::PartiallyVisible);
            }
        }
    }

    #[test]
    fn circle_region_finds_overlapping_objects() {
        let mut t = tree();
        let a = t.insert(Circle::new((10.0, 0.0), 2.0), 1).unwrap();
        let _far = t.insert(Circle::new((40.0, 0.0), 2.0), 2).unwrap();
        let hits = t.query(&Circle::new(Point::new(0.0, 0.0), 9.0));
        assert_eq!(hits, [(a.key, 1)]);
    }

    #[test]
    fn objects_outside_the_world_are_found() {
        let mut t = tree();
        let inside = t.insert(Circle::new((100.0, 100.0), 1.0), 1).unwrap();
        let far = t.insert(Circle::new((1500.0, 0.0), 1.0), 7).unwrap();
        assert_eq!(far.node, t.root());
        let view = Rect::new(1490.0, -10.0, 1510.0, 10.0);
        assert_eq!(t.query(&view), [(far.key, 7)]);
        assert_eq!(
            t.query_with_visibility(&view),
            [(far.key, 7, Visibility::FullyVisible)]
        );
        assert!(t.query(&Rect::new(1490.0, 50.0, 1510.0, 70.0)).is_empty());

        // Moved out of the world by an update, then found there.
        t.set_position(inside.key, Point::new(-3000.0, 2000.0));
        let _ = t.update();
        assert_eq!(t.node_of(inside.key), Some(t.root()));
        assert_eq!(
            t.query(&Circle::new(Point::new(-3000.0, 2000.0), 5.0)),
            [(inside.key, 1)]
        );
    }

    #[test]
    fn moved_objects_are_found_after_update() {
        let mut t = tree();
        let a = t.insert(Circle::new((100.0, 100.0), 1.0), 1).unwrap();
        t.set_position(a.key, Point::new(-400.0, 350.0));
        let _ = t.update();
        assert!(t.query(&Rect::new(90.0, 90.0, 110.0, 110.0)).is_empty());
        assert_eq!(t.query(&Rect::new(-410.0, 340.0, -390.0, 360.0)), [(a.key, 1)]);
    }
}
