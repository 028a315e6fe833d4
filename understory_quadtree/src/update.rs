// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Update engine: relocates objects whose circles changed since the last pass.

use alloc::vec::Vec;
use core::fmt::Debug;
use tracing::{debug, trace};

use crate::traverse::{Ancestors, DepthFirst};
use crate::tree::LooseQuadTree;
use crate::types::NodeId;

/// What one [`LooseQuadTree::update`] pass did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Objects examined.
    pub examined: usize,
    /// Objects left where they were.
    pub stable: usize,
    /// Objects that still fit their node but moved down into a child.
    pub pushed_down: usize,
    /// Objects that left their node and were re-placed from one of its ancestors.
    pub relocated: usize,
    /// Objects that left their node and fit no ancestor's child, so were re-placed from the
    /// root. Correct, but costs a full descent.
    pub root_fallbacks: usize,
}

impl UpdateStats {
    /// Objects whose node changed (or may have, for root fallbacks).
    pub fn moved(&self) -> usize {
        self.pushed_down + self.relocated + self.root_fallbacks
    }
}

impl<P: Copy + Debug> LooseQuadTree<P> {
    /// Re-place every object whose reported circle no longer matches its node.
    ///
    /// For each node (pre-order) and each object stored there:
    /// - if the object no longer fits the node, it is detached and the ancestors are searched,
    ///   starting at the node's parent, for the first one whose routed child fits it; insertion
    ///   resumes from there. If none fits, insertion starts over from the root.
    /// - if it still fits but would also fit the routed child, it is pushed down from the node.
    /// - otherwise it is left alone.
    ///
    /// Every object is examined at most once per call and re-placement always descends as far
    /// as possible, so one call settles the tree: calling again without moves changes nothing.
    /// Objects entirely outside the root box stay at the root.
    ///
    /// Nodes emptied by the pass are kept; see [`prune_empty_nodes`](Self::prune_empty_nodes).
    pub fn update(&mut self) -> UpdateStats {
        self.epoch = self.epoch.wrapping_add(1);
        let epoch = self.epoch;
        let root = self.root();
        let mut stats = UpdateStats::default();

        let order: Vec<NodeId> = DepthFirst::new(&self.nodes, root).collect();
        for id in order {
            // Re-placement below edits this list.
            let Some(snapshot) = self.nodes.get(id).map(|n| n.objects.clone()) else {
                continue;
            };
            for key in snapshot {
                let Some(e) = self.entry_mut(key) else {
                    continue;
                };
                if e.epoch == epoch || e.node != id {
                    continue;
                }
                e.epoch = epoch;
                let circle = e.circle;
                stats.examined += 1;

                if id != root && !self.fits_in_node(id, &circle) {
                    self.detach_object(key, id);
                    let start = self.nodes.node(id).parent.unwrap_or(root);
                    let hint = Ancestors::new(&self.nodes, start)
                        .find(|&a| self.routed_child(a, &circle).is_some());
                    if let Some(ancestor) = hint {
                        let (node, depth) = self.place(key, ancestor);
                        trace!(?key, from = ?id, to = ?node, depth, "relocated object");
                        stats.relocated += 1;
                    } else {
                        let (node, depth) = self.place(key, root);
                        debug!(
                            ?key,
                            from = ?id,
                            to = ?node,
                            depth,
                            "no ancestor fits moved object, re-inserted from root"
                        );
                        stats.root_fallbacks += 1;
                    }
                } else if self.routed_child(id, &circle).is_some() {
                    self.detach_object(key, id);
                    let (node, depth) = self.place(key, id);
                    trace!(?key, from = ?id, to = ?node, depth, "pushed object down");
                    stats.pushed_down += 1;
                } else {
                    stats.stable += 1;
                }
            }
        }

        if stats.moved() > 0 {
            debug!(?stats, "quadtree update");
        }
        stats
    }
}
