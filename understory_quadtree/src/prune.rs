// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Removal of structurally empty nodes.

use alloc::vec::Vec;
use core::fmt::Debug;
use tracing::debug;

use crate::traverse::PostOrder;
use crate::tree::LooseQuadTree;
use crate::types::NodeId;

impl<P: Copy + Debug> LooseQuadTree<P> {
    /// Remove every node (except the root) that has no children and no objects.
    ///
    /// Nodes are judged in post-order, so a parent whose children are all pruned in the same
    /// pass is pruned too. Returns the number of nodes removed; ids of removed nodes become stale.
    ///
    /// This is a maintenance pass meant to run after [`update`](Self::update), not during it.
    pub fn prune_empty_nodes(&mut self) -> usize {
        let root = self.root();
        let order: Vec<NodeId> = PostOrder::new(&self.nodes, root).collect();
        let mut count = 0;
        for id in order {
            if id == root {
                continue;
            }
            if self.nodes.get(id).is_some_and(|n| n.is_empty()) && self.nodes.detach(id) {
                count += 1;
            }
        }
        if count > 0 {
            debug!(pruned = count, remaining = self.nodes.live_count(), "pruned empty nodes");
        }
        count
    }
}
