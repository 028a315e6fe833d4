// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node arena: slots, generations and the parent/child links between them.

use alloc::vec;
use alloc::vec::Vec;
use kurbo::Point;

use crate::types::{NodeId, ObjectKey, Quadrant};

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) generation: u32,
    pub(crate) parent: Option<NodeId>,
    /// Slot occupied in the parent; `None` for the root.
    pub(crate) quadrant: Option<Quadrant>,
    pub(crate) children: [Option<NodeId>; 4],
    pub(crate) center: Point,
    pub(crate) depth: u8,
    pub(crate) objects: Vec<ObjectKey>,
}

impl Node {
    fn new(generation: u32, center: Point, depth: u8) -> Self {
        Self {
            generation,
            parent: None,
            quadrant: None,
            children: [None; 4],
            center,
            depth,
            objects: Vec::new(),
        }
    }

    pub(crate) fn num_children(&self) -> usize {
        self.children.iter().filter(|c| c.is_some()).count()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.children.iter().all(Option::is_none)
    }
}

/// All nodes of one tree. Slot 0 always holds the root.
pub(crate) struct Nodes {
    slots: Vec<Option<Node>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
}

impl core::fmt::Debug for Nodes {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Nodes")
            .field("total_slots", &self.slots.len())
            .field("alive", &self.live_count())
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl Nodes {
    pub(crate) fn with_root(center: Point) -> Self {
        Self {
            slots: vec![Some(Node::new(1, center, 0))],
            generations: vec![1],
            free_list: Vec::new(),
        }
    }

    pub(crate) const fn root(&self) -> NodeId {
        NodeId::new(0, 1)
    }

    pub(crate) fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        let n = self.slots.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.slots.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.get(id).expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.get_mut(id).expect("dangling NodeId")
    }

    pub(crate) fn live_count(&self) -> usize {
        self.slots.iter().filter(|n| n.is_some()).count()
    }

    /// Return the child of `parent` in `quadrant`, creating it at `center` if absent.
    pub(crate) fn child_or_insert(
        &mut self,
        parent: NodeId,
        quadrant: Quadrant,
        center: Point,
    ) -> NodeId {
        let p = self.node(parent);
        if let Some(child) = p.children[quadrant.index()] {
            return child;
        }
        let depth = p.depth + 1;
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(Node::new(generation, center, depth));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(Node::new(generation, center, depth)));
            self.generations.push(generation);
            (self.slots.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let id = NodeId::new(idx as u32, generation);
        let child = self.node_mut(id);
        child.parent = Some(parent);
        child.quadrant = Some(quadrant);
        self.node_mut(parent).children[quadrant.index()] = Some(id);
        id
    }

    /// Unlink `id` from its parent and free its slot.
    ///
    /// Purely structural: the caller guarantees the node has no children and no objects.
    /// The root is never detached.
    pub(crate) fn detach(&mut self, id: NodeId) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        let (Some(parent), Some(quadrant)) = (node.parent, node.quadrant) else {
            return false;
        };
        debug_assert!(node.is_empty(), "detaching a node that still holds data");
        if let Some(p) = self.get_mut(parent) {
            p.children[quadrant.index()] = None;
        }
        self.slots[id.idx()] = None;
        self.free_list.push(id.idx());
        true
    }

    /// Drop every node but a fresh root at `center`.
    ///
    /// Freed slots keep their generations, so ids from before the reset go stale.
    pub(crate) fn reset(&mut self, center: Point) {
        let generation = self.generations[0];
        self.slots[0] = Some(Node::new(generation, center, 0));
        self.free_list.clear();
        for (idx, slot) in self.slots.iter_mut().enumerate().skip(1).rev() {
            *slot = None;
            self.free_list.push(idx);
        }
    }
}
