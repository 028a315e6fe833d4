// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node and object iterators.
//!
//! All iterators visit children in [`Quadrant`](crate::Quadrant) order and are bounded by the
//! size (or depth) of the tree. A stale start id yields an empty sequence.

use alloc::collections::VecDeque;
use alloc::vec;
use alloc::vec::Vec;

use crate::node::Nodes;
use crate::types::{NodeId, ObjectKey};

/// Pre-order: a node before its children.
///
/// Returned by [`LooseQuadTree::depth_first`](crate::LooseQuadTree::depth_first).
#[derive(Debug)]
pub struct DepthFirst<'a> {
    nodes: &'a Nodes,
    stack: Vec<NodeId>,
}

impl<'a> DepthFirst<'a> {
    pub(crate) fn new(nodes: &'a Nodes, start: NodeId) -> Self {
        let stack = if nodes.is_alive(start) {
            vec![start]
        } else {
            Vec::new()
        };
        Self { nodes, stack }
    }
}

impl Iterator for DepthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let node = self.nodes.node(id);
        self.stack.extend(node.children.iter().rev().flatten());
        Some(id)
    }
}

/// Post-order: all children of a node before the node itself.
///
/// Returned by [`LooseQuadTree::post_order`](crate::LooseQuadTree::post_order).
#[derive(Debug)]
pub struct PostOrder<'a> {
    nodes: &'a Nodes,
    // (node, children already pushed)
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrder<'a> {
    pub(crate) fn new(nodes: &'a Nodes, start: NodeId) -> Self {
        let stack = if nodes.is_alive(start) {
            vec![(start, false)]
        } else {
            Vec::new()
        };
        Self { nodes, stack }
    }
}

impl Iterator for PostOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let (id, expanded) = self.stack.pop()?;
            if expanded {
                return Some(id);
            }
            self.stack.push((id, true));
            let node = self.nodes.node(id);
            self.stack
                .extend(node.children.iter().rev().flatten().map(|&c| (c, false)));
        }
    }
}

/// Level order: all nodes at depth `d` before any node at depth `d + 1`.
///
/// Returned by [`LooseQuadTree::breadth_first`](crate::LooseQuadTree::breadth_first).
#[derive(Debug)]
pub struct BreadthFirst<'a> {
    nodes: &'a Nodes,
    queue: VecDeque<NodeId>,
}

impl<'a> BreadthFirst<'a> {
    pub(crate) fn new(nodes: &'a Nodes, start: NodeId) -> Self {
        let mut queue = VecDeque::new();
        if nodes.is_alive(start) {
            queue.push_back(start);
        }
        Self { nodes, queue }
    }
}

impl Iterator for BreadthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.queue.pop_front()?;
        self.queue
            .extend(self.nodes.node(id).children.iter().flatten());
        Some(id)
    }
}

/// A node, then its parent, up to and including the root.
///
/// Lazy and cheap to clone, so a walk can be restarted from any point.
/// Returned by [`LooseQuadTree::ancestors`](crate::LooseQuadTree::ancestors).
#[derive(Clone, Debug)]
pub struct Ancestors<'a> {
    nodes: &'a Nodes,
    next: Option<NodeId>,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(nodes: &'a Nodes, start: NodeId) -> Self {
        Self {
            nodes,
            next: Some(start).filter(|&id| nodes.is_alive(id)),
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.nodes.node(id).parent;
        Some(id)
    }
}

/// Every object stored in a subtree, node by node in pre-order.
///
/// Returned by [`LooseQuadTree::objects_in`](crate::LooseQuadTree::objects_in).
#[derive(Debug)]
pub struct ObjectsIn<'a> {
    nodes: &'a Nodes,
    walk: DepthFirst<'a>,
    current: core::slice::Iter<'a, ObjectKey>,
}

impl<'a> ObjectsIn<'a> {
    pub(crate) fn new(nodes: &'a Nodes, start: NodeId) -> Self {
        Self {
            nodes,
            walk: DepthFirst::new(nodes, start),
            current: [].iter(),
        }
    }
}

impl Iterator for ObjectsIn<'_> {
    type Item = ObjectKey;

    fn next(&mut self) -> Option<ObjectKey> {
        loop {
            if let Some(&key) = self.current.next() {
                return Some(key);
            }
            let id = self.walk.next()?;
            let nodes = self.nodes;
            self.current = nodes.node(id).objects.iter();
        }
    }
}

/// Pre-order walk that only descends into a node's children when `f` returns `true` for it.
pub(crate) fn visit_each_if(nodes: &Nodes, start: NodeId, mut f: impl FnMut(NodeId) -> bool) {
    let mut stack = Vec::new();
    if nodes.is_alive(start) {
        stack.push(start);
    }
    while let Some(id) = stack.pop() {
        if f(id) {
            stack.extend(nodes.node(id).children.iter().rev().flatten());
        }
    }
}
