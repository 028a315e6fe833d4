// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree: object table, insertion, removal, move notifications and node accessors.

use alloc::vec::Vec;
use core::fmt::Debug;
use kurbo::{Circle, Point, Rect};

use crate::config::{Config, ConfigError};
use crate::node::{Node, Nodes};
use crate::region::fits_in_box;
use crate::traverse::{Ancestors, BreadthFirst, DepthFirst, ObjectsIn, PostOrder, visit_each_if};
use crate::types::{NodeId, ObjectKey, Placement, Quadrant};

#[derive(Clone, Debug)]
pub(crate) struct Entry<P> {
    generation: u32,
    pub(crate) circle: Circle,
    pub(crate) payload: P,
    /// Node currently holding the object.
    pub(crate) node: NodeId,
    /// Last update pass that examined the object.
    pub(crate) epoch: u64,
}

/// A loose quadtree over bounded-radius objects.
///
/// The tree owns its nodes and a table of tracked objects. Each object is a bounding circle
/// plus a caller payload `P`, addressed by the [`ObjectKey`] returned from [`insert`](Self::insert).
///
/// Moves are reported with [`set_circle`](Self::set_circle) (or its position/radius shorthands)
/// and take structural effect on the next [`update`](Self::update). Empty nodes are only removed
/// by [`prune_empty_nodes`](Self::prune_empty_nodes).
pub struct LooseQuadTree<P: Copy + Debug> {
    pub(crate) config: Config,
    pub(crate) nodes: Nodes,
    entries: Vec<Option<Entry<P>>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    len: usize,
    pub(crate) epoch: u64,
}

impl<P: Copy + Debug> Debug for LooseQuadTree<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LooseQuadTree")
            .field("config", &self.config)
            .field("objects", &self.len)
            .field("nodes", &self.nodes)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl<P: Copy + Debug> Default for LooseQuadTree<P> {
    fn default() -> Self {
        Self::with_valid_config(Config::default())
    }
}

impl<P: Copy + Debug> LooseQuadTree<P> {
    /// Create an empty tree (a lone root node) after validating `config`.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: Config) -> Self {
        Self {
            config,
            nodes: Nodes::with_root(config.center()),
            entries: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            epoch: 0,
        }
    }

    /// The parameters this tree was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of tracked objects.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no objects are tracked.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove every object and every node but the root.
    pub fn clear(&mut self) {
        self.nodes.reset(self.config.center());
        // Generations survive so keys from before the clear go stale.
        self.free_list.clear();
        for (idx, slot) in self.entries.iter_mut().enumerate().rev() {
            *slot = None;
            self.free_list.push(idx);
        }
        self.len = 0;
    }

    // --- objects ---

    /// Track a new object and place it at the deepest node it fits.
    ///
    /// Nodes are created below depth `d` only while `d + 1 < max_depth`, so the deepest
    /// landing depth is `max_depth - 1` (4 with the default config).
    ///
    /// Returns `None` (and asserts in debug builds) if the circle has a negative or
    /// non-finite radius or a non-finite center.
    pub fn insert(&mut self, circle: Circle, payload: P) -> Option<Placement> {
        let valid = is_valid_circle(&circle);
        debug_assert!(
            valid,
            "object circle must be finite with a non-negative radius: {circle:?}"
        );
        if !valid {
            return None;
        }
        let root = self.nodes.root();
        let entry = |generation| Entry {
            generation,
            circle,
            payload,
            node: root,
            epoch: 0,
        };
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.entries[idx] = Some(entry(generation));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.entries.push(Some(entry(generation)));
            self.generations.push(generation);
            (self.entries.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "ObjectKey uses 32-bit indices by design."
        )]
        let key = ObjectKey::new(idx as u32, generation);
        self.len += 1;
        let (node, depth) = self.place(key, root);
        Some(Placement { key, node, depth })
    }

    /// Stop tracking an object.
    ///
    /// Returns `false` (and asserts in debug builds) if `key` is not tracked.
    /// The node that held the object is left in place until the next prune.
    pub fn remove(&mut self, key: ObjectKey) -> bool {
        let node = self.entry(key).map(|e| e.node);
        debug_assert!(node.is_some(), "removing an object that is not tracked: {key:?}");
        let Some(node) = node else {
            return false;
        };
        self.detach_object(key, node);
        self.entries[key.idx()] = None;
        self.free_list.push(key.idx());
        self.len -= 1;
        true
    }

    /// Report a new bounding circle for an object.
    ///
    /// The object keeps its node until the next [`update`](Self::update).
    /// Stale keys are ignored; invalid circles assert in debug builds and are ignored otherwise.
    pub fn set_circle(&mut self, key: ObjectKey, circle: Circle) {
        let valid = is_valid_circle(&circle);
        debug_assert!(
            valid,
            "object circle must be finite with a non-negative radius: {circle:?}"
        );
        if !valid {
            return;
        }
        if let Some(e) = self.entry_mut(key) {
            e.circle = circle;
        }
    }

    /// Report a new position for an object, keeping its radius.
    pub fn set_position(&mut self, key: ObjectKey, center: Point) {
        if let Some(radius) = self.entry(key).map(|e| e.circle.radius) {
            self.set_circle(key, Circle::new(center, radius));
        }
    }

    /// Report a new radius for an object, keeping its position.
    pub fn set_radius(&mut self, key: ObjectKey, radius: f64) {
        if let Some(center) = self.entry(key).map(|e| e.circle.center) {
            self.set_circle(key, Circle::new(center, radius));
        }
    }

    /// True if `key` refers to a tracked object.
    pub fn contains(&self, key: ObjectKey) -> bool {
        self.entry(key).is_some()
    }

    /// Payload of a tracked object.
    pub fn get(&self, key: ObjectKey) -> Option<&P> {
        self.entry(key).map(|e| &e.payload)
    }

    /// Last reported bounding circle of a tracked object.
    pub fn circle(&self, key: ObjectKey) -> Option<Circle> {
        self.entry(key).map(|e| e.circle)
    }

    /// Node currently holding a tracked object.
    pub fn node_of(&self, key: ObjectKey) -> Option<NodeId> {
        self.entry(key).map(|e| e.node)
    }

    /// Depth of the node currently holding a tracked object.
    pub fn depth_of(&self, key: ObjectKey) -> Option<u8> {
        let node = self.node_of(key)?;
        Some(self.nodes.node(node).depth)
    }

    /// All tracked objects, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectKey, P)> + '_ {
        self.entries.iter().enumerate().filter_map(|(i, e)| {
            let e = e.as_ref()?;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ObjectKey uses 32-bit indices by design."
            )]
            let idx = i as u32;
            Some((ObjectKey::new(idx, e.generation), e.payload))
        })
    }

    // --- nodes ---

    /// The root node. It is never pruned.
    pub fn root(&self) -> NodeId {
        self.nodes.root()
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes.is_alive(id)
    }

    /// Number of live nodes, root included.
    pub fn count_nodes(&self) -> usize {
        self.depth_first(self.root()).count()
    }

    /// Loose box of a node: the square of half-size `half_size(depth)` around its center.
    pub fn node_bounds(&self, id: NodeId) -> Option<Rect> {
        self.nodes.get(id).map(|n| self.loose_box(n))
    }

    /// Center of a node.
    pub fn node_center(&self, id: NodeId) -> Option<Point> {
        self.nodes.get(id).map(|n| n.center)
    }

    /// Depth of a node (root = 0).
    pub fn node_depth(&self, id: NodeId) -> Option<u8> {
        self.nodes.get(id).map(|n| n.depth)
    }

    /// Which of its parent's slots a node occupies; `None` for the root.
    pub fn node_quadrant(&self, id: NodeId) -> Option<Quadrant> {
        self.nodes.get(id)?.quadrant
    }

    /// Parent of a node; `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    /// Existing children of a node, in [`Quadrant`] order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .get(id)
            .into_iter()
            .flat_map(|n| n.children.iter().flatten().copied())
    }

    /// Number of existing children of a node.
    pub fn num_children(&self, id: NodeId) -> usize {
        self.nodes.get(id).map_or(0, Node::num_children)
    }

    /// The other children of a node's parent.
    pub fn siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.parent(id)
            .into_iter()
            .flat_map(move |p| self.children(p))
            .filter(move |&c| c != id)
    }

    /// Objects stored directly in a node.
    pub fn objects_at(&self, id: NodeId) -> &[ObjectKey] {
        self.nodes.get(id).map_or(&[][..], |n| n.objects.as_slice())
    }

    /// Detach an empty node from its parent.
    ///
    /// Returns `false` for the root and stale ids. A node that still has children or objects is
    /// refused as well (with a debug assertion): removing it would orphan them.
    pub fn remove_empty_node(&mut self, id: NodeId) -> bool {
        if id == self.root() {
            return false;
        }
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        let empty = node.is_empty();
        debug_assert!(empty, "refusing to remove a non-empty node: {id:?}");
        empty && self.nodes.detach(id)
    }

    /// Whether `circle` fits the loose box of `id`.
    pub fn fits_in_node(&self, id: NodeId, circle: &Circle) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|n| fits_in_box(circle, n.center, self.config.half_size(n.depth)))
    }

    /// Whether `circle` fits the loose box of the child of `id` it would be routed to.
    ///
    /// Always false at the deepest level.
    pub fn fits_in_child_node(&self, id: NodeId, circle: &Circle) -> bool {
        self.is_alive(id) && self.routed_child(id, circle).is_some()
    }

    // --- traversal ---

    /// Pre-order walk of the subtree at `start`.
    pub fn depth_first(&self, start: NodeId) -> DepthFirst<'_> {
        DepthFirst::new(&self.nodes, start)
    }

    /// Post-order walk of the subtree at `start`.
    pub fn post_order(&self, start: NodeId) -> PostOrder<'_> {
        PostOrder::new(&self.nodes, start)
    }

    /// Level-order walk of the subtree at `start`.
    pub fn breadth_first(&self, start: NodeId) -> BreadthFirst<'_> {
        BreadthFirst::new(&self.nodes, start)
    }

    /// `start`, its parent, and so on up to the root.
    pub fn ancestors(&self, start: NodeId) -> Ancestors<'_> {
        Ancestors::new(&self.nodes, start)
    }

    /// Every object stored in the subtree at `start`, node by node in pre-order.
    pub fn objects_in(&self, start: NodeId) -> ObjectsIn<'_> {
        ObjectsIn::new(&self.nodes, start)
    }

    /// Call `f` for every node of the subtree at `start`, in pre-order.
    pub fn visit_each(&self, start: NodeId, f: impl FnMut(NodeId)) {
        self.depth_first(start).for_each(f);
    }

    /// Pre-order walk that descends into a node's children only when `f` returns `true` for it.
    pub fn visit_each_if(&self, start: NodeId, f: impl FnMut(NodeId) -> bool) {
        visit_each_if(&self.nodes, start, f);
    }

    // --- internals ---

    pub(crate) fn entry(&self, key: ObjectKey) -> Option<&Entry<P>> {
        let e = self.entries.get(key.idx())?.as_ref()?;
        (e.generation == key.1).then_some(e)
    }

    pub(crate) fn entry_mut(&mut self, key: ObjectKey) -> Option<&mut Entry<P>> {
        let e = self.entries.get_mut(key.idx())?.as_mut()?;
        if e.generation != key.1 {
            return None;
        }
        Some(e)
    }

    pub(crate) fn loose_box(&self, n: &Node) -> Rect {
        let h = self.config.half_size(n.depth);
        Rect::new(n.center.x - h, n.center.y - h, n.center.x + h, n.center.y + h)
    }

    /// The child slot of `id` that `circle` routes to, with that child's center, if the circle
    /// fits the child's loose box.
    pub(crate) fn routed_child(&self, id: NodeId, circle: &Circle) -> Option<(Quadrant, Point)> {
        let n = self.nodes.node(id);
        if !self.config.can_descend(n.depth) {
            return None;
        }
        let quadrant = Quadrant::classify(circle.center, n.center);
        let center = quadrant.child_center(n.center, self.config.child_offset(n.depth));
        fits_in_box(circle, center, self.config.half_size(n.depth + 1)).then_some((quadrant, center))
    }

    /// Descend from `start` while the object fits the routed child, creating children on the
    /// way, then store it. Returns the landing node and its depth.
    pub(crate) fn place(&mut self, key: ObjectKey, start: NodeId) -> (NodeId, u8) {
        let circle = self.entries[key.idx()]
            .as_ref()
            .map(|e| e.circle)
            .expect("placing an untracked object");
        let mut q = start;
        while let Some((quadrant, center)) = self.routed_child(q, &circle) {
            q = self.nodes.child_or_insert(q, quadrant, center);
        }
        let node = self.nodes.node_mut(q);
        node.objects.push(key);
        let depth = node.depth;
        if let Some(e) = self.entry_mut(key) {
            e.node = q;
        }
        (q, depth)
    }

    /// Remove `key` from the object list of `node`.
    pub(crate) fn detach_object(&mut self, key: ObjectKey, node: NodeId) {
        if let Some(n) = self.nodes.get_mut(node)
            && let Some(pos) = n.objects.iter().position(|&k| k == key)
        {
            n.objects.remove(pos);
        }
    }
}

fn is_valid_circle(c: &Circle) -> bool {
    c.center.x.is_finite() && c.center.y.is_finite() && c.radius.is_finite() && c.radius >= 0.0
}
