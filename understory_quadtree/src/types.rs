// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the quadtree: node and object handles, quadrants, placements.

use kurbo::Point;

/// Identifier for a node in the tree.
///
/// This is a small, copyable handle that stays stable while the node exists and
/// becomes invalid once the node is pruned.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - When insertion creates a node, a fresh slot is allocated with generation `1`.
/// - When pruning removes a node, its slot is freed; any existing `NodeId` that pointed to it is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// Use [`LooseQuadTree::is_alive`](crate::LooseQuadTree::is_alive) to check whether a `NodeId`
/// still refers to a live node. Stale ids never alias a different live node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Generational handle for a tracked object.
///
/// Keys are minted by [`LooseQuadTree::insert`](crate::LooseQuadTree::insert) and are the
/// stable identity used for moves and removal. A removed key never matches a later object.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObjectKey(pub(crate) u32, pub(crate) u32);

impl ObjectKey {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// One of the four child slots of a node.
///
/// Kurbo's coordinate convention is y-down, so "top" is the smaller y.
///
/// Classification uses a strict comparison against the node center: a coordinate equal to the
/// center goes to the low bucket (left or top). Insertion, the fit tests and the update engine
/// all route through [`Quadrant::classify`], so an object can never oscillate between siblings.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Quadrant {
    /// Low x, low y.
    TopLeft = 0,
    /// High x, low y.
    TopRight = 1,
    /// Low x, high y.
    BottomLeft = 2,
    /// High x, high y.
    BottomRight = 3,
}

impl Quadrant {
    /// All quadrants in child order.
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// Classify `p` relative to `center`.
    #[inline]
    pub fn classify(p: Point, center: Point) -> Self {
        match (p.x > center.x, p.y > center.y) {
            (false, false) => Self::TopLeft,
            (true, false) => Self::TopRight,
            (false, true) => Self::BottomLeft,
            (true, true) => Self::BottomRight,
        }
    }

    /// Slot index in a node's child array.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Center of this quadrant's child box, given the parent center and the child offset.
    #[inline]
    pub fn child_center(self, center: Point, offset: f64) -> Point {
        let dx = if self.is_right() { offset } else { -offset };
        let dy = if self.is_bottom() { offset } else { -offset };
        Point::new(center.x + dx, center.y + dy)
    }

    #[inline]
    const fn is_right(self) -> bool {
        matches!(self, Self::TopRight | Self::BottomRight)
    }

    #[inline]
    const fn is_bottom(self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomRight)
    }
}

/// Where an inserted object landed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Handle of the new object.
    pub key: ObjectKey,
    /// Node now holding the object.
    pub node: NodeId,
    /// Depth of that node (root = 0).
    pub depth: u8,
}
