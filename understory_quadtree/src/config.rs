// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree parameters and their validation.

use kurbo::{Point, Rect};
use thiserror::Error;

/// Immutable parameters of a [`LooseQuadTree`](crate::LooseQuadTree).
///
/// The world is the square of side `world_size` centered at `center`. Node boxes are
/// enlarged by the looseness factor `K`: a node at depth `d` has half-size
/// `K · world_size / 2^(d+1)`, while its nominal quadrant has half-size `world_size / 2^(d+1)`.
///
/// `K = 1` is a standard quadtree. `K = 2` is a good default: a child's loose box then
/// reaches its parent's center, so objects straddling a split line still descend.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Config {
    world_size: f64,
    loose_k: f64,
    max_depth: u8,
    center: Point,
}

/// Reasons a [`Config`] is rejected.
#[derive(Copy, Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The world size must be finite and strictly positive.
    #[error("world size must be finite and positive, got {0}")]
    InvalidWorldSize(f64),

    /// The looseness factor must be finite and at least 1.
    #[error("looseness factor must be finite and >= 1, got {0}")]
    InvalidLooseness(f64),

    /// At least one level (the root) is required.
    #[error("max depth must be at least 1")]
    ZeroMaxDepth,

    /// Depths beyond the limit would underflow the node half-size computation.
    #[error("max depth {0} exceeds the supported limit of {limit}", limit = Config::MAX_DEPTH_LIMIT)]
    MaxDepthTooLarge(u8),

    /// The world center must have finite coordinates.
    #[error("world center must be finite, got ({0}, {1})")]
    InvalidCenter(f64, f64),
}

impl Config {
    /// Default world side length.
    pub const DEFAULT_WORLD_SIZE: f64 = 1000.0;
    /// Default looseness factor.
    pub const DEFAULT_LOOSE_K: f64 = 2.0;
    /// Default number of levels.
    pub const DEFAULT_MAX_DEPTH: u8 = 5;
    /// Largest accepted `max_depth`.
    pub const MAX_DEPTH_LIMIT: u8 = 32;

    /// A config for a world of side `world_size` centered at the origin, with default
    /// looseness and depth.
    pub const fn new(world_size: f64) -> Self {
        Self {
            world_size,
            loose_k: Self::DEFAULT_LOOSE_K,
            max_depth: Self::DEFAULT_MAX_DEPTH,
            center: Point::ORIGIN,
        }
    }

    /// Set the looseness factor `K`.
    pub const fn with_loose_k(mut self, loose_k: f64) -> Self {
        self.loose_k = loose_k;
        self
    }

    /// Set the number of levels. Objects are stored at depths `0..max_depth`, so the deepest
    /// level actually used is `max_depth - 1`.
    pub const fn with_max_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Move the world center (and so the root node center).
    pub const fn with_center(mut self, center: Point) -> Self {
        self.center = center;
        self
    }

    /// Side length of the world.
    pub const fn world_size(&self) -> f64 {
        self.world_size
    }

    /// Looseness factor `K`.
    pub const fn loose_k(&self) -> f64 {
        self.loose_k
    }

    /// Number of levels.
    pub const fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// Center of the world and of the root node.
    pub const fn center(&self) -> Point {
        self.center
    }

    /// Check every parameter, returning the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.world_size.is_finite() && self.world_size > 0.0) {
            return Err(ConfigError::InvalidWorldSize(self.world_size));
        }
        if !(self.loose_k.is_finite() && self.loose_k >= 1.0) {
            return Err(ConfigError::InvalidLooseness(self.loose_k));
        }
        if self.max_depth < 1 {
            return Err(ConfigError::ZeroMaxDepth);
        }
        if self.max_depth > Self::MAX_DEPTH_LIMIT {
            return Err(ConfigError::MaxDepthTooLarge(self.max_depth));
        }
        if !(self.center.x.is_finite() && self.center.y.is_finite()) {
            return Err(ConfigError::InvalidCenter(self.center.x, self.center.y));
        }
        Ok(())
    }

    /// Half-size of the loose box of a node at `depth`.
    #[inline]
    pub fn half_size(&self, depth: u8) -> f64 {
        self.loose_k * self.nominal_half_size(depth)
    }

    /// Distance from a node center at `depth` to each of its children's centers.
    #[inline]
    pub fn child_offset(&self, depth: u8) -> f64 {
        self.nominal_half_size(depth) / 2.0
    }

    /// Whether nodes at `depth` may still have children.
    #[inline]
    pub const fn can_descend(&self, depth: u8) -> bool {
        (depth as u16) + 1 < self.max_depth as u16
    }

    /// The nominal (non-loose) world square.
    pub fn world_bounds(&self) -> Rect {
        let h = self.world_size / 2.0;
        Rect::new(
            self.center.x - h,
            self.center.y - h,
            self.center.x + h,
            self.center.y + h,
        )
    }

    #[inline]
    fn nominal_half_size(&self, depth: u8) -> f64 {
        // Exact: depth <= MAX_DEPTH_LIMIT keeps this well inside f64's mantissa.
        let divisor = (1_u64 << (u32::from(depth) + 1)) as f64;
        self.world_size / divisor
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WORLD_SIZE)
    }
}
