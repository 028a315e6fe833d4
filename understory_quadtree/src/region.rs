// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tri-state visibility, the region capability and the loose-fit test.

use kurbo::{Circle, Point, Rect};

/// Classification of a box or object against a query region.
///
/// Ordered from most to least restrictive: `NotVisible < PartiallyVisible < FullyVisible`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Visibility {
    /// Entirely outside the region.
    NotVisible,
    /// Straddles the region boundary.
    PartiallyVisible,
    /// Entirely inside the region.
    FullyVisible,
}

impl Visibility {
    /// True unless [`Visibility::NotVisible`].
    #[inline]
    pub fn is_visible(self) -> bool {
        self != Self::NotVisible
    }
}

/// A query region.
///
/// Implementations must be monotone: a box contained in another box may never be classified
/// as more visible than the containing box. The query relies on this to prune subtrees and to
/// stop testing node boxes once a subtree is fully visible.
///
/// Boundaries are closed: touching counts as overlapping.
pub trait Region {
    /// Classify an axis-aligned box.
    fn classify_box(&self, bounds: Rect) -> Visibility;

    /// Classify an object's bounding circle.
    fn classify_circle(&self, circle: Circle) -> Visibility;
}

impl Region for Rect {
    fn classify_box(&self, b: Rect) -> Visibility {
        if b.x1 < self.x0 || b.x0 > self.x1 || b.y1 < self.y0 || b.y0 > self.y1 {
            Visibility::NotVisible
        } else if self.x0 <= b.x0 && b.x1 <= self.x1 && self.y0 <= b.y0 && b.y1 <= self.y1 {
            Visibility::FullyVisible
        } else {
            Visibility::PartiallyVisible
        }
    }

    fn classify_circle(&self, c: Circle) -> Visibility {
        let nearest = Point::new(
            c.center.x.clamp(self.x0, self.x1),
            c.center.y.clamp(self.y0, self.y1),
        );
        if (nearest - c.center).hypot2() > c.radius * c.radius {
            return Visibility::NotVisible;
        }
        self.classify_box(circle_bounds(&c))
    }
}

/// Circles are regions too; this is the object-against-object overlap test.
impl Region for Circle {
    fn classify_box(&self, b: Rect) -> Visibility {
        let nearest = Point::new(
            self.center.x.clamp(b.x0, b.x1),
            self.center.y.clamp(b.y0, b.y1),
        );
        let r2 = self.radius * self.radius;
        if (nearest - self.center).hypot2() > r2 {
            return Visibility::NotVisible;
        }
        let farthest = Point::new(
            if self.center.x - b.x0 > b.x1 - self.center.x {
                b.x0
            } else {
                b.x1
            },
            if self.center.y - b.y0 > b.y1 - self.center.y {
                b.y0
            } else {
                b.y1
            },
        );
        if (farthest - self.center).hypot2() <= r2 {
            Visibility::FullyVisible
        } else {
            Visibility::PartiallyVisible
        }
    }

    fn classify_circle(&self, c: Circle) -> Visibility {
        let d2 = (c.center - self.center).hypot2();
        let reach = self.radius + c.radius;
        if d2 > reach * reach {
            return Visibility::NotVisible;
        }
        let slack = self.radius - c.radius;
        if slack >= 0.0 && d2 <= slack * slack {
            Visibility::FullyVisible
        } else {
            Visibility::PartiallyVisible
        }
    }
}

/// Axis-aligned bounds of a circle.
#[inline]
pub(crate) fn circle_bounds(c: &Circle) -> Rect {
    Rect::new(
        c.center.x - c.radius,
        c.center.y - c.radius,
        c.center.x + c.radius,
        c.center.y + c.radius,
    )
}

/// Whether the whole circle lies inside the square centered at `center` with half-size `half`.
///
/// Boundaries are inclusive.
#[inline]
pub(crate) fn fits_in_box(c: &Circle, center: Point, half: f64) -> bool {
    !(c.center.x - c.radius < center.x - half
        || c.center.x + c.radius > center.x + half
        || c.center.y - c.radius < center.y - half
        || c.center.y + c.radius > center.y + half)
}
