//! Axis-aligned rectangle geometry
//!
//! All region bounds in this crate are axis-aligned rectangles in world units.
//! The operations here are pure and never fail: rectangles are well formed by
//! construction (`min <= max` on both axes).

use glam::{Vec2, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle with `min` as the bottom-left and `max` as the
/// top-right corner.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Bottom-left corner
    pub min: Vec2,
    /// Top-right corner
    pub max: Vec2,
}

impl Rect {
    /// Create a rectangle from two corners
    ///
    /// The corners are normalized so that `min <= max` holds on both axes.
    ///
    /// # Example
    ///
    /// ```
    /// use region_partition::Rect;
    /// use glam::Vec2;
    ///
    /// let rect = Rect::new(Vec2::new(10.0, 0.0), Vec2::new(0.0, 5.0));
    /// assert_eq!(rect.min, Vec2::new(0.0, 0.0));
    /// assert_eq!(rect.area(), 50.0);
    /// ```
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create a rectangle from its bottom-left corner and size
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin, origin + size)
    }

    /// Square centered on the origin, spanning `-extent..=extent` on both axes
    pub fn centered_square(extent: f32) -> Self {
        Self::new(Vec2::splat(-extent), Vec2::splat(extent))
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Whether `point` lies inside or on the border
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Whether `other` lies fully inside this rectangle (borders may coincide)
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// Whether the interiors of the two rectangles overlap
    ///
    /// Rectangles that only share an edge or a corner do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Intersection of two rectangles, `None` when the interiors do not overlap
    pub fn overlap(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        })
    }

    /// Shortest Euclidean distance between the boundaries of two rectangles
    ///
    /// The gap is measured independently on each axis (zero where the
    /// projections overlap or touch) and then combined.
    ///
    /// # Example
    ///
    /// ```
    /// use region_partition::Rect;
    /// use glam::Vec2;
    ///
    /// let a = Rect::new(Vec2::ZERO, Vec2::splat(10.0));
    /// let b = Rect::new(Vec2::new(13.0, 14.0), Vec2::new(20.0, 20.0));
    /// assert_eq!(a.gap_distance(&b), 5.0);
    /// ```
    pub fn gap_distance(&self, other: &Rect) -> f32 {
        let dx = axis_gap(self.min.x, self.max.x, other.min.x, other.max.x);
        let dy = axis_gap(self.min.y, self.max.y, other.min.y, other.max.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Remove `other` from this rectangle
    ///
    /// Returns up to four disjoint rectangles covering `self \ other`: a top and
    /// a bottom slab spanning the full width, and a left and a right slab
    /// spanning the height of the intersection. Zero-area slabs are dropped.
    /// When the rectangles do not overlap, `self` is returned unchanged.
    pub fn subtract(&self, other: &Rect) -> Vec<Rect> {
        let Some(cut) = self.overlap(other) else {
            return vec![*self];
        };

        let candidates = [
            // top
            Rect {
                min: Vec2::new(self.min.x, cut.max.y),
                max: self.max,
            },
            // bottom
            Rect {
                min: self.min,
                max: Vec2::new(self.max.x, cut.min.y),
            },
            // left
            Rect {
                min: Vec2::new(self.min.x, cut.min.y),
                max: Vec2::new(cut.min.x, cut.max.y),
            },
            // right
            Rect {
                min: Vec2::new(cut.max.x, cut.min.y),
                max: Vec2::new(self.max.x, cut.max.y),
            },
        ];

        candidates.into_iter().filter(|r| r.area() > 0.0).collect()
    }

    /// Center and half extents of the box volume a renderer would draw for this
    /// region, lying on the `z = 0` plane with the given half height.
    pub fn box_center_extent(&self, half_height: f32) -> (Vec3, Vec3) {
        let center = self.center();
        let half = self.size() * 0.5;
        (
            Vec3::new(center.x, center.y, 0.0),
            Vec3::new(half.x, half.y, half_height),
        )
    }
}

fn axis_gap(a_min: f32, a_max: f32, b_min: f32, b_max: f32) -> f32 {
    if a_max < b_min {
        b_min - a_max
    } else if b_max < a_min {
        a_min - b_max
    } else {
        0.0
    }
}
