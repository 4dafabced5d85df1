//! Core geometry types for cyclo-drive.
//!
//! Everything here is planar and measured in millimetres. Angles are radians.
//!
//! ## Rust Lesson #3: Structs & Derives
//!
//! `#[derive(...)]` generates the boring parts for us:
//! - `Copy` = a `Point` is two floats, so passing it by value is free
//! - `Serialize`/`Deserialize` = serde can turn it into JSON for the CLI
//! - `PartialEq` = tests can compare with `==`

use lyon_geom::point;
use serde::{Deserialize, Serialize};

/// A 2D point with x,y coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A circle: ring pins, output pins, disc holes and bores are all circles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` from the origin, `angle` radians counter-clockwise from +x.
    #[inline]
    pub fn polar(radius: f64, angle: f64) -> Self {
        Self::new(radius * angle.cos(), radius * angle.sin())
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Distance from the origin.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Polar angle in radians, in (-π, π].
    #[inline]
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Rotate around the origin.
    ///
    /// `self` is `Copy`, so this hands back a new point and leaves the
    /// original untouched (points are never mutated after they are produced).
    #[inline]
    pub fn rotated(&self, angle: f64) -> Self {
        let (sin_a, cos_a) = angle.sin_cos();
        Self::new(self.x * cos_a - self.y * sin_a, self.x * sin_a + self.y * cos_a)
    }

    #[inline]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Distance from this point to the segment `a`-`b`.
    pub fn distance_to_segment(&self, a: Point, b: Point) -> f64 {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len_sq = dx * dx + dy * dy;
        if len_sq <= f64::EPSILON {
            return self.distance(a);
        }
        let t = (((self.x - a.x) * dx + (self.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
        self.distance(Point::new(a.x + t * dx, a.y + t * dy))
    }
}

impl From<Point> for lyon_geom::Point<f64> {
    fn from(p: Point) -> Self {
        point(p.x, p.y)
    }
}

impl From<lyon_geom::Point<f64>> for Point {
    fn from(p: lyon_geom::Point<f64>) -> Self {
        Point::new(p.x, p.y)
    }
}

impl Circle {
    #[inline]
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    #[inline]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.center.translated(dx, dy), self.radius)
    }
}

/// Calculate signed area of a point sequence using the shoelace formula.
///
/// Returns:
/// - Positive value for counter-clockwise winding
/// - Negative value for clockwise winding
pub fn signed_area_of_points(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    area / 2.0
}

/// Orientation of `r` relative to the directed line `p`→`q`.
///
/// Positive when `r` is to the left, negative to the right, zero when collinear.
#[inline]
pub fn orient(p: Point, q: Point, r: Point) -> f64 {
    (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x)
}

/// `q` lies inside the bounding box of `p`-`r` (used for collinear cases).
#[inline]
fn on_segment(p: Point, q: Point, r: Point, eps: f64) -> bool {
    q.x >= p.x.min(r.x) - eps
        && q.x <= p.x.max(r.x) + eps
        && q.y >= p.y.min(r.y) - eps
        && q.y <= p.y.max(r.y) + eps
}

/// Test whether segments `a`-`b` and `c`-`d` intersect (touching counts).
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point, eps: f64) -> bool {
    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);

    let straddles = |u: f64, v: f64| (u > eps && v < -eps) || (u < -eps && v > eps);
    if straddles(o1, o2) && straddles(o3, o4) {
        return true;
    }

    (o1.abs() <= eps && on_segment(a, c, b, eps))
        || (o2.abs() <= eps && on_segment(a, d, b, eps))
        || (o3.abs() <= eps && on_segment(c, a, d, eps))
        || (o4.abs() <= eps && on_segment(c, b, d, eps))
}

// ============================================================================
// TESTS
// ============================================================================
