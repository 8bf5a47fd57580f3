//! Planar geometry for starlane placement.
//!
//! Systems are points; starlanes are segments between them. The lane
//! conditions ask three questions of a prospective lane:
//!
//! - does it cross an existing lane ([`segments_cross`])
//! - does it leave a system too close in angle to an existing lane
//!   ([`lanes_angularly_close`])
//! - does it pass too close to some other object ([`point_near_segment`])

use std::ops::{Add, Div, Mul, Neg, Sub};

use astrolabe_universe::UniverseObject;

/// Tolerance below which cross products count as zero.
const EPSILON: f64 = 1e-9;

/// Simple 2D vector with f64 precision.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
}

impl Vec2 {
    /// Construct a vector from components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Position of an object.
    #[must_use]
    pub fn of(object: &UniverseObject) -> Self {
        Self::new(object.x, object.y)
    }

    /// Squared length of the vector.
    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Length (magnitude) of the vector.
    #[must_use]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Unit vector in the same direction, or `None` for a zero vector.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len <= f64::EPSILON {
            None
        } else {
            Some(self / len)
        }
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    ///
    /// Positive when `other` is counter-clockwise from `self`.
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Distance between two points.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

fn sign(value: f64) -> i8 {
    if value > EPSILON {
        1
    } else if value < -EPSILON {
        -1
    } else {
        0
    }
}

/// Whether `point`, known to be colinear with `a`-`b`, lies strictly inside it.
fn strictly_between(point: Vec2, a: Vec2, b: Vec2) -> bool {
    (a - point).dot(b - point) < 0.0
}

/// Whether segment `p1`-`p2` crosses segment `q1`-`q2`.
///
/// Segments sharing an endpoint never cross: lanes meeting at a system are
/// not a crossing, and a lane identical to an existing one is not a new
/// crossing either. Touching the interior of the other segment and
/// overlapping colinear segments both count as crossing. Symmetric in its
/// two segments and in the order of each segment's endpoints.
#[must_use]
pub fn segments_cross(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    if p1 == q1 || p1 == q2 || p2 == q1 || p2 == q2 {
        return false;
    }

    let r = p2 - p1;
    let s = q2 - q1;
    let d1 = sign(r.cross(q1 - p1));
    let d2 = sign(r.cross(q2 - p1));
    let d3 = sign(s.cross(p1 - q1));
    let d4 = sign(s.cross(p2 - q1));

    if d1 * d2 < 0 && d3 * d4 < 0 {
        return true;
    }

    // Sign tests miss endpoints lying on the other segment.
    (d1 == 0 && strictly_between(q1, p1, p2))
        || (d2 == 0 && strictly_between(q2, p1, p2))
        || (d3 == 0 && strictly_between(p1, q1, q2))
        || (d4 == 0 && strictly_between(p2, q1, q2))
}

/// Whether lanes `shared`-`end_a` and `shared`-`end_b` leave `shared` at
/// too small an angle.
///
/// Compares the dot product of the unit direction vectors with
/// `max_dot_product`. Zero-length lanes are never close.
#[must_use]
pub fn lanes_angularly_close(shared: Vec2, end_a: Vec2, end_b: Vec2, max_dot_product: f64) -> bool {
    let (Some(a), Some(b)) = ((end_a - shared).normalized(), (end_b - shared).normalized()) else {
        return false;
    };
    a.dot(b) > max_dot_product
}

/// Whether `point` lies within `max_distance` of segment `start`-`end`.
#[must_use]
pub fn point_near_segment(point: Vec2, start: Vec2, end: Vec2, max_distance: f64) -> bool {
    // Bounding box, padded by the distance.
    if point.x < start.x.min(end.x) - max_distance
        || point.x > start.x.max(end.x) + max_distance
        || point.y < start.y.min(end.y) - max_distance
        || point.y > start.y.max(end.y) + max_distance
    {
        return false;
    }

    let max_squared = max_distance * max_distance;
    if (point - start).length_squared() <= max_squared
        || (point - end).length_squared() <= max_squared
    {
        return true;
    }

    let along = end - start;
    let length = along.length();
    if length <= f64::EPSILON {
        return false;
    }

    // Perpendicular distance only counts beside the segment.
    if (point - start).dot(along) < 0.0 || (point - end).dot(-along) < 0.0 {
        return false;
    }
    along.cross(point - start).abs() / length <= max_distance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn perpendicular_segments_cross() {
        assert!(segments_cross(v(1.0, 1.0), v(1.0, -1.0), v(0.0, 0.0), v(2.0, 0.0)));
    }

    #[test]
    fn disjoint_segments_do_not_cross() {
        assert!(!segments_cross(v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0), v(1.0, 1.0)));
        assert!(!segments_cross(v(0.0, 0.0), v(1.0, 1.0), v(3.0, 0.0), v(2.0, 2.0)));
    }

    #[test]
    fn shared_endpoint_never_crosses() {
        assert!(!segments_cross(v(0.0, 0.0), v(2.0, 0.0), v(0.0, 0.0), v(0.0, 2.0)));
        // Even when folded back over each other.
        assert!(!segments_cross(v(0.0, 0.0), v(2.0, 0.0), v(0.0, 0.0), v(1.0, 0.0)));
    }

    #[test]
    fn identical_segments_do_not_cross() {
        assert!(!segments_cross(v(0.0, 0.0), v(2.0, 2.0), v(2.0, 2.0), v(0.0, 0.0)));
    }

    #[test]
    fn touching_interior_crosses() {
        // T-junction: q1 lies inside p.
        assert!(segments_cross(v(0.0, 0.0), v(4.0, 0.0), v(2.0, 0.0), v(2.0, 3.0)));
    }

    #[test]
    fn colinear_overlap_crosses_but_colinear_gap_does_not() {
        assert!(segments_cross(v(0.0, 0.0), v(3.0, 0.0), v(2.0, 0.0), v(5.0, 0.0)));
        assert!(!segments_cross(v(0.0, 0.0), v(1.0, 0.0), v(2.0, 0.0), v(5.0, 0.0)));
    }

    #[test]
    fn angular_closeness() {
        let origin = v(0.0, 0.0);
        assert!(lanes_angularly_close(origin, v(10.0, 0.0), v(10.0, 1.0), 0.87));
        assert!(!lanes_angularly_close(origin, v(10.0, 0.0), v(0.0, 10.0), 0.87));
        assert!(!lanes_angularly_close(origin, origin, v(0.0, 10.0), 0.87));
    }

    #[test]
    fn proximity() {
        let (a, b) = (v(0.0, 0.0), v(100.0, 0.0));
        assert!(point_near_segment(v(50.0, 5.0), a, b, 10.0));
        assert!(!point_near_segment(v(50.0, 15.0), a, b, 10.0));
        // Near an endpoint.
        assert!(point_near_segment(v(-3.0, 3.0), a, b, 5.0));
        // Beyond the end but inside the padded box.
        assert!(!point_near_segment(v(108.0, 8.0), a, b, 10.0));
        // Far outside the box.
        assert!(!point_near_segment(v(500.0, 0.0), a, b, 10.0));
    }

    #[test]
    fn vector_ops() {
        let a = v(3.0, 4.0);
        assert!((a.length() - 5.0).abs() < f64::EPSILON);
        assert_eq!(a - v(1.0, 1.0), v(2.0, 3.0));
        assert_eq!(-a, v(-3.0, -4.0));
        assert!((v(1.0, 0.0).cross(v(0.0, 1.0)) - 1.0).abs() < f64::EPSILON);
        assert!(Vec2::default().normalized().is_none());
    }
}
