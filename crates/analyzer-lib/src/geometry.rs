//! Geometry kernel for landmark coordinates
//!
//! Pure functions over normalized 2D/3D points. Degenerate inputs resolve to
//! fixed fallbacks instead of errors.

use std::ops::Sub;

/// Angle reported when a vector has zero length
pub const DEGENERATE_ANGLE_DEGREES: f64 = 90.0;

/// A point in normalized image space; `z` is 0 for planar points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn planar(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0)
    }

    fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Angle at `vertex` between the rays towards `a` and `b`, in [0, 180]
///
/// Uses cos(θ) = (v1 · v2) / (|v1| × |v2|) with the cosine clipped to
/// [-1, 1]. Coincident points give [`DEGENERATE_ANGLE_DEGREES`].
pub fn angle_at(vertex: Point, a: Point, b: Point) -> f64 {
    let v1 = a - vertex;
    let v2 = b - vertex;

    let mag1 = v1.norm();
    let mag2 = v2.norm();
    if mag1 < f64::EPSILON || mag2 < f64::EPSILON {
        return DEGENERATE_ANGLE_DEGREES;
    }

    let cos_angle = (v1.dot(&v2) / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

/// How far a limb bends away from straight at `joint`, in [0, 180]
///
/// Measured between the directions `proximal → joint` and `joint → distal`,
/// so a straight limb is 0°.
pub fn segment_deflection(proximal: Point, joint: Point, distal: Point) -> f64 {
    180.0 - angle_at(joint, proximal, distal)
}

/// Signed angle of the line from `a` to `b` against the horizontal, in (-180, 180]
pub fn line_angle(a: Point, b: Point) -> f64 {
    let angle = (b.y - a.y).atan2(b.x - a.x).to_degrees();
    if angle <= -180.0 {
        angle + 360.0
    } else {
        angle
    }
}

/// Straight-line distance, including depth
pub fn euclidean_distance(a: Point, b: Point) -> f64 {
    (a - b).norm()
}

/// Straight-line distance in the image plane, ignoring depth
pub fn planar_distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_right_angle() {
        let angle = angle_at(
            Point::planar(0.5, 0.5),
            Point::planar(0.5, 0.0),
            Point::planar(1.0, 0.5),
        );
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_straight_and_folded() {
        let straight = angle_at(
            Point::planar(0.5, 0.0),
            Point::planar(0.0, 0.0),
            Point::planar(1.0, 0.0),
        );
        assert!((straight - 180.0).abs() < 1e-9);

        let folded = angle_at(
            Point::planar(0.0, 0.0),
            Point::planar(1.0, 0.0),
            Point::planar(0.5, 0.0),
        );
        assert!(folded.abs() < 1e-6);
    }

    #[test]
    fn test_coincident_points_fall_back() {
        let p = Point::planar(0.3, 0.3);
        assert_eq!(angle_at(p, p, Point::planar(0.9, 0.1)), 90.0);
        assert_eq!(angle_at(p, Point::planar(0.1, 0.9), p), 90.0);
        assert_eq!(segment_deflection(p, p, p), 90.0);
    }

    #[test]
    fn test_angle_stays_in_range() {
        let vertex = Point::new(0.4, 0.6, 0.1);
        for i in 0..36 {
            let theta = (i as f64 * 10.0).to_radians();
            let a = Point::new(0.4 + theta.cos() * 0.2, 0.6 + theta.sin() * 0.2, 0.05);
            let b = Point::new(0.7, 0.2, -0.3);
            let angle = angle_at(vertex, a, b);
            assert!((0.0..=180.0).contains(&angle), "angle was {}", angle);
        }
    }

    #[test]
    fn test_segment_deflection_of_straight_limb() {
        let deflection = segment_deflection(
            Point::planar(0.2, 0.2),
            Point::planar(0.3, 0.3),
            Point::planar(0.4, 0.4),
        );
        assert!(deflection.abs() < 1e-4);
    }

    #[test]
    fn test_line_angle_quadrants() {
        assert!((line_angle(Point::planar(0.0, 0.0), Point::planar(1.0, 1.0)) - 45.0).abs() < 1e-9);
        assert!((line_angle(Point::planar(0.0, 0.0), Point::planar(0.0, -1.0)) + 90.0).abs() < 1e-9);
        assert_eq!(line_angle(Point::planar(0.0, 0.0), Point::planar(-1.0, -0.0)), 180.0);
    }

    #[test]
    fn test_distances() {
        let a = Point::new(0.0, 0.0, 0.0);
        let b = Point::new(0.3, 0.4, 1.2);
        assert!((euclidean_distance(a, b) - 1.3).abs() < 1e-9);
        assert!((planar_distance(a, b) - 0.5).abs() < 1e-9);
        assert_eq!(euclidean_distance(b, b), 0.0);
    }
}
