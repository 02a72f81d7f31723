//! Plane geometry helpers for landmark math.
//!
//! Everything works on the x/y image plane. Angles are in degrees.

use crate::landmark::Position;

/// A point on the image plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<Position> for Point {
    fn from(p: Position) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<&Position> for Point {
    fn from(p: &Position) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Interior angle at vertex `b` between rays `b→a` and `b→c`, in degrees.
///
/// Returns `0.0` if either ray has zero length. A `0.0` result is therefore
/// not proof of a closed joint; check the inputs when it matters.
pub fn angle_at(a: Point, b: Point, c: Point) -> f64 {
    let (ax, ay) = (a.x - b.x, a.y - b.y);
    let (cx, cy) = (c.x - b.x, c.y - b.y);
    let norm = ax.hypot(ay) * cx.hypot(cy);
    if norm == 0.0 || !norm.is_finite() {
        return 0.0;
    }
    // Clamp: rounding can push the ratio just past ±1.
    let cos = ((ax * cx + ay * cy) / norm).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

pub fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Direction of the segment `from→to`, degrees in (-180, 180].
pub fn line_angle(from: Point, to: Point) -> f64 {
    (to.y - from.y).atan2(to.x - from.x).to_degrees()
}

/// Remove ±360° wraparound jumps from a heading series so that max−min
/// measures actual rotation.
pub fn unwrap_degrees(headings: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(headings.len());
    let mut offset = 0.0;
    let mut prev: Option<f64> = None;
    for &h in headings {
        if let Some(p) = prev {
            let delta = h - p;
            if delta > 180.0 {
                offset -= 360.0;
            } else if delta < -180.0 {
                offset += 360.0;
            }
        }
        prev = Some(h);
        out.push(h + offset);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn right_angle() {
        let a = angle_at(p(1.0, 0.0), p(0.0, 0.0), p(0.0, 1.0));
        assert!((a - 90.0).abs() < 1e-9, "expected 90, got {a}");
    }

    #[test]
    fn straight_and_folded() {
        let straight = angle_at(p(-1.0, 0.0), p(0.0, 0.0), p(1.0, 0.0));
        assert!((straight - 180.0).abs() < 1e-9, "got {straight}");
        let folded = angle_at(p(1.0, 0.0), p(0.0, 0.0), p(2.0, 0.0));
        assert!(folded.abs() < 1e-9, "got {folded}");
    }

    #[test]
    fn degenerate_vector_is_zero() {
        assert_eq!(angle_at(p(0.3, 0.3), p(0.3, 0.3), p(0.9, 0.1)), 0.0);
        assert_eq!(angle_at(p(0.9, 0.1), p(0.3, 0.3), p(0.3, 0.3)), 0.0);
        assert_eq!(angle_at(p(0.0, 0.0), p(0.0, 0.0), p(0.0, 0.0)), 0.0);
    }

    #[test]
    fn always_within_half_turn() {
        // Deterministic sweep over a grid of non-degenerate triples.
        let coords = [-2.0, -0.7, 0.0, 0.3, 1.0, 5.5];
        for &ax in &coords {
            for &ay in &coords {
                for &cx in &coords {
                    for &cy in &coords {
                        let a = angle_at(p(ax, ay), p(0.1, -0.2), p(cx, cy));
                        assert!((0.0..=180.0).contains(&a), "angle {a} out of range");
                    }
                }
            }
        }
    }

    #[test]
    fn nearly_collinear_does_not_nan() {
        let a = angle_at(p(1e-9, 1.0), p(0.0, 0.0), p(2e-9, 2.0));
        assert!(a.is_finite());
        assert!(a < 1e-3);
    }

    #[test]
    fn midpoint_and_distance() {
        let m = midpoint(p(0.0, 0.0), p(2.0, 4.0));
        assert_eq!(m, p(1.0, 2.0));
        assert!((distance(p(0.0, 0.0), p(3.0, 4.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn line_angle_quadrants() {
        assert!((line_angle(p(0.0, 0.0), p(1.0, 0.0))).abs() < 1e-12);
        assert!((line_angle(p(0.0, 0.0), p(0.0, 1.0)) - 90.0).abs() < 1e-12);
        assert!((line_angle(p(0.0, 0.0), p(-1.0, 0.0)) - 180.0).abs() < 1e-12);
    }

    #[test]
    fn unwrap_removes_jumps() {
        let raw = [170.0, 179.0, -178.0, -170.0];
        let unwrapped = unwrap_degrees(&raw);
        assert_eq!(unwrapped[0], 170.0);
        assert!((unwrapped[2] - 182.0).abs() < 1e-9);
        assert!((unwrapped[3] - 190.0).abs() < 1e-9);
    }
}
