//! Geometry kernel
//!
//! Pure functions over image-space points `(x, y)`. Image y grows downward.
//! None of these know about movements; callers check keypoint presence first.

pub type Point = (f32, f32);

/// Bearing of the ray `from → to` in radians.
fn bearing(from: Point, to: Point) -> f32 {
    (to.1 - from.1).atan2(to.0 - from.0)
}

/// Folds an absolute angular difference (radians) into [0, 180] degrees.
fn fold_degrees(radians: f32) -> f32 {
    let degrees = radians.abs().to_degrees();
    if degrees > 180.0 {
        360.0 - degrees
    } else {
        degrees
    }
}

/// Angle at `vertex` between the rays to `a` and `b`, in degrees [0, 180].
///
/// Computed from the difference of the two `atan2` bearings. A degenerate ray
/// (point equal to vertex) has bearing 0, so the result stays finite.
pub fn angle(a: Point, vertex: Point, b: Point) -> f32 {
    fold_degrees(bearing(vertex, b) - bearing(vertex, a))
}

/// Twist between segment `p1 → p2` and segment `q1 → q2`, in degrees [0, 180].
pub fn alignment(p1: Point, p2: Point, q1: Point, q2: Point) -> f32 {
    fold_degrees(bearing(p1, p2) - bearing(q1, q2))
}

/// True when both `a` and `b` sit above `reference` by more than `threshold`.
pub fn vertical_separation(a: Point, b: Point, reference: Point, threshold: f32) -> bool {
    let line = reference.1 - threshold;
    a.1 < line && b.1 < line
}

/// Absolute vertical gap between two points divided by `scale`.
pub fn normalized_vertical_gap(p1: Point, p2: Point, scale: f32) -> f32 {
    (p1.1 - p2.1).abs() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_straight_angle() {
        assert!(close(angle((0.0, 0.0), (0.5, 0.0), (1.0, 0.0)), 180.0));
    }

    #[test]
    fn test_right_angle() {
        assert!(close(angle((0.0, 0.0), (0.5, 0.0), (0.5, 0.5)), 90.0));
    }

    #[test]
    fn test_angle_folds_reflex_side() {
        // Bearings of -170° and +170° differ by 340°, reported as 20°.
        let vertex = (0.0, 0.0);
        let a = (-1.0, -(10f32.to_radians().tan()));
        let b = (-1.0, 10f32.to_radians().tan());
        let result = angle(a, vertex, b);
        assert!(close(result, 20.0), "got {result}");
    }

    #[test]
    fn test_split_scenario_angle() {
        let result = angle((0.0, 100.0), (100.0, 100.0), (0.0, 200.0));
        assert!(close(result, 45.0), "got {result}");
    }

    #[test]
    fn test_alignment() {
        let square = alignment((0.0, 0.0), (10.0, 0.0), (0.0, 5.0), (10.0, 5.0));
        assert!(close(square, 0.0));

        let twisted = alignment((0.0, 0.0), (10.0, 0.0), (0.0, 5.0), (10.0, 15.0));
        assert!(close(twisted, 45.0), "got {twisted}");
    }

    #[test]
    fn test_alignment_wraps_around_pi() {
        // Nearly antiparallel segments straddling the ±180° seam.
        let result = alignment((0.0, 0.0), (-10.0, 0.1), (0.0, 0.0), (-10.0, -0.1));
        assert!(result < 2.0, "got {result}");
    }

    #[test]
    fn test_vertical_separation() {
        let hip = (0.0, 300.0);
        assert!(vertical_separation((0.0, 150.0), (10.0, 199.0), hip, 100.0));
        assert!(!vertical_separation((0.0, 150.0), (10.0, 200.0), hip, 100.0));
        assert!(!vertical_separation((0.0, 400.0), (10.0, 100.0), hip, 100.0));
    }

    #[test]
    fn test_normalized_vertical_gap() {
        assert!(close(normalized_vertical_gap((0.0, 120.0), (5.0, 100.0), 100.0), 0.2));
        assert!(close(normalized_vertical_gap((0.0, 100.0), (5.0, 150.0), 100.0), 0.5));
    }
}
