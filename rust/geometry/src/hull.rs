// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D convex hull and polyline simplification

use nalgebra::Point2;

#[inline]
fn cross(o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull using Andrew's monotone chain.
///
/// Returns the hull counter-clockwise without repeating the first point.
/// Collinear boundary points are dropped, so the result holds only true
/// corners. Input with one point or none is returned unchanged.
pub fn convex_hull_2d(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if points.len() <= 1 {
        return points.to_vec();
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();

    if sorted.len() <= 2 {
        return sorted;
    }

    let mut hull: Vec<Point2<f64>> = Vec::with_capacity(sorted.len() * 2);

    // Lower hull
    for p in &sorted {
        while hull.len() >= 2 && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(*p);
    }

    // Upper hull
    let lower_len = hull.len() + 1;
    for p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(*p);
    }

    // Last point equals the first
    hull.pop();
    hull
}

/// Douglas-Peucker simplification of an open polyline
pub fn douglas_peucker(points: &[Point2<f64>], epsilon: f64) -> Vec<Point2<f64>> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = &points[0];
    let last = &points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_idx = 0;

    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = perpendicular_distance(point, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_idx = i;
        }
    }

    if max_dist > epsilon {
        let left = douglas_peucker(&points[..=max_idx], epsilon);
        let right = douglas_peucker(&points[max_idx..], epsilon);

        // max_idx appears in both halves
        let mut result = left;
        result.extend_from_slice(&right[1..]);
        result
    } else {
        vec![*first, *last]
    }
}

/// Douglas-Peucker simplification of a closed ring (no repeated closing point)
pub fn simplify_ring(ring: &[Point2<f64>], epsilon: f64) -> Vec<Point2<f64>> {
    if ring.len() < 4 {
        return ring.to_vec();
    }
    let mut closed = ring.to_vec();
    closed.push(ring[0]);
    let mut simplified = douglas_peucker(&closed, epsilon);
    simplified.pop();
    simplified
}

/// Perpendicular distance from `point` to the line through `line_start` and `line_end`
pub fn perpendicular_distance(
    point: &Point2<f64>,
    line_start: &Point2<f64>,
    line_end: &Point2<f64>,
) -> f64 {
    let dx = line_end.x - line_start.x;
    let dy = line_end.y - line_start.y;
    let length_sq = dx * dx + dy * dy;

    if length_sq < 1e-20 {
        return (point - line_start).norm();
    }

    ((point.x - line_start.x) * dy - (point.y - line_start.y) * dx).abs() / length_sq.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hull_drops_interior_points() {
        let mut points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        for i in 1..10 {
            let t = i as f64;
            points.push(Point2::new(t, 10.0 - t * 0.9));
        }
        let hull = convex_hull_2d(&points);
        assert_eq!(hull.len(), 4);
        for corner in &points[..4] {
            assert!(hull.contains(corner));
        }
    }

    #[test]
    fn test_hull_drops_collinear_edge_points() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        let hull = convex_hull_2d(&points);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&Point2::new(5.0, 0.0)));
    }

    #[test]
    fn test_hull_is_counter_clockwise() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 4.0),
            Point2::new(4.0, 4.0),
            Point2::new(4.0, 0.0),
        ];
        let hull = convex_hull_2d(&points);
        let mut area2 = 0.0;
        for i in 0..hull.len() {
            let a = hull[i];
            let b = hull[(i + 1) % hull.len()];
            area2 += a.x * b.y - b.x * a.y;
        }
        assert!(area2 > 0.0);
    }

    #[test]
    fn test_hull_degenerate_input() {
        assert!(convex_hull_2d(&[]).is_empty());
        let single = [Point2::new(1.0, 2.0)];
        assert_eq!(convex_hull_2d(&single), single.to_vec());
    }

    #[test]
    fn test_douglas_peucker_straight_line() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.1),
            Point2::new(2.0, -0.1),
            Point2::new(3.0, 0.0),
            Point2::new(4.0, 0.0),
        ];
        let simplified = douglas_peucker(&points, 0.5);
        assert_eq!(simplified.len(), 2);
    }

    #[test]
    fn test_simplify_ring_keeps_square_corners() {
        let ring = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        assert_eq!(simplify_ring(&ring, 0.3), ring);
    }

    #[test]
    fn test_perpendicular_distance() {
        let dist = perpendicular_distance(
            &Point2::new(5.0, 5.0),
            &Point2::new(0.0, 0.0),
            &Point2::new(10.0, 0.0),
        );
        assert!((dist - 5.0).abs() < 0.001);
    }
}
