//! Polyline self-intersection test.
//!
//! A dense profile has tens of thousands of segments, so testing every pair
//! is out. Segments are bucketed into a uniform grid (cell size a small
//! multiple of the mean segment length) and only segments sharing a cell are
//! compared.

use std::collections::HashMap;

use crate::geometry::{segments_intersect, Point};

/// Orientation tolerance for the segment test. Profile coordinates are tens of
/// millimetres, so this only catches exact collinear touches.
const EPS: f64 = 1e-12;

/// Convert a coordinate to a grid cell.
#[inline]
fn point_to_cell(x: f64, y: f64, cell_size: f64) -> (i64, i64) {
    ((x / cell_size).floor() as i64, (y / cell_size).floor() as i64)
}

/// Whether any two non-adjacent segments of the polyline cross or touch.
///
/// With `closed` the segment from the last point back to the first is
/// included, and it counts as adjacent to the first segment.
pub fn polyline_self_intersects(points: &[Point], closed: bool) -> bool {
    let n = points.len();
    let segment_count = if closed { n } else { n.saturating_sub(1) };
    if segment_count < 3 {
        return false;
    }

    let segment = |i: usize| (points[i], points[(i + 1) % n]);

    let total: f64 = (0..segment_count).map(|i| {
        let (a, b) = segment(i);
        a.distance(b)
    }).sum();
    let cell_size = (2.0 * total / segment_count as f64).max(1e-6);

    // Cell -> segments whose bounding box touches it
    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for i in 0..segment_count {
        let (a, b) = segment(i);
        let (x0, y0) = point_to_cell(a.x.min(b.x), a.y.min(b.y), cell_size);
        let (x1, y1) = point_to_cell(a.x.max(b.x), a.y.max(b.y), cell_size);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                grid.entry((cx, cy)).or_default().push(i);
            }
        }
    }

    let adjacent = |i: usize, j: usize| {
        j == i + 1 || (closed && i == 0 && j == segment_count - 1)
    };

    for bucket in grid.values() {
        for (k, &i) in bucket.iter().enumerate() {
            for &j in &bucket[k + 1..] {
                let (i, j) = if i < j { (i, j) } else { (j, i) };
                if adjacent(i, j) {
                    continue;
                }
                let (a, b) = segment(i);
                let (c, d) = segment(j);
                if a == c || a == d || b == c || b == d {
                    continue;
                }
                if segments_intersect(a, b, c, d, EPS) {
                    return true;
                }
            }
        }
    }

    false
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn square_is_simple() {
        assert!(!polyline_self_intersects(&square(), true));
    }

    #[test]
    fn bow_tie_intersects() {
        let bow_tie = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ];
        assert!(polyline_self_intersects(&bow_tie, true));
    }

    #[test]
    fn open_polyline_ignores_closing_segment() {
        // Open "Z" shape: closing it would cross the middle stroke
        let z = vec![
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        ];
        assert!(!polyline_self_intersects(&z, false));
        assert!(polyline_self_intersects(&z, true));
    }

    #[test]
    fn dense_circle_is_simple() {
        let pts: Vec<Point> = (0..20_000)
            .map(|i| Point::polar(50.0, std::f64::consts::TAU * i as f64 / 20_000.0))
            .collect();
        assert!(!polyline_self_intersects(&pts, true));
    }

    #[test]
    fn figure_eight_intersects() {
        // Odd count so no sample lands exactly on the crossing
        let pts: Vec<Point> = (0..2_001)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / 2_001.0;
                Point::new(10.0 * t.sin(), 5.0 * (2.0 * t).sin())
            })
            .collect();
        assert!(polyline_self_intersects(&pts, true));
    }

    #[test]
    fn too_few_points() {
        assert!(!polyline_self_intersects(&square()[..2], true));
    }
}
