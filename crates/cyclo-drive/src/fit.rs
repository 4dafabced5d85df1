//! Curve fitting: dense profile samples → one closed cubic Bézier spline.
//!
//! A disc profile can have tens of thousands of sample points. Drawing
//! programs and CAM tools are much happier with a single smooth path, so the
//! fitter picks a subset of the samples as knots, runs a closed centripetal
//! Catmull-Rom spline through them and converts each span to a cubic Bézier.
//!
//! ## Rust Lesson #24: Iterating With a Budget
//!
//! The fit loop is a plain `for` over `0..=max_iterations`: each pass either
//! meets the tolerance and `break`s, or inserts knots where the spline strays
//! too far. The range bound is the termination guarantee; the best attempt
//! is kept in an `Option` so running out of budget still returns something.

use lyon_geom::CubicBezierSegment;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{NumericalInstabilityWarning, Outcome};
use crate::geometry::Point;
use crate::sampler::CurveSample;

/// Centripetal parameterisation exponent.
const ALPHA: f64 = 0.5;

/// Fitting knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    /// Maximum allowed distance from any sample point to the spline (mm).
    pub tolerance: f64,
    /// Knot-insertion passes before giving up.
    pub max_iterations: usize,
    /// Knots placed evenly before the first pass.
    pub initial_knots: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            max_iterations: 24,
            initial_knots: 64,
        }
    }
}

impl FitConfig {
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance, ..Self::default() }
    }
}

/// A closed, tangent-continuous piecewise cubic Bézier spline.
///
/// `control_points` holds `3K + 1` points for `K` segments:
/// `[p0, c0a, c0b, p1, c1a, c1b, p2, ..., p0]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FittedCurve {
    control_points: Vec<Point>,
    degree: u8,
    tolerance: f64,
    max_deviation: f64,
    converged: bool,
}

impl FittedCurve {
    fn from_segments(segments: &[CubicBezierSegment<f64>], tolerance: f64, max_deviation: f64) -> Self {
        let mut control_points: Vec<Point> = Vec::with_capacity(segments.len() * 3 + 1);
        for seg in segments {
            control_points.push(seg.from.into());
            control_points.push(seg.ctrl1.into());
            control_points.push(seg.ctrl2.into());
        }
        if let Some(first) = segments.first() {
            control_points.push(first.from.into());
        }
        Self {
            control_points,
            degree: 3,
            tolerance,
            max_deviation,
            converged: max_deviation <= tolerance,
        }
    }

    pub fn control_points(&self) -> &[Point] {
        &self.control_points
    }

    pub fn degree(&self) -> u8 {
        self.degree
    }

    /// Tolerance the fit was asked for.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Largest distance from a sample point to the spline.
    pub fn max_deviation(&self) -> f64 {
        self.max_deviation
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn segment_count(&self) -> usize {
        self.control_points.len().saturating_sub(1) / 3
    }

    /// Start point of the spline (also its end point).
    pub fn start(&self) -> Option<Point> {
        self.control_points.first().copied()
    }

    /// The Bézier segments, in traversal order.
    pub fn segments(&self) -> impl Iterator<Item = CubicBezierSegment<f64>> + '_ {
        self.control_points.windows(4).step_by(3).map(|w| CubicBezierSegment {
            from: w[0].into(),
            ctrl1: w[1].into(),
            ctrl2: w[2].into(),
            to: w[3].into(),
        })
    }

    /// Evaluate each segment at `per_segment` evenly spaced parameters.
    ///
    /// The result is closed (the start point is repeated at the end).
    pub fn resample(&self, per_segment: usize) -> CurveSample {
        let per_segment = per_segment.max(1);
        let mut points: Vec<Point> = Vec::with_capacity(self.segment_count() * per_segment + 1);
        for seg in self.segments() {
            for j in 0..per_segment {
                let t = j as f64 / per_segment as f64;
                points.push(seg.sample(t).into());
            }
        }
        if let Some(first) = self.start() {
            points.push(first);
        }
        CurveSample::from_closed_points(points)
    }

    /// Flatten the spline into a closed polyline with lyon.
    pub fn flattened(&self, tolerance: f64) -> Vec<Point> {
        let mut points: Vec<Point> = Vec::new();
        if let Some(first) = self.start() {
            points.push(first);
        }
        for seg in self.segments() {
            seg.for_each_flattened(tolerance, &mut |line| {
                points.push(line.to.into());
            });
        }
        points
    }

    /// The same spline moved by (dx, dy).
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            control_points: self.control_points.iter().map(|p| p.translated(dx, dy)).collect(),
            ..self.clone()
        }
    }
}

/// Tangent at `b` of the centripetal Catmull-Rom curve through `a`, `b`, `c`,
/// with knot intervals `d0` (a→b) and `d1` (b→c).
fn catmull_rom_tangent(a: Point, b: Point, c: Point, d0: f64, d1: f64) -> Point {
    let component = |a: f64, b: f64, c: f64| (b - a) / d0 - (c - a) / (d0 + d1) + (c - b) / d1;
    Point::new(component(a.x, b.x, c.x), component(a.y, b.y, c.y))
}

/// Centripetal Catmull-Rom span from `p1` to `p2` as a cubic Bézier.
fn catmull_rom_segment(p0: Point, p1: Point, p2: Point, p3: Point) -> CubicBezierSegment<f64> {
    let knot = |a: Point, b: Point| a.distance(b).powf(ALPHA).max(1e-12);
    let dt0 = knot(p0, p1);
    let dt1 = knot(p1, p2);
    let dt2 = knot(p2, p3);

    // Both tangents rescaled to the [p1, p2] span
    let m1 = catmull_rom_tangent(p0, p1, p2, dt0, dt1);
    let m2 = catmull_rom_tangent(p1, p2, p3, dt1, dt2);
    let scale = dt1 / 3.0;

    CubicBezierSegment {
        from: p1.into(),
        ctrl1: Point::new(p1.x + m1.x * scale, p1.y + m1.y * scale).into(),
        ctrl2: Point::new(p2.x - m2.x * scale, p2.y - m2.y * scale).into(),
        to: p2.into(),
    }
}

/// Distance from `p` to the nearest segment of an open polyline.
fn distance_to_polyline(p: Point, polyline: &[Point]) -> f64 {
    match polyline {
        [] => f64::INFINITY,
        [only] => p.distance(*only),
        _ => polyline
            .windows(2)
            .map(|w| p.distance_to_segment(w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// One pass: spline through `knots`, with the deviation of every span.
fn build(ring: &[Point], knots: &[usize], tolerance: f64) -> (Vec<CubicBezierSegment<f64>>, Vec<f64>) {
    let n = ring.len();
    let k = knots.len();
    let flatten_tol = (tolerance / 10.0).max(1e-6);

    let mut segments = Vec::with_capacity(k);
    let mut deviations = Vec::with_capacity(k);

    for i in 0..k {
        let i0 = knots[(i + k - 1) % k];
        let i1 = knots[i];
        let i2 = knots[(i + 1) % k];
        let i3 = knots[(i + 2) % k];
        let seg = catmull_rom_segment(ring[i0], ring[i1], ring[i2], ring[i3]);

        let mut polyline = vec![Point::from(seg.from)];
        seg.for_each_flattened(flatten_tol, &mut |line| {
            polyline.push(line.to.into());
        });

        // Samples strictly between the two knots, wrapping at the end
        let end = if i2 > i1 { i2 } else { i2 + n };
        let deviation = (i1 + 1..end)
            .map(|j| distance_to_polyline(ring[j % n], &polyline))
            .fold(0.0, f64::max);

        segments.push(seg);
        deviations.push(deviation);
    }

    (segments, deviations)
}

/// Fit a closed spline to `sample`.
///
/// Knots are inserted at the middle sample of every span that misses the
/// tolerance. When the iteration budget runs out the best fit seen is
/// returned together with [`NumericalInstabilityWarning::FitToleranceNotMet`].
pub fn fit(sample: &CurveSample, config: &FitConfig) -> Outcome<FittedCurve> {
    let ring = sample.ring();
    let n = ring.len();
    let tolerance = config.tolerance;

    if n < 4 {
        // Too few points to need fitting: every point is a knot
        let knots: Vec<usize> = (0..n).collect();
        let (segments, deviations) = build(ring, &knots, tolerance);
        let max_deviation = deviations.into_iter().fold(0.0, f64::max);
        return Outcome::clean(FittedCurve::from_segments(&segments, tolerance, max_deviation));
    }

    let stride = (n / config.initial_knots.max(4)).max(1);
    let mut knots: Vec<usize> = (0..n).step_by(stride).collect();
    if knots.len() < 4 {
        knots = (0..4).map(|i| i * n / 4).collect();
    }

    let mut best: Option<(Vec<CubicBezierSegment<f64>>, f64)> = None;
    let mut iterations = 0;

    for iteration in 0..=config.max_iterations {
        iterations = iteration;
        let (segments, deviations) = build(ring, &knots, tolerance);
        let max_deviation = deviations.iter().copied().fold(0.0, f64::max);

        let improved = best.as_ref().is_none_or(|(_, dev)| max_deviation < *dev);
        if improved {
            best = Some((segments, max_deviation));
        }

        if max_deviation <= tolerance || iteration == config.max_iterations {
            break;
        }

        let k = knots.len();
        let mut refined = Vec::with_capacity(k * 2);
        for (i, &deviation) in deviations.iter().enumerate() {
            let i1 = knots[i];
            refined.push(i1);
            if deviation > tolerance {
                let i2 = knots[(i + 1) % k];
                let end = if i2 > i1 { i2 } else { i2 + n };
                if end - i1 >= 2 {
                    refined.push((i1 + (end - i1) / 2) % n);
                }
            }
        }
        refined.sort_unstable();
        refined.dedup();
        knots = refined;
    }

    let Some((segments, max_deviation)) = best else {
        return Outcome::clean(FittedCurve::from_segments(&[], tolerance, 0.0));
    };
    let curve = FittedCurve::from_segments(&segments, tolerance, max_deviation);

    debug!(
        samples = n,
        knots = curve.segment_count(),
        max_deviation,
        iterations,
        "fitted disc profile"
    );

    if !curve.converged() {
        warn!(tolerance, achieved = max_deviation, iterations, "fit tolerance not met");
        let warning = NumericalInstabilityWarning::FitToleranceNotMet {
            tolerance,
            achieved: max_deviation,
            iterations,
        };
        return Outcome::with_warnings(curve, vec![warning]);
    }

    Outcome::clean(curve)
}

// ============================================================================
// TESTS
// ============================================================================
