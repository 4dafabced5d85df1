//! Cycloidal disc profile sampling.
//!
//! The disc profile is the inward parallel curve of the path a ring pin
//! center traces relative to the disc (a trochoid). In disc-local coordinates,
//! with the disc center at the origin:
//!
//! ```text
//! pin-center path:  a(p) = ( R cos p - E cos(N p),  R sin p - E sin(N p) )
//! profile:          s(p) = a(p) + d * n(p),   n = left unit normal of a'
//! ```
//!
//! where `R` is the ring circle radius, `E` the eccentricity, `N` the ring
//! pin count and `d` the pin radius plus clearance. `p` runs once around
//! [0, 2π], giving N - 1 lobes.
//!
//! Sampling happens in two passes:
//!
//! 1. **Base steps**: `p` is stepped uniformly. The step count comes from
//!    [`SampleDensity`](crate::params::SampleDensity) and already grows with N.
//! 2. **Refinement**: each base interval is bisected while its chord is longer
//!    than `max_segment` or the tangent turns by more than `max_turn` across it.
//!    Bisection depth per interval and the total point count are both capped,
//!    so the loop always terminates; hitting a cap is reported as a warning.

use std::f64::consts::{PI, TAU};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{NumericalInstabilityWarning, Outcome};
use crate::geometry::Point;
use crate::intersect::polyline_self_intersects;
use crate::params::ValidatedParams;

/// Consecutive points closer than this (squared) are merged.
const DUPLICATE_DIST_SQ: f64 = 1e-12;

/// The analytic profile of one disc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrochoidProfile {
    pub ring_pin_count: u32,
    pub ring_circle_radius: f64,
    pub eccentricity: f64,
    /// Inward offset from the pin-center path (pin radius + clearance).
    pub offset: f64,
}

impl TrochoidProfile {
    pub fn new(ring_pin_count: u32, ring_circle_radius: f64, eccentricity: f64, offset: f64) -> Self {
        Self { ring_pin_count, ring_circle_radius, eccentricity, offset }
    }

    pub fn from_validated(validated: &ValidatedParams) -> Self {
        let params = validated.params();
        Self::new(
            params.ring_pin_count,
            params.ring_circle_radius,
            params.eccentricity,
            validated.offset(),
        )
    }

    /// Number of lobes on the disc (N - 1).
    pub fn lobes(&self) -> u32 {
        self.ring_pin_count.saturating_sub(1)
    }

    /// Profile point and tangent direction (radians) at parameter `p`.
    ///
    /// Validation guarantees `E N < R`, so `|a'| >= R - E N > 0` and the
    /// normal is always defined.
    pub fn evaluate(&self, p: f64) -> (Point, f64) {
        let n = self.ring_pin_count as f64;
        let r = self.ring_circle_radius;
        let e = self.eccentricity;

        let (sin_p, cos_p) = p.sin_cos();
        let (sin_np, cos_np) = (n * p).sin_cos();

        let xa = r * cos_p - e * cos_np;
        let ya = r * sin_p - e * sin_np;

        let dxa = -r * sin_p + e * n * sin_np;
        let dya = r * cos_p - e * n * cos_np;

        let speed = dxa.hypot(dya).max(f64::MIN_POSITIVE);

        let point = Point::new(xa - self.offset * dya / speed, ya + self.offset * dxa / speed);
        (point, dya.atan2(dxa))
    }
}

/// Thresholds and caps for the refinement pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefineConfig {
    /// Longest allowed chord between consecutive points (mm).
    pub max_segment: f64,
    /// Largest allowed tangent turn across one interval (radians).
    /// This is the curvature threshold: turn ≈ curvature × arc length.
    pub max_turn: f64,
    /// Maximum bisections of a single base interval.
    pub max_depth: u32,
    /// Hard cap on the number of points in a sample.
    pub max_points: usize,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            max_segment: 0.25,
            max_turn: 5f64.to_radians(),
            max_depth: 12,
            max_points: 2_000_000,
        }
    }
}

/// A dense, ordered, closed sequence of profile points.
///
/// The last point repeats the first (p = 2π), and `params` is strictly
/// increasing from 0 to 2π.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveSample {
    points: Vec<Point>,
    params: Vec<f64>,
    base_steps: usize,
}

impl CurveSample {
    /// Build a sample from an already closed point list (first ≈ last).
    ///
    /// The traversal parameter is the normalised cumulative chord length,
    /// scaled to [0, 2π], so it stays strictly increasing.
    pub fn from_closed_points(points: Vec<Point>) -> Self {
        let mut lengths = Vec::with_capacity(points.len());
        let mut acc = 0.0;
        lengths.push(0.0);
        for pair in points.windows(2) {
            acc += pair[0].distance(pair[1]).max(f64::EPSILON);
            lengths.push(acc);
        }
        let total = acc.max(f64::EPSILON);
        let params = lengths.into_iter().map(|l| l / total * TAU).collect();
        let base_steps = points.len().saturating_sub(1);
        Self { points, params, base_steps }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Uniform steps taken before refinement.
    pub fn base_steps(&self) -> usize {
        self.base_steps
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distance between the first and last point.
    pub fn closure_gap(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => first.distance(*last),
            _ => f64::INFINITY,
        }
    }

    pub fn is_closed(&self, eps: f64) -> bool {
        self.points.len() >= 3 && self.closure_gap() < eps
    }

    /// The points without the closing duplicate.
    pub fn ring(&self) -> &[Point] {
        if self.points.len() > 1 && self.closure_gap() < 1e-9 {
            &self.points[..self.points.len() - 1]
        } else {
            &self.points
        }
    }

    /// Whether the closed polyline crosses itself.
    pub fn self_intersects(&self) -> bool {
        polyline_self_intersects(self.ring(), true)
    }

    /// Largest and smallest distance from the origin (disc-local center).
    pub fn radius_range(&self) -> (f64, f64) {
        self.points.iter().fold((0.0f64, f64::INFINITY), |(max, min), p| {
            let r = p.norm();
            (max.max(r), min.min(r))
        })
    }

    /// Params are strictly increasing.
    pub fn is_monotonic(&self) -> bool {
        self.params.windows(2).all(|w| w[1] > w[0])
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            points: self.points.iter().map(|p| p.translated(dx, dy)).collect(),
            params: self.params.clone(),
            base_steps: self.base_steps,
        }
    }
}

/// Mutable state for one sampling run.
struct Refiner<'a> {
    profile: &'a TrochoidProfile,
    phase: f64,
    config: &'a RefineConfig,
    points: Vec<Point>,
    params: Vec<f64>,
    unresolved: usize,
}

impl Refiner<'_> {
    fn eval(&self, p: f64) -> (Point, f64) {
        let (point, tangent) = self.profile.evaluate(p);
        (point.rotated(self.phase), tangent)
    }

    fn needs_split(&self, a: (Point, f64), b: (Point, f64)) -> bool {
        let chord = a.0.distance(b.0);
        chord > self.config.max_segment || turn_between(a.1, b.1) > self.config.max_turn
    }

    /// Emit the points of (p0, p1], bisecting as needed. `a` is already emitted.
    fn subdivide(&mut self, p0: f64, p1: f64, a: (Point, f64), b: (Point, f64), depth: u32) {
        if self.needs_split(a, b) {
            if depth < self.config.max_depth && self.points.len() < self.config.max_points {
                let pm = 0.5 * (p0 + p1);
                let m = self.eval(pm);
                self.subdivide(p0, pm, a, m, depth + 1);
                self.subdivide(pm, p1, m, b, depth + 1);
                return;
            }
            self.unresolved += 1;
        }
        self.push(p1, b.0);
    }

    fn push(&mut self, p: f64, point: Point) {
        if let Some(last) = self.points.last() {
            let dx = point.x - last.x;
            let dy = point.y - last.y;
            if dx * dx + dy * dy <= DUPLICATE_DIST_SQ && p < TAU {
                return;
            }
        }
        self.points.push(point);
        self.params.push(p);
    }
}

/// Absolute tangent turn between two directions, in [0, π].
#[inline]
fn turn_between(a: f64, b: f64) -> f64 {
    let mut d = (b - a) % TAU;
    if d > PI {
        d -= TAU;
    } else if d < -PI {
        d += TAU;
    }
    d.abs()
}

/// Sample one disc profile.
///
/// `phase_offset` rotates every point around the disc center. `base_steps`
/// is the uniform step count before refinement (see
/// [`SampleDensity::resolve`](crate::params::SampleDensity::resolve)); it is
/// clamped to `config.max_points`, and the clamp is reported as
/// [`NumericalInstabilityWarning::RefinementCapped`].
pub fn sample(
    profile: &TrochoidProfile,
    phase_offset: f64,
    base_steps: usize,
    config: &RefineConfig,
) -> Outcome<CurveSample> {
    // The point cap bounds the base loop too
    let steps = base_steps.clamp(1, config.max_points.max(1));
    let dropped_steps = base_steps.saturating_sub(steps);
    let capacity = steps.saturating_add(steps / 4).saturating_add(1);

    let mut refiner = Refiner {
        profile,
        phase: phase_offset,
        config,
        points: Vec::with_capacity(capacity),
        params: Vec::with_capacity(capacity),
        unresolved: dropped_steps,
    };

    let mut prev_p = 0.0;
    let mut prev = refiner.eval(prev_p);
    refiner.push(prev_p, prev.0);

    for i in 1..=steps {
        let p = TAU * i as f64 / steps as f64;
        let next = refiner.eval(p);
        refiner.subdivide(prev_p, p, prev, next, 0);
        prev_p = p;
        prev = next;
    }

    let Refiner { points, params, unresolved, .. } = refiner;
    let sample = CurveSample { points, params, base_steps: steps };

    debug!(
        base_steps = steps,
        points = sample.len(),
        phase = phase_offset,
        "sampled disc profile"
    );

    if unresolved > 0 {
        warn!(unresolved, points = sample.len(), "profile refinement hit its cap");
        let warning = NumericalInstabilityWarning::RefinementCapped { unresolved, points: sample.len() };
        return Outcome::with_warnings(sample, vec![warning]);
    }

    Outcome::clean(sample)
}

/// Sample a disc straight from validated parameters.
pub fn sample_disc(validated: &ValidatedParams, phase_offset: f64, config: &RefineConfig) -> Outcome<CurveSample> {
    let profile = TrochoidProfile::from_validated(validated);
    sample(&profile, phase_offset, validated.base_steps(), config)
}
