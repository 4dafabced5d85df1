//! Generation parameters and the validator.
//!
//! [`Parameters`] is the plain, externally held configuration record. The
//! host (the CLI, a CAD add-in, a test) owns it, may persist it however it
//! likes, and passes it in for every generation request. Nothing in this
//! crate keeps parameters between calls.
//!
//! [`validate`] is the only way to obtain a [`ValidatedParams`], so every
//! sampling entry point that takes one can rely on the checks below.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::InvalidParameterError;

/// Offset added to the profile when `exact_geometry` is off, so the disc
/// never touches a ring pin even with zero clearance.
pub const NO_CONTACT_GUARD: f64 = 0.02;

/// Adaptive density never drops below this many base steps.
pub const MIN_BASE_STEPS: usize = 240;

/// Largest base step count a density may resolve to.
pub const MAX_BASE_STEPS: usize = 1_000_000;

/// Ring pin diameter must stay below this fraction of the pin pitch.
const MAX_PIN_PITCH_FILL: f64 = 0.98;

/// How densely to sample the disc profile.
///
/// In config files a bare integer means `Fixed`, a map with
/// `points_per_lobe` means `Adaptive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleDensity {
    /// Scale with the lobe count and the ring pin count.
    Adaptive { points_per_lobe: u32 },
    /// Exactly this many base steps around the profile.
    Fixed(usize),
}

impl Default for SampleDensity {
    fn default() -> Self {
        SampleDensity::Adaptive { points_per_lobe: 120 }
    }
}

impl SampleDensity {
    /// Number of uniform base steps over [0, 2π) before refinement.
    ///
    /// Adaptive: `max(240, lobes * points_per_lobe) * max(1, N / 8)`, so high
    /// pin counts get proportionally more points per lobe.
    ///
    /// `None` when the count does not fit in a `usize`.
    pub fn resolve(&self, ring_pin_count: u32) -> Option<usize> {
        match *self {
            SampleDensity::Fixed(count) => Some(count),
            SampleDensity::Adaptive { points_per_lobe } => {
                if points_per_lobe == 0 {
                    return Some(0);
                }
                let lobes = ring_pin_count.saturating_sub(1) as usize;
                let base = lobes.checked_mul(points_per_lobe as usize)?.max(MIN_BASE_STEPS);
                let scale = ((ring_pin_count / 8) as usize).max(1);
                base.checked_mul(scale)
            }
        }
    }
}

/// Where disc 2's output holes go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolePlacement {
    /// Each disc carries the hole pattern around its own center.
    #[default]
    PerDisc,
    /// Disc 2's holes sit at disc 1's hole positions in world coordinates.
    SharedWorld,
}

/// Everything needed to generate one reducer layout. Lengths in mm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Number of ring pins (N). The disc has N - 1 lobes.
    pub ring_pin_count: u32,
    /// Radius of the circle the ring pin centers sit on.
    pub ring_circle_radius: f64,
    pub ring_pin_radius: f64,
    pub eccentricity: f64,
    /// Extra inward offset of the profile beyond the pin radius.
    pub roller_clearance: f64,
    /// When false, [`NO_CONTACT_GUARD`] is added to the profile offset.
    pub exact_geometry: bool,

    pub output_pin_count: u32,
    pub output_circle_radius: f64,
    pub output_pin_radius: f64,
    /// Diametral clearance added to each disc hole.
    pub hole_extra_diameter: f64,
    pub bore_diameter: f64,

    /// 1 or 2 discs.
    pub disc_count: u8,
    /// Disc 2 center at (-E, 0) when true, at (E, 0) next to disc 1 otherwise.
    pub opposed_eccentric: bool,
    pub hole_placement: HolePlacement,
    /// Include the ring pins in the output geometry.
    pub draw_ring_pins: bool,
    /// Include the output pins in the output geometry.
    pub draw_output_pins: bool,
    pub sample_density: SampleDensity,
    /// Maximum distance between the fitted spline and the sampled profile.
    pub fit_tolerance: f64,
    /// Manual disc-2 phase in degrees. `None` computes it.
    pub phase_override_deg: Option<f64>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            ring_pin_count: 9,
            ring_circle_radius: 38.0,
            ring_pin_radius: 3.0,
            eccentricity: 1.8,
            roller_clearance: 0.10,
            exact_geometry: false,
            output_pin_count: 9,
            output_circle_radius: 22.0,
            output_pin_radius: 2.0,
            hole_extra_diameter: 0.30,
            bore_diameter: 22.0,
            disc_count: 2,
            opposed_eccentric: true,
            hole_placement: HolePlacement::PerDisc,
            draw_ring_pins: true,
            draw_output_pins: true,
            sample_density: SampleDensity::default(),
            fit_tolerance: 0.01,
            phase_override_deg: None,
        }
    }
}

impl Parameters {
    /// Reduction ratio (N - 1):1.
    pub fn reduction_ratio(&self) -> u32 {
        self.ring_pin_count.saturating_sub(1)
    }

    /// How far the profile sits inside the pin-center path.
    pub fn profile_offset(&self) -> f64 {
        let guard = if self.exact_geometry { 0.0 } else { NO_CONTACT_GUARD };
        self.ring_pin_radius + self.roller_clearance.max(0.0) + guard
    }

    /// Radius of each disc hole: output pin + eccentric travel + clearance.
    pub fn hole_radius(&self) -> f64 {
        self.output_pin_radius + self.eccentricity + self.hole_extra_diameter / 2.0
    }

    pub fn bore_radius(&self) -> f64 {
        (self.bore_diameter / 2.0).max(0.01)
    }
}

/// Parameters that passed [`validate`], plus values derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedParams {
    params: Parameters,
    base_steps: usize,
    offset: f64,
}

impl ValidatedParams {
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Number of disc lobes (N - 1).
    pub fn lobes(&self) -> u32 {
        self.params.reduction_ratio()
    }

    /// Resolved base step count for the sampler.
    pub fn base_steps(&self) -> usize {
        self.base_steps
    }

    /// Inward offset from the pin-center path to the profile.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn into_inner(self) -> Parameters {
        self.params
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), InvalidParameterError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(InvalidParameterError::NonPositive { field, value })
    }
}

/// Check a parameter set. The first violated constraint is reported.
///
/// Pure: no allocation beyond the returned copy, no logging.
pub fn validate(params: &Parameters) -> Result<ValidatedParams, InvalidParameterError> {
    let n = params.ring_pin_count;
    if n < 3 {
        return Err(InvalidParameterError::TooFewRingPins { count: n });
    }

    positive("ring_circle_radius", params.ring_circle_radius)?;
    positive("ring_pin_radius", params.ring_pin_radius)?;
    positive("eccentricity", params.eccentricity)?;
    positive("output_circle_radius", params.output_circle_radius)?;
    positive("output_pin_radius", params.output_pin_radius)?;
    positive("fit_tolerance", params.fit_tolerance)?;

    if let Some(degrees) = params.phase_override_deg {
        if !degrees.is_finite() {
            return Err(InvalidParameterError::NonFinite { field: "phase_override_deg", value: degrees });
        }
    }

    if !(params.roller_clearance >= 0.0) {
        return Err(InvalidParameterError::NegativeClearance { value: params.roller_clearance });
    }

    let r = params.ring_circle_radius;
    let e = params.eccentricity;

    if e >= params.ring_pin_radius {
        return Err(InvalidParameterError::EccentricityNotBelowPinRadius {
            eccentricity: e,
            ring_pin_radius: params.ring_pin_radius,
        });
    }

    let product = e * n as f64;
    if product >= r {
        return Err(InvalidParameterError::EccentricityTooLargeForRing {
            product,
            ring_circle_radius: r,
        });
    }

    let pitch = TAU * r / n as f64;
    let pin_diameter = 2.0 * params.ring_pin_radius;
    if pin_diameter >= MAX_PIN_PITCH_FILL * pitch {
        return Err(InvalidParameterError::RingPinsCrowded { pin_diameter, pitch });
    }

    let effective = params.ring_pin_radius + params.roller_clearance;
    if effective >= r {
        return Err(InvalidParameterError::ClearanceTooLarge { effective, ring_circle_radius: r });
    }

    if params.output_pin_count < 1 {
        return Err(InvalidParameterError::NoOutputPins);
    }

    if !matches!(params.disc_count, 1 | 2) {
        return Err(InvalidParameterError::UnsupportedDiscCount { count: params.disc_count });
    }

    let base_steps = match params.sample_density.resolve(n) {
        Some(0) => return Err(InvalidParameterError::EmptySampleDensity),
        Some(steps) if steps <= MAX_BASE_STEPS => steps,
        resolved => {
            return Err(InvalidParameterError::DensityTooLarge {
                steps: resolved.unwrap_or(usize::MAX),
                max: MAX_BASE_STEPS,
            });
        }
    };

    let offset = params.profile_offset();
    let min_radius = min_convex_curvature_radius(n, r, e);
    if offset >= min_radius {
        return Err(InvalidParameterError::Undercut { offset, min_radius });
    }

    Ok(ValidatedParams { params: params.clone(), base_steps, offset })
}

/// Smallest radius of curvature over the convex stretches of the pin-center
/// trochoid `R e^{ip} - E e^{iNp}`.
///
/// With `c = cos((N - 1) p)` the speed and the curvature numerator are both
/// linear in `c`:
///
/// ```text
/// |z'|^2     = R^2 + N^2 E^2 - 2 R N E c
/// z' x z''   = R^2 + N^3 E^2 - R N E (N + 1) c
/// ```
///
/// so the radius of curvature `|z'|^3 / (z' x z'')` only needs a scan over
/// `c` in [-1, 1]. Stretches with a non-positive numerator curve away from
/// the disc center and cannot undercut.
pub fn min_convex_curvature_radius(ring_pin_count: u32, ring_circle_radius: f64, eccentricity: f64) -> f64 {
    const SCAN_STEPS: usize = 4096;

    let n = ring_pin_count as f64;
    let r = ring_circle_radius;
    let e = eccentricity;

    let mut best = f64::INFINITY;
    for i in 0..=SCAN_STEPS {
        let c = -1.0 + 2.0 * i as f64 / SCAN_STEPS as f64;
        let speed_sq = r * r + n * n * e * e - 2.0 * r * n * e * c;
        let cross = r * r + n * n * n * e * e - r * n * e * (n + 1.0) * c;
        if cross > 0.0 && speed_sq > 0.0 {
            best = best.min(speed_sq.powf(1.5) / cross);
        }
    }
    best
}
