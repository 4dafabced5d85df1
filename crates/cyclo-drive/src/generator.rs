//! The generation pipeline.
//!
//! validate → pin layout → sample + fit disc 1 → (two discs only) phase,
//! sample + fit disc 2 → place holes and bores → assemble.
//!
//! One call, no shared state: every [`Generation`] is built from scratch out
//! of the [`Parameters`] it was given.

use serde::Serialize;
use tracing::debug;

use crate::assembly::{assemble, DiscGeometry, Geometry};
use crate::error::{InvalidParameterError, NumericalInstabilityWarning};
use crate::fit::{fit, FitConfig, FittedCurve};
use crate::geometry::{Circle, Point};
use crate::params::{validate, HolePlacement, Parameters, ValidatedParams};
use crate::phase::{identical_part_rotation, resolve_phase, PhaseOffset, PhaseSource};
use crate::pins::layout;
use crate::sampler::{sample_disc, CurveSample, RefineConfig};

/// Diagnostics for one disc profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileReport {
    pub disc: u8,
    pub sample_points: usize,
    pub base_steps: usize,
    /// Bézier segments in the fitted spline.
    pub knots: usize,
    pub max_deviation: f64,
    /// Smallest distance from the profile to any ring pin surface, with the
    /// disc in its drawn position. Equals clearance (+ guard) for a good profile.
    pub min_ring_pin_gap: f64,
    pub self_intersects: bool,
    /// Largest distance from the disc center to the profile.
    pub outer_radius: f64,
    /// Smallest distance from the disc center to the profile.
    pub root_radius: f64,
}

impl ProfileReport {
    fn measure(disc: u8, sample: &CurveSample, center: Point, ring_pins: &[Circle], curve: &FittedCurve) -> Self {
        let (outer_radius, root_radius) = sample.radius_range();
        Self {
            disc,
            sample_points: sample.len(),
            base_steps: sample.base_steps(),
            knots: curve.segment_count(),
            max_deviation: curve.max_deviation(),
            min_ring_pin_gap: min_ring_pin_gap(sample.points(), center, ring_pins),
            self_intersects: sample.self_intersects(),
            outer_radius,
            root_radius,
        }
    }
}

/// Smallest clearance between disc-local `points` placed at `center` and the
/// ring pins. Negative when the profile cuts into a pin.
pub fn min_ring_pin_gap(points: &[Point], center: Point, ring_pins: &[Circle]) -> f64 {
    points
        .iter()
        .map(|p| p.translated(center.x, center.y))
        .flat_map(|p| ring_pins.iter().map(move |pin| p.distance(pin.center) - pin.radius))
        .fold(f64::INFINITY, f64::min)
}

/// Whether the profile was offset by the no-contact guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeometryMode {
    Exact,
    Guarded,
}

impl GeometryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryMode::Exact => "Exact",
            GeometryMode::Guarded => "Guarded",
        }
    }
}

/// Human-facing numbers for a validated design.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignSummary {
    /// Reduction ratio N - 1 (to 1).
    pub ratio: u32,
    pub lobes: u32,
    pub disc_count: u8,
    /// Disc 2 phase in degrees; `None` for a single disc.
    pub phase_deg: Option<f64>,
    pub phase_source: Option<PhaseSource>,
    /// Rotation that turns disc 1 into disc 2, when they are the same part.
    pub identical_part_deg: Option<f64>,
    pub eccentricity: f64,
    pub pin_diameter: f64,
    pub clearance: f64,
    pub offset: f64,
    /// 2(R + E - d)
    pub outer_diameter: f64,
    /// 2(R - E - d)
    pub root_diameter: f64,
    pub mode: GeometryMode,
}

impl DesignSummary {
    pub fn new(validated: &ValidatedParams, phase: Option<PhaseOffset>) -> Self {
        let p = validated.params();
        let d = validated.offset();
        let identical_part_deg = phase
            .filter(|ph| ph.source == PhaseSource::Computed)
            .and_then(|_| match (p.opposed_eccentric, p.hole_placement) {
                (false, _) => Some(0.0),
                (true, HolePlacement::SharedWorld) => None,
                (true, HolePlacement::PerDisc) => identical_part_rotation(p.ring_pin_count, p.output_pin_count),
            })
            .map(f64::to_degrees);

        Self {
            ratio: p.reduction_ratio(),
            lobes: validated.lobes(),
            disc_count: p.disc_count,
            phase_deg: phase.map(|ph| ph.degrees()),
            phase_source: phase.map(|ph| ph.source),
            identical_part_deg,
            eccentricity: p.eccentricity,
            pin_diameter: 2.0 * p.ring_pin_radius,
            clearance: p.roller_clearance,
            offset: d,
            outer_diameter: 2.0 * (p.ring_circle_radius + p.eccentricity - d),
            root_diameter: 2.0 * (p.ring_circle_radius - p.eccentricity - d),
            mode: if p.exact_geometry { GeometryMode::Exact } else { GeometryMode::Guarded },
        }
    }

    /// Summary for a parameter set that has not been generated yet.
    pub fn for_params(validated: &ValidatedParams) -> Self {
        let phase = (validated.params().disc_count == 2).then(|| resolve_phase(validated.params()));
        Self::new(validated, phase)
    }

    pub fn status_text(&self) -> String {
        let phase = match self.phase_deg {
            Some(deg) => format!("{:.2}°", deg),
            None => "n/a (single disc)".to_string(),
        };
        let mut text = format!(
            "OK ({})\n\
             Ratio: {}:1 | Lobes: {} | Phase: {}\n\
             E: {:.3} mm | Pin Ø: {:.3} mm\n\
             Roller clearance: {:.3} mm | Disc Ø: {:.3} mm (root Ø {:.3} mm)",
            self.mode.as_str(),
            self.ratio,
            self.lobes,
            phase,
            self.eccentricity,
            self.pin_diameter,
            self.clearance,
            self.outer_diameter,
            self.root_diameter,
        );
        if let Some(deg) = self.identical_part_deg {
            text.push_str(&format!("\nDisc 2 = disc 1 rotated {:.2}°", deg));
        }
        text
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    pub geometry: Geometry,
    pub reports: Vec<ProfileReport>,
    pub summary: DesignSummary,
    /// Phase used for disc 2; `None` when only one disc was built.
    pub phase: Option<PhaseOffset>,
    pub warnings: Vec<NumericalInstabilityWarning>,
}

/// Loop caps for the sampler and the fitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pipeline {
    pub refine: RefineConfig,
    pub fit_max_iterations: usize,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            refine: RefineConfig::default(),
            fit_max_iterations: FitConfig::default().max_iterations,
        }
    }
}

impl Pipeline {
    pub fn run(&self, params: &Parameters) -> Result<Generation, InvalidParameterError> {
        let validated = validate(params)?;
        let p = validated.params();

        let ring_pins = layout(p.ring_circle_radius, p.ring_pin_count, p.ring_pin_radius, 0.0);
        let output_pins = layout(p.output_circle_radius, p.output_pin_count, p.output_pin_radius, 0.0);

        let hole_pattern = layout(p.output_circle_radius, p.output_pin_count, p.hole_radius(), 0.0);
        let holes_around = |center: Point| -> Vec<Circle> {
            hole_pattern.iter().map(|hole| hole.translated(center.x, center.y)).collect()
        };

        let mut warnings = Vec::new();
        let mut reports = Vec::new();
        let mut discs = Vec::new();

        let center1 = Point::new(p.eccentricity, 0.0);
        let holes1 = holes_around(center1);
        let placement = Placement { index: 1, center: center1, phase: 0.0, holes: holes1.clone() };
        let (disc, report) = self.build_disc(&validated, placement, &ring_pins, &mut warnings);
        discs.push(disc);
        reports.push(report);

        let phase = if p.disc_count == 2 {
            let phase = resolve_phase(p);
            let center2 = if p.opposed_eccentric { Point::new(-p.eccentricity, 0.0) } else { center1 };
            let holes2 = match p.hole_placement {
                HolePlacement::PerDisc => holes_around(center2),
                HolePlacement::SharedWorld => holes1,
            };
            let placement = Placement { index: 2, center: center2, phase: phase.radians, holes: holes2 };
            let (disc, report) = self.build_disc(&validated, placement, &ring_pins, &mut warnings);
            discs.push(disc);
            reports.push(report);
            Some(phase)
        } else {
            None
        };

        let summary = DesignSummary::new(&validated, phase);
        let ring_pins = if p.draw_ring_pins { ring_pins } else { Vec::new() };
        let output_pins = if p.draw_output_pins { output_pins } else { Vec::new() };
        let geometry = assemble(ring_pins, output_pins, discs);

        debug!(
            discs = geometry.discs.len(),
            circles = geometry.circle_count(),
            warnings = warnings.len(),
            "generation complete"
        );

        Ok(Generation { geometry, reports, summary, phase, warnings })
    }

    fn build_disc(
        &self,
        validated: &ValidatedParams,
        placement: Placement,
        ring_pins: &[Circle],
        warnings: &mut Vec<NumericalInstabilityWarning>,
    ) -> (DiscGeometry, ProfileReport) {
        let p = validated.params();
        let Placement { index, center, phase, holes } = placement;

        let sample = sample_disc(validated, phase, &self.refine).drain_into(warnings);
        let fit_config = FitConfig {
            tolerance: p.fit_tolerance,
            max_iterations: self.fit_max_iterations,
            ..FitConfig::default()
        };
        let curve = fit(&sample, &fit_config).drain_into(warnings);

        let report = ProfileReport::measure(index, &sample, center, ring_pins, &curve);
        debug!(
            disc = index,
            points = report.sample_points,
            knots = report.knots,
            gap = report.min_ring_pin_gap,
            "disc profile ready"
        );

        let disc = DiscGeometry {
            index,
            center,
            phase,
            profile: curve.translated(center.x, center.y),
            holes,
            bore: Circle::new(center, p.bore_radius()),
        };

        (disc, report)
    }
}

/// Where one disc goes and which holes it carries (world coordinates).
struct Placement {
    index: u8,
    center: Point,
    phase: f64,
    holes: Vec<Circle>,
}

/// Run the pipeline with the default loop caps.
pub fn generate(params: &Parameters) -> Result<Generation, InvalidParameterError> {
    Pipeline::default().run(params)
}

// ============================================================================
// TESTS
// ============================================================================
