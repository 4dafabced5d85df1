//! Dual-disc phase coordination.
//!
//! Two discs on opposed eccentrics (centers at (E, 0) and (-E, 0)) cancel each
//! other's imbalance. The second disc's profile must be rotated so its lobes
//! still wrap the ring pins from the other side. Working through the envelope
//! condition for the mirrored eccentric gives a rotation of half a lobe,
//! `π / (N - 1)`, for every ring pin count.
//!
//! The output holes are not rotated: each disc keeps its holes on the
//! output-pin angles relative to its own center, so both discs ride the same
//! output pins. Pin-count parity only decides whether disc 2 is the same part
//! as disc 1 turned over in the plane, see [`identical_part_rotation`].

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::params::Parameters;

/// Where a phase value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseSource {
    Computed,
    Manual,
}

/// Rotation applied to disc 2's profile around its own center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseOffset {
    pub radians: f64,
    pub source: PhaseSource,
}

impl PhaseOffset {
    pub fn computed(radians: f64) -> Self {
        Self { radians, source: PhaseSource::Computed }
    }

    pub fn manual_degrees(degrees: f64) -> Self {
        Self { radians: degrees.to_radians(), source: PhaseSource::Manual }
    }

    pub fn degrees(&self) -> f64 {
        self.radians.to_degrees()
    }
}

/// Phase for disc 2: half a lobe period.
///
/// The hole pattern needs no correction for any output pin count, so
/// `output_pin_count` only feeds the identical-part check that gets logged.
pub fn compute_phase(ring_pin_count: u32, output_pin_count: u32) -> PhaseOffset {
    let lobes = ring_pin_count.saturating_sub(1).max(1);
    let phase = PhaseOffset::computed(PI / lobes as f64);

    debug!(
        ring_pin_count,
        output_pin_count,
        phase_deg = phase.degrees(),
        identical_part_deg = ?identical_part_rotation(ring_pin_count, output_pin_count).map(f64::to_degrees),
        "computed dual-disc phase"
    );

    phase
}

/// Smallest rotation turning disc 1 (profile and holes) into disc 2, if any.
///
/// Disc 2 is disc 1 with its profile turned by an odd number of half lobes
/// (`j·π/(N-1)`, `j` odd). That rotation also maps the holes onto themselves
/// when it is a multiple of `2π / output_pin_count`, i.e. when
/// `j·output_pin_count` is divisible by `2(N - 1)`. When no odd `j` works the
/// two discs have to be made as different parts.
pub fn identical_part_rotation(ring_pin_count: u32, output_pin_count: u32) -> Option<f64> {
    let lobes = ring_pin_count.checked_sub(1).filter(|&l| l > 0)? as u64;
    let outputs = u64::from(output_pin_count);
    if outputs == 0 {
        return None;
    }

    (1..2 * lobes)
        .step_by(2)
        .find(|j| (j * outputs) % (2 * lobes) == 0)
        .map(|j| j as f64 * PI / lobes as f64)
        .filter(|&angle| angle < TAU)
}

/// The manual override when one is set, the computed phase otherwise.
///
/// A disc 2 on the same eccentric as disc 1 is a plain copy and gets a
/// computed phase of zero.
pub fn resolve_phase(params: &Parameters) -> PhaseOffset {
    match params.phase_override_deg {
        Some(degrees) => PhaseOffset::manual_degrees(degrees),
        None if params.opposed_eccentric => compute_phase(params.ring_pin_count, params.output_pin_count),
        None => PhaseOffset::computed(0.0),
    }
}
