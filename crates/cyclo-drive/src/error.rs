//! Errors and warnings.
//!
//! There are exactly two kinds of trouble in this crate:
//!
//! - [`InvalidParameterError`] is fatal. `validate` returns it before any
//!   sampling starts, naming the first constraint that was violated.
//! - [`NumericalInstabilityWarning`] is not. The sampler or fitter hit one of
//!   its caps, so the result is best-effort; it travels next to the value in an
//!   [`Outcome`].
//!
//! ## Rust Lesson #20: Error Handling
//!
//! `thiserror` writes the `Display` and `std::error::Error` impls from the
//! `#[error("...")]` attributes, so each variant carries its own message.

use serde::Serialize;
use thiserror::Error;

/// A parameter set was rejected. One variant per constraint.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidParameterError {
    #[error("ring pin count must be >= 3 (got {count})")]
    TooFewRingPins { count: u32 },

    #[error("{field} must be a positive finite number (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be a finite number (got {value})")]
    NonFinite { field: &'static str, value: f64 },

    #[error("roller clearance must be >= 0 (got {value})")]
    NegativeClearance { value: f64 },

    #[error(
        "eccentricity ({eccentricity:.3} mm) must be smaller than the ring pin radius ({ring_pin_radius:.3} mm), \
         otherwise the profile self-intersects"
    )]
    EccentricityNotBelowPinRadius { eccentricity: f64, ring_pin_radius: f64 },

    #[error("need E*N < R: E*N = {product:.3} mm, R = {ring_circle_radius:.3} mm")]
    EccentricityTooLargeForRing { product: f64, ring_circle_radius: f64 },

    #[error("ring pins too large for this ring circle (pin diameter {pin_diameter:.3} mm, pitch {pitch:.3} mm)")]
    RingPinsCrowded { pin_diameter: f64, pitch: f64 },

    #[error("roller clearance too large for the ring radius (pin radius + clearance = {effective:.3} mm, R = {ring_circle_radius:.3} mm)")]
    ClearanceTooLarge { effective: f64, ring_circle_radius: f64 },

    #[error("output pin count must be >= 1")]
    NoOutputPins,

    #[error("disc count must be 1 or 2 (got {count})")]
    UnsupportedDiscCount { count: u8 },

    #[error("sample density must resolve to a positive point count")]
    EmptySampleDensity,

    #[error("sample density must resolve to at most {max} base steps (got {steps})")]
    DensityTooLarge { steps: usize, max: usize },

    #[error(
        "profile undercut: offset {offset:.3} mm exceeds the smallest convex radius of curvature \
         of the pin-center path ({min_radius:.3} mm)"
    )]
    Undercut { offset: f64, min_radius: f64 },
}

/// A numerical loop stopped at its cap. The accompanying result is still usable.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NumericalInstabilityWarning {
    #[error("curvature refinement capped: {unresolved} interval(s) still exceed the thresholds ({points} points)")]
    RefinementCapped { unresolved: usize, points: usize },

    #[error("fit tolerance not met after {iterations} iterations: achieved {achieved:.5} mm, wanted {tolerance:.5} mm")]
    FitToleranceNotMet { tolerance: f64, achieved: f64, iterations: usize },
}

/// A value together with any warnings raised while producing it.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<NumericalInstabilityWarning>,
}

impl<T> Outcome<T> {
    pub fn clean(value: T) -> Self {
        Self { value, warnings: Vec::new() }
    }

    pub fn with_warnings(value: T, warnings: Vec<NumericalInstabilityWarning>) -> Self {
        Self { value, warnings }
    }

    /// Move the warnings into `sink` and hand back the value.
    pub fn drain_into(self, sink: &mut Vec<NumericalInstabilityWarning>) -> T {
        sink.extend(self.warnings);
        self.value
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_constraint() {
        let err = InvalidParameterError::TooFewRingPins { count: 2 };
        assert!(err.to_string().contains(">= 3"));

        let err = InvalidParameterError::UnsupportedDiscCount { count: 3 };
        assert!(err.to_string().contains("1 or 2"));
    }

    #[test]
    fn drain_moves_warnings() {
        let outcome = Outcome::with_warnings(
            7,
            vec![NumericalInstabilityWarning::RefinementCapped { unresolved: 1, points: 10 }],
        );
        assert!(!outcome.is_clean());

        let mut sink = Vec::new();
        let value = outcome.drain_into(&mut sink);
        assert_eq!(value, 7);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn warnings_serialize_with_kind_tag() {
        let warning = NumericalInstabilityWarning::FitToleranceNotMet {
            tolerance: 0.01,
            achieved: 0.02,
            iterations: 3,
        };
        let json = serde_json::to_string(&warning).unwrap();
        assert!(json.contains("\"kind\":\"fit_tolerance_not_met\""));
    }
}
