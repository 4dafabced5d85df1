//! # cyclo-drive
//!
//! Cycloidal reducer geometry: ring pins, output pins and one or two
//! phased cycloidal discs, from a single [`Parameters`] record.
//!
//! ```no_run
//! use cyclo_drive::{generate, Parameters};
//!
//! let generation = generate(&Parameters::default()).expect("default design is valid");
//! println!("{}", generation.summary.status_text());
//! ```
//!
//! ## Rust Lesson #7: Modules
//!
//! Each stage of the pipeline is its own module and only talks to the
//! others through plain data:
//! - `params` checks the input and hands out a `ValidatedParams`
//! - `sampler` and `fit` turn that into a spline per disc
//! - `pins`, `phase` and `assembly` place everything
//! - `generator` runs the stages in order
//!
//! `pub use` below re-exports the names a host actually needs, so callers can
//! write `cyclo_drive::generate` instead of `cyclo_drive::generator::generate`.

pub mod assembly;
pub mod error;
pub mod fit;
pub mod generator;
pub mod geometry;
pub mod intersect;
pub mod params;
pub mod phase;
pub mod pins;
pub mod sampler;

// Re-export common types at crate root for convenience.
pub use assembly::{assemble, DiscGeometry, Geometry};
pub use error::{InvalidParameterError, NumericalInstabilityWarning, Outcome};
pub use fit::{fit, FitConfig, FittedCurve};
pub use generator::{generate, DesignSummary, Generation, GeometryMode, Pipeline, ProfileReport};
pub use geometry::{Circle, Point};
pub use params::{validate, HolePlacement, Parameters, SampleDensity, ValidatedParams};
pub use phase::{compute_phase, identical_part_rotation, PhaseOffset, PhaseSource};
pub use pins::{layout, PinCircle};
pub use sampler::{sample, CurveSample, RefineConfig, TrochoidProfile};
