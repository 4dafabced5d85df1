//! CLI command implementations.
//!
//! - `generate` - Run the pipeline and write SVG or JSON
//! - `check` - Validate parameters and print the design summary
//! - `benchmark` - Time the pipeline for one parameter set
//! - `example-config` - Print an example configuration

pub mod benchmark;
pub mod check;
pub mod common;
pub mod config;
pub mod generate;

pub use benchmark::cmd_benchmark;
pub use check::cmd_check;
pub use config::cmd_example_config;
pub use generate::cmd_generate;
