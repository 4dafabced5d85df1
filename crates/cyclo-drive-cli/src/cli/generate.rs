//! Generate command implementation.

use std::fs;

use tracing::{info, warn};

use cyclo_drive::generate;

use super::common::{default_prefix, generation_to_json, geometry_to_svg, OutputFormat};
use super::config::ParamArgs;

/// Execute the generate command.
pub fn cmd_generate(args: &[String]) {
    let mut params_args = ParamArgs::default();
    let mut output_path: Option<&str> = None;
    let mut format = OutputFormat::Svg;
    let mut prefix: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        match params_args.take(args, &mut i) {
            Ok(true) => {
                i += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }

        match args[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(args[i].as_str());
                }
            }
            "-f" | "--format" => {
                i += 1;
                if i < args.len() {
                    format = OutputFormat::from_name(&args[i]).unwrap_or_else(|| {
                        eprintln!("Unknown format: {}. Use 'svg' or 'json'.", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--prefix" => {
                i += 1;
                if i < args.len() {
                    prefix = Some(args[i].clone());
                }
            }
            "-h" | "--help" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if let Err(e) = run(&params_args, output_path, format, prefix) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(params_args: &ParamArgs, output_path: Option<&str>, format: OutputFormat, prefix: Option<String>) -> Result<(), String> {
    let params = params_args.resolve()?;
    let generation = generate(&params).map_err(|e| e.to_string())?;

    for warning in &generation.warnings {
        warn!("{}", warning);
    }
    for report in &generation.reports {
        info!(
            disc = report.disc,
            points = report.sample_points,
            segments = report.knots,
            deviation = report.max_deviation,
            gap = report.min_ring_pin_gap,
            "disc profile"
        );
    }

    let prefix = prefix.unwrap_or_else(default_prefix);
    let output = match format {
        OutputFormat::Svg => geometry_to_svg(&generation, &prefix),
        OutputFormat::Json => generation_to_json(&generation, &prefix)?,
    };

    match output_path {
        Some(path) if path != "-" => {
            fs::write(path, &output).map_err(|e| format!("Failed to write {}: {}", path, e))?;
            info!(path, discs = generation.geometry.discs.len(), "wrote geometry");
        }
        _ => print!("{}", output),
    }

    Ok(())
}

fn print_usage() {
    eprintln!("Usage: cyclo-drive generate [config] [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <file>    Output file (- for stdout, default: stdout)");
    eprintln!("  -f, --format <fmt>     Output format: svg, json (default: svg)");
    eprintln!("  --prefix <name>        Group name prefix (default: CY_HHMMSS)");
    eprintln!();
    eprintln!("Design options are listed by 'cyclo-drive help'.");
}
