//! Benchmark command implementation.

use std::time::Instant;

use cyclo_drive::generate;

use super::config::ParamArgs;

/// Execute the benchmark command.
pub fn cmd_benchmark(args: &[String]) {
    let mut params_args = ParamArgs::default();
    let mut runs: usize = 3;

    let mut i = 0;
    while i < args.len() {
        match params_args.take(args, &mut i) {
            Ok(true) => {}
            Ok(false) => match args[i].as_str() {
                "-r" | "--runs" => {
                    i += 1;
                    if i < args.len() {
                        runs = args[i].parse().unwrap_or_else(|_| {
                            eprintln!("Invalid run count: {}", args[i]);
                            std::process::exit(1);
                        });
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
            },
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let params = params_args.resolve().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let runs = runs.max(1);
    let mut timings = Vec::with_capacity(runs);
    let mut last = None;

    for _ in 0..runs {
        let start = Instant::now();
        let generation = generate(&params).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        timings.push(start.elapsed());
        last = Some(generation);
    }

    let Some(generation) = last else {
        return;
    };

    let total: f64 = timings.iter().map(|t| t.as_secs_f64()).sum();
    let best = timings.iter().map(|t| t.as_secs_f64()).fold(f64::INFINITY, f64::min);

    println!();
    println!("═══════════════════════════════════════════════");
    println!("  CYCLO-DRIVE BENCHMARK: N={} ({}:1)", params.ring_pin_count, generation.summary.ratio);
    println!("═══════════════════════════════════════════════");
    for report in &generation.reports {
        println!(
            "  Disc {}: {} samples ({} base) -> {} segments, max dev {:.5} mm",
            report.disc, report.sample_points, report.base_steps, report.knots, report.max_deviation
        );
    }
    println!("  Warnings: {}", generation.warnings.len());
    println!("  Runs: {}", runs);
    println!("  Time (ms, avg): {:.2}", total * 1000.0 / runs as f64);
    println!("  Time (ms, best): {:.2}", best * 1000.0);
    println!("═══════════════════════════════════════════════");
}

fn print_usage() {
    eprintln!("Usage: cyclo-drive benchmark [config] [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -r, --runs <n>    Number of timed runs (default: 3)");
    eprintln!();
    eprintln!("Times the full pipeline (validate, sample, fit, assemble).");
}
