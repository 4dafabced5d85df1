//! cyclo-drive - cycloidal reducer geometry from the command line
//!
//! Usage:
//!   cyclo-drive generate [config.yaml] [flags]   Write ring pins, output pins and discs as SVG/JSON
//!   cyclo-drive check [config.yaml] [flags]      Validate and print the design summary
//!   cyclo-drive benchmark [config.yaml] [flags]  Time the pipeline
//!   cyclo-drive example-config                   Print an example YAML config

mod cli;

use std::env;
use std::io::IsTerminal;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use cli::{cmd_benchmark, cmd_check, cmd_example_config, cmd_generate};

/// Log to stderr so stdout stays clean for SVG/JSON.
///
/// `RUST_LOG` picks the level, `info` when unset.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);
    Registry::default().with(filter).with(fmt_layer).init();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    init_tracing();

    match args[1].as_str() {
        "generate" => cmd_generate(&args[2..]),
        "check" => cmd_check(&args[2..]),
        "benchmark" => cmd_benchmark(&args[2..]),
        "example-config" => cmd_example_config(),
        "help" | "--help" | "-h" => print_usage(&args[0]),
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!();
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("cyclo-drive - cycloidal reducer geometry");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {} generate [config] [options]", prog);
    eprintln!("  {} check [config] [options]", prog);
    eprintln!("  {} benchmark [config] [options]", prog);
    eprintln!("  {} example-config", prog);
    eprintln!();
    eprintln!("The config file is YAML (.yaml/.yml) or JSON (.json). Options override it.");
    eprintln!();
    eprintln!("Design options:");
    eprintln!("  -n, --ring-pins <n>        Ring pin count N (ratio N-1:1, default: 9)");
    eprintln!("  --ring-radius <mm>         Ring pin circle radius (default: 38)");
    eprintln!("  --pin-radius <mm>          Ring pin radius (default: 3)");
    eprintln!("  -e, --ecc <mm>             Eccentricity (default: 1.8)");
    eprintln!("  --clearance <mm>           Roller clearance (default: 0.1)");
    eprintln!("  --exact                    No extra no-contact guard on the profile");
    eprintln!("  --out-pins <n>             Output pin count (default: 9)");
    eprintln!("  --out-radius <mm>          Output pin circle radius (default: 22)");
    eprintln!("  --out-pin-radius <mm>      Output pin radius (default: 2)");
    eprintln!("  --hole-extra <mm>          Diametral hole clearance (default: 0.3)");
    eprintln!("  --bore <mm>                Center bore diameter (default: 22)");
    eprintln!("  --discs <1|2>              Number of discs (default: 2)");
    eprintln!("  --phase <deg>              Manual disc 2 phase (default: auto)");
    eprintln!("  --same-eccentric           Put disc 2 on disc 1's eccentric");
    eprintln!("  --shared-holes             Disc 2 reuses disc 1's hole positions");
    eprintln!("  --no-ring-pins             Leave the ring pins out of the output");
    eprintln!("  --no-output-pins           Leave the output pins out of the output");
    eprintln!();
    eprintln!("Sampling options:");
    eprintln!("  --points-per-lobe <n>      Adaptive density (default: 120)");
    eprintln!("  --density <n>              Fixed base step count");
    eprintln!("  --tolerance <mm>           Spline fit tolerance (default: 0.01)");
    eprintln!();
    eprintln!("Generate options:");
    eprintln!("  -o, --output <file>        Output file (- for stdout, default: stdout)");
    eprintln!("  -f, --format <fmt>         Output format: svg, json (default: svg)");
    eprintln!("  --prefix <name>            Group name prefix (default: CY_HHMMSS)");
    eprintln!();
    eprintln!("Logging:");
    eprintln!("  RUST_LOG=debug {} generate   Show sampling and fit statistics", prog);
}
