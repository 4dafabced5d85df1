//! Check command implementation.

use cyclo_drive::{validate, DesignSummary};

use super::config::ParamArgs;

/// Execute the check command.
///
/// Prints the design summary on success. Invalid parameters print the
/// violated constraint and exit with status 1.
pub fn cmd_check(args: &[String]) {
    let mut params_args = ParamArgs::default();

    let mut i = 0;
    while i < args.len() {
        match params_args.take(args, &mut i) {
            Ok(true) => {}
            Ok(false) => match args[i].as_str() {
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

    match validate(&params) {
        Ok(validated) => {
            println!("{}", DesignSummary::for_params(&validated).status_text());
        }
        Err(e) => {
            println!("Invalid");
            println!("{}", e);
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: cyclo-drive check [config] [options]");
    eprintln!();
    eprintln!("Validates the parameters and prints ratio, phase and disc size.");
    eprintln!("Exits with status 1 when the parameters are invalid.");
}
