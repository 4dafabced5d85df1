//! Parameter loading for the CLI.
//!
//! Parameters come from three layers, later ones winning:
//! 1. `Parameters::default()`
//! 2. an optional YAML or JSON file (picked by extension)
//! 3. command-line flags

use std::fs;
use std::path::Path;
use std::str::FromStr;

use cyclo_drive::{HolePlacement, Parameters, SampleDensity};

/// Example configuration printed by `example-config`.
pub const EXAMPLE_CONFIG: &str = r#"# cyclo-drive configuration (all lengths in mm)
#
# Any field left out keeps its default.

# Ring pins: N pins give an (N-1):1 reduction
ring_pin_count: 9
ring_circle_radius: 38.0
ring_pin_radius: 3.0

# Eccentric offset, must be below the ring pin radius and E*N < R
eccentricity: 1.8

# Extra gap between the disc profile and the ring pins
roller_clearance: 0.1
# false adds a 0.02 mm no-contact guard on top of the clearance
exact_geometry: false

# Output pins and the matching disc holes
output_pin_count: 9
output_circle_radius: 22.0
output_pin_radius: 2.0
hole_extra_diameter: 0.3
bore_diameter: 22.0

# 1 or 2
disc_count: 2
# false puts disc 2 on the same eccentric as disc 1
opposed_eccentric: true
# per_disc: holes around each disc center
# shared_world: disc 2 reuses disc 1's hole positions
hole_placement: per_disc

# Leave either pin set out of the output
draw_ring_pins: true
draw_output_pins: true

# Either a map for adaptive sampling or a bare number of base steps:
#   sample_density: 4000
sample_density:
  points_per_lobe: 120

fit_tolerance: 0.01

# Uncomment to set the disc 2 phase by hand (degrees)
# phase_override_deg: 22.5
"#;

/// Print the example config to stdout.
pub fn cmd_example_config() {
    print!("{}", EXAMPLE_CONFIG);
}

/// Load parameters from a YAML or JSON file.
pub fn load_parameters<P: AsRef<Path>>(path: P) -> Result<Parameters, String> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config JSON: {}", e))
    } else {
        serde_yaml::from_str(&content).map_err(|e| format!("Failed to parse config YAML: {}", e))
    }
}

fn parse_value<T: FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid value for {}: {}", flag, value))
}

/// Design flags shared by `generate`, `check` and `benchmark`.
#[derive(Debug, Default)]
pub struct ParamArgs {
    pub config: Option<String>,
    /// (flag, value) pairs in command-line order.
    overrides: Vec<(String, String)>,
    /// Value-less flags, applied after the overrides.
    switches: Vec<String>,
}

impl ParamArgs {
    /// Consume `args[*i]` if it is a design flag or the config path.
    ///
    /// Returns `Ok(false)` for anything else so the command can handle it.
    /// Leaves `*i` on the last consumed argument.
    pub fn take(&mut self, args: &[String], i: &mut usize) -> Result<bool, String> {
        let arg = args[*i].as_str();
        match arg {
            "-n" | "--ring-pins" | "--ring-radius" | "--pin-radius" | "-e" | "--ecc" | "--clearance"
            | "--out-pins" | "--out-radius" | "--out-pin-radius" | "--hole-extra" | "--bore" | "--discs"
            | "--points-per-lobe" | "--density" | "--tolerance" | "--phase" => {
                *i += 1;
                let value = args.get(*i).ok_or_else(|| format!("Missing value for {}", arg))?;
                self.overrides.push((arg.to_string(), value.clone()));
                Ok(true)
            }
            "--exact" | "--same-eccentric" | "--shared-holes" | "--no-ring-pins" | "--no-output-pins" => {
                self.switches.push(arg.to_string());
                Ok(true)
            }
            path if !path.starts_with('-') && self.config.is_none() => {
                self.config = Some(path.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Defaults, then the config file, then the flags.
    pub fn resolve(&self) -> Result<Parameters, String> {
        let mut params = match &self.config {
            Some(path) => load_parameters(path)?,
            None => Parameters::default(),
        };

        for (flag, value) in &self.overrides {
            apply_override(&mut params, flag, value)?;
        }
        for switch in &self.switches {
            apply_switch(&mut params, switch)?;
        }

        Ok(params)
    }
}

fn apply_override(params: &mut Parameters, flag: &str, value: &str) -> Result<(), String> {
    match flag {
        "-n" | "--ring-pins" => params.ring_pin_count = parse_value(flag, value)?,
        "--ring-radius" => params.ring_circle_radius = parse_value(flag, value)?,
        "--pin-radius" => params.ring_pin_radius = parse_value(flag, value)?,
        "-e" | "--ecc" => params.eccentricity = parse_value(flag, value)?,
        "--clearance" => params.roller_clearance = parse_value(flag, value)?,
        "--out-pins" => params.output_pin_count = parse_value(flag, value)?,
        "--out-radius" => params.output_circle_radius = parse_value(flag, value)?,
        "--out-pin-radius" => params.output_pin_radius = parse_value(flag, value)?,
        "--hole-extra" => params.hole_extra_diameter = parse_value(flag, value)?,
        "--bore" => params.bore_diameter = parse_value(flag, value)?,
        "--discs" => params.disc_count = parse_value(flag, value)?,
        "--points-per-lobe" => {
            params.sample_density = SampleDensity::Adaptive { points_per_lobe: parse_value(flag, value)? }
        }
        "--density" => params.sample_density = SampleDensity::Fixed(parse_value(flag, value)?),
        "--tolerance" => params.fit_tolerance = parse_value(flag, value)?,
        "--phase" => params.phase_override_deg = Some(parse_value(flag, value)?),
        other => return Err(format!("Unknown option: {}", other)),
    }
    Ok(())
}

fn apply_switch(params: &mut Parameters, flag: &str) -> Result<(), String> {
    match flag {
        "--exact" => params.exact_geometry = true,
        "--same-eccentric" => params.opposed_eccentric = false,
        "--shared-holes" => params.hole_placement = HolePlacement::SharedWorld,
        "--no-ring-pins" => params.draw_ring_pins = false,
        "--no-output-pins" => params.draw_output_pins = false,
        other => return Err(format!("Unknown option: {}", other)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn parse(list: &[&str]) -> Result<ParamArgs, String> {
        let args = args(list);
        let mut parsed = ParamArgs::default();
        let mut i = 0;
        while i < args.len() {
            if !parsed.take(&args, &mut i)? {
                return Err(format!("unhandled {}", args[i]));
            }
            i += 1;
        }
        Ok(parsed)
    }

    #[test]
    fn example_config_matches_defaults() {
        let params: Parameters = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        assert_eq!(params, Parameters::default());
    }

    #[test]
    fn flags_override_defaults() {
        let params = parse(&["-n", "20", "--ring-radius", "60", "-e", "1.2", "--discs", "1", "--exact"])
            .unwrap()
            .resolve()
            .unwrap();
        assert_eq!(params.ring_pin_count, 20);
        assert_eq!(params.ring_circle_radius, 60.0);
        assert_eq!(params.eccentricity, 1.2);
        assert_eq!(params.disc_count, 1);
        assert!(params.exact_geometry);
        assert_eq!(params.ring_pin_radius, Parameters::default().ring_pin_radius);
    }

    #[test]
    fn density_flags_pick_the_variant() {
        let params = parse(&["--density", "5000"]).unwrap().resolve().unwrap();
        assert_eq!(params.sample_density, SampleDensity::Fixed(5000));

        let params = parse(&["--points-per-lobe", "40"]).unwrap().resolve().unwrap();
        assert_eq!(params.sample_density, SampleDensity::Adaptive { points_per_lobe: 40 });
    }

    #[test]
    fn layout_switches_flip_the_toggles() {
        let params = parse(&["--same-eccentric", "--shared-holes", "--no-ring-pins", "--no-output-pins"])
            .unwrap()
            .resolve()
            .unwrap();
        assert!(!params.opposed_eccentric);
        assert_eq!(params.hole_placement, HolePlacement::SharedWorld);
        assert!(!params.draw_ring_pins);
        assert!(!params.draw_output_pins);
        assert!(!params.exact_geometry);
    }

    #[test]
    fn phase_flag_sets_override() {
        let params = parse(&["--phase", "12.5"]).unwrap().resolve().unwrap();
        assert_eq!(params.phase_override_deg, Some(12.5));
    }

    #[test]
    fn bad_values_are_reported() {
        let err = parse(&["-n", "lots"]).unwrap().resolve().unwrap_err();
        assert!(err.contains("-n"));

        let err = parse(&["--ecc"]).unwrap_err();
        assert!(err.contains("Missing value"));
    }

    #[test]
    fn first_positional_is_the_config() {
        let parsed = parse(&["design.yaml", "-n", "11"]).unwrap();
        assert_eq!(parsed.config.as_deref(), Some("design.yaml"));
    }

    #[test]
    fn unknown_flags_are_left_alone() {
        let args = args(&["--format", "json"]);
        let mut parsed = ParamArgs::default();
        let mut i = 0;
        assert!(!parsed.take(&args, &mut i).unwrap());
        assert_eq!(i, 0);
    }

    #[test]
    fn json_config_loads_by_extension() {
        let dir = std::env::temp_dir().join(format!("cyclo-drive-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("design.json");
        fs::write(&path, r#"{"ring_pin_count": 15, "sample_density": 3000}"#).unwrap();

        let params = load_parameters(&path).unwrap();
        assert_eq!(params.ring_pin_count, 15);
        assert_eq!(params.sample_density, SampleDensity::Fixed(3000));
        assert_eq!(params.eccentricity, Parameters::default().eccentricity);

        fs::remove_dir_all(&dir).ok();
    }
}
