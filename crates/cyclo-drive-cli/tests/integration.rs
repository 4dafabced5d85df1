//! Integration tests for cyclo-drive CLI commands.
//!
//! These tests run the actual binary and verify end-to-end behavior.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use quick_xml::events::Event;
use quick_xml::Reader;

/// Path to the cyclo-drive binary Cargo built for this test run.
fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_cyclo-drive"))
}

/// Scratch directory unique to one test.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cyclo-drive-it-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).expect("Failed to create scratch dir");
    dir
}

/// Element counts and group ids found in an SVG document.
#[derive(Default, Debug)]
struct SvgCounts {
    circles: usize,
    paths: usize,
    group_ids: Vec<String>,
}

fn count_elements(svg: &str) -> SvgCounts {
    let mut reader = Reader::from_str(svg);
    let mut counts = SvgCounts::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"circle" => counts.circles += 1,
                b"path" => counts.paths += 1,
                b"g" => {
                    if let Ok(Some(attr)) = e.try_get_attribute("id") {
                        counts.group_ids.push(String::from_utf8_lossy(&attr.value).into_owned());
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => panic!("SVG is not well-formed XML: {}", e),
            _ => {}
        }
    }

    counts
}

fn assert_svg_parses(svg: &str) {
    usvg::Tree::from_str(svg, &usvg::Options::default()).expect("usvg should parse the generated SVG");
}

#[test]
fn generate_default_design_produces_svg() {
    let output = Command::new(binary_path())
        .args(["generate", "--prefix", "T"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("<?xml"), "Should have XML declaration");
    assert!(stdout.contains("</svg>"), "Should close SVG element");
    assert_svg_parses(&stdout);

    let counts = count_elements(&stdout);
    // 9 ring pins + 9 output pins + 2 discs x (9 holes + bore)
    assert_eq!(counts.circles, 9 + 9 + 2 * (9 + 1));
    assert_eq!(counts.paths, 2);
    assert_eq!(
        counts.group_ids,
        vec!["T_RingPins", "T_OutputPins", "T_Disc1", "T_Disc2_phase22.50"]
    );
}

#[test]
fn generate_with_flags_changes_the_layout() {
    let output = Command::new(binary_path())
        .args([
            "generate", "-n", "20", "--ring-radius", "60", "--pin-radius", "2.5", "-e", "1.2",
            "--out-pins", "6", "--out-radius", "35", "--out-pin-radius", "3", "--bore", "30",
            "--discs", "1", "--prefix", "P",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_svg_parses(&stdout);

    let counts = count_elements(&stdout);
    assert_eq!(counts.circles, 20 + 6 + (6 + 1));
    assert_eq!(counts.paths, 1);
    assert_eq!(counts.group_ids, vec!["P_RingPins", "P_OutputPins", "P_Disc1"]);
}

#[test]
fn generate_json_contains_geometry() {
    let output = Command::new(binary_path())
        .args(["generate", "-f", "json", "--prefix", "J"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");

    assert_eq!(json["prefix"], "J");
    assert_eq!(json["geometry"]["ring_pins"].as_array().unwrap().len(), 9);
    assert_eq!(json["geometry"]["discs"].as_array().unwrap().len(), 2);
    assert_eq!(json["reports"].as_array().unwrap().len(), 2);
    assert!(json["geometry"]["discs"][0]["profile"]["control_points"].is_array());
    assert_eq!(json["summary"]["ratio"], 8);
}

#[test]
fn default_prefix_uses_clock() {
    let output = Command::new(binary_path())
        .args(["generate", "--discs", "1"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let counts = count_elements(&stdout);
    let ring = &counts.group_ids[0];
    assert!(ring.starts_with("CY_"), "got {}", ring);
    assert!(ring.ends_with("_RingPins"));
}

#[test]
fn generate_writes_output_file() {
    let dir = scratch_dir("output");
    let path = dir.join("drive.svg");

    let output = Command::new(binary_path())
        .args(["generate", "-o", path.to_str().unwrap(), "--prefix", "F"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert!(output.stdout.is_empty(), "SVG should go to the file, not stdout");

    let svg = fs::read_to_string(&path).expect("Output file should exist");
    assert_svg_parses(&svg);
    assert_eq!(count_elements(&svg).paths, 2);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn generate_reads_config_file() {
    let dir = scratch_dir("config");
    let path = dir.join("design.yaml");
    fs::write(
        &path,
        "ring_pin_count: 10\nring_circle_radius: 40.0\nring_pin_radius: 2.5\neccentricity: 1.5\noutput_pin_count: 6\ndisc_count: 1\n",
    )
    .unwrap();

    let output = Command::new(binary_path())
        .args(["generate", path.to_str().unwrap(), "--prefix", "C"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let counts = count_elements(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(counts.circles, 10 + 6 + (6 + 1));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn example_config_round_trips_through_generate() {
    let example = Command::new(binary_path())
        .arg("example-config")
        .output()
        .expect("Failed to execute command");
    assert!(example.status.success());

    let dir = scratch_dir("example");
    let path = dir.join("example.yaml");
    fs::write(&path, &example.stdout).unwrap();

    let output = Command::new(binary_path())
        .args(["check", path.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Ratio: 8:1"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn generate_rejects_invalid_parameters() {
    let output = Command::new(binary_path())
        .args(["generate", "-e", "3.5"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "stderr: {}", stderr);
    assert!(stderr.contains("eccentricity"));
    assert!(output.stdout.is_empty());
}

#[test]
fn check_prints_summary() {
    let output = Command::new(binary_path())
        .arg("check")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("OK (Guarded)"));
    assert!(stdout.contains("Ratio: 8:1 | Lobes: 8 | Phase: 22.50°"));
}

#[test]
fn check_exits_nonzero_when_invalid() {
    for bad in [vec!["-n", "2"], vec!["--discs", "3"], vec!["--out-pins", "0"]] {
        let output = Command::new(binary_path())
            .arg("check")
            .args(&bad)
            .output()
            .expect("Failed to execute command");

        assert!(!output.status.success(), "{:?} should be rejected", bad);
        assert!(String::from_utf8_lossy(&output.stdout).contains("Invalid"));
    }
}

#[test]
fn benchmark_command_runs() {
    let output = Command::new(binary_path())
        .args(["benchmark", "-r", "1"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CYCLO-DRIVE BENCHMARK"));
    assert!(stdout.contains("Disc 1:"));
    assert!(stdout.contains("Disc 2:"));
}

#[test]
fn benchmark_rejects_unknown_options() {
    let output = Command::new(binary_path())
        .args(["benchmark", "--frobnicate"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown option: --frobnicate"));
    assert!(output.stdout.is_empty());
}

#[test]
fn layout_switches_shape_the_svg() {
    let output = Command::new(binary_path())
        .args(["generate", "--no-ring-pins", "--no-output-pins", "--same-eccentric", "--prefix", "S"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_svg_parses(&stdout);

    let counts = count_elements(&stdout);
    assert_eq!(counts.circles, 2 * (9 + 1));
    assert_eq!(counts.paths, 2);
    assert_eq!(counts.group_ids, vec!["S_Disc1", "S_Disc2_phase0.00"]);
}

#[test]
fn check_rejects_non_finite_phase() {
    let output = Command::new(binary_path())
        .args(["check", "--phase", "NaN"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Invalid"));
    assert!(stdout.contains("phase_override_deg"));
}

#[test]
fn help_command_shows_usage() {
    let output = Command::new(binary_path())
        .arg("help")
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage:"));
    assert!(stderr.contains("generate"));
    assert!(stderr.contains("--ring-pins"));
}

#[test]
fn unknown_command_fails() {
    let output = Command::new(binary_path())
        .arg("frobnicate")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown command"));
}
