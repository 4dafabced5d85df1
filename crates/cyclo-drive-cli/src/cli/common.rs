//! Common utilities shared across CLI commands.

use serde::Serialize;

use cyclo_drive::{
    Circle, DesignSummary, FittedCurve, Generation, Geometry, NumericalInstabilityWarning, Point, ProfileReport,
};

/// Output format for generated geometry.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum OutputFormat {
    Svg,
    Json,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "svg" => Some(OutputFormat::Svg),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Margin around the ring pins in the SVG viewBox (mm).
const VIEW_MARGIN: f64 = 5.0;

/// Group name prefix from the local clock, e.g. `CY_142530`.
pub fn default_prefix() -> String {
    format!("CY_{}", chrono::Local::now().format("%H%M%S"))
}

/// SVG y grows downward; flip so the drawing matches the math orientation.
fn fmt_point(p: Point) -> String {
    format!("{:.4},{:.4}", p.x, -p.y)
}

fn circle_element(circle: &Circle) -> String {
    format!(
        "    <circle cx=\"{:.4}\" cy=\"{:.4}\" r=\"{:.4}\"/>\n",
        circle.center.x, -circle.center.y, circle.radius
    )
}

/// One closed path of cubic segments: `M p0 C c1 c2 p1 ... Z`.
fn spline_path_data(curve: &FittedCurve) -> String {
    let Some(start) = curve.start() else {
        return String::new();
    };

    let mut d = format!("M{}", fmt_point(start));
    for seg in curve.segments() {
        d.push_str(&format!(
            " C{} {} {}",
            fmt_point(seg.ctrl1.into()),
            fmt_point(seg.ctrl2.into()),
            fmt_point(seg.to.into())
        ));
    }
    d.push_str(" Z");
    d
}

/// Largest distance from the origin to anything drawn.
fn drawing_extent(geometry: &Geometry) -> f64 {
    let circles = geometry
        .ring_pins
        .iter()
        .chain(&geometry.output_pins)
        .chain(geometry.discs.iter().flat_map(|d| d.holes.iter().chain(std::iter::once(&d.bore))));
    let circle_extent = circles.map(|c| c.center.norm() + c.radius).fold(0.0, f64::max);

    geometry
        .discs
        .iter()
        .flat_map(|d| d.profile.control_points())
        .map(|p| p.norm())
        .fold(circle_extent, f64::max)
}

/// One `<g>` of pins; skipped when the pins were left out.
fn pin_group(svg: &mut String, id: &str, color: &str, pins: &[Circle]) {
    if pins.is_empty() {
        return;
    }
    svg.push_str(&format!(
        "<g id=\"{}\" stroke=\"{}\" stroke-width=\"0.2\" fill=\"none\">\n",
        id, color
    ));
    for pin in pins {
        svg.push_str(&circle_element(pin));
    }
    svg.push_str("</g>\n");
}

/// Render the geometry as SVG, one `<g>` per sketch.
///
/// Group ids: `{prefix}_RingPins`, `{prefix}_OutputPins`, `{prefix}_Disc1` and
/// `{prefix}_Disc2_phase{deg}`. Units are millimetres.
pub fn geometry_to_svg(generation: &Generation, prefix: &str) -> String {
    let geometry: &Geometry = &generation.geometry;

    let extent = drawing_extent(geometry) + VIEW_MARGIN;
    let size = 2.0 * extent;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{size:.2}mm" height="{size:.2}mm" viewBox="{min:.2} {min:.2} {size:.2} {size:.2}">
"#,
        size = size,
        min = -extent
    ));

    pin_group(&mut svg, &format!("{}_RingPins", prefix), "black", &geometry.ring_pins);
    pin_group(&mut svg, &format!("{}_OutputPins", prefix), "gray", &geometry.output_pins);

    for disc in &geometry.discs {
        let id = if disc.index == 1 {
            format!("{}_Disc1", prefix)
        } else {
            format!("{}_Disc{}_phase{:.2}", prefix, disc.index, disc.phase.to_degrees())
        };
        let color = if disc.index == 1 { "#1f77b4" } else { "#d62728" };

        svg.push_str(&format!(
            "<g id=\"{}\" stroke=\"{}\" stroke-width=\"0.2\" fill=\"none\">\n",
            id, color
        ));
        svg.push_str(&format!("    <path d=\"{}\"/>\n", spline_path_data(&disc.profile)));
        for hole in &disc.holes {
            svg.push_str(&circle_element(hole));
        }
        svg.push_str(&circle_element(&disc.bore));
        svg.push_str("</g>\n");
    }

    svg.push_str("</svg>\n");
    svg
}

/// JSON document written by `generate -f json`.
#[derive(Serialize)]
pub struct JsonOutput<'a> {
    pub prefix: &'a str,
    pub summary: &'a DesignSummary,
    pub reports: &'a [ProfileReport],
    pub warnings: &'a [NumericalInstabilityWarning],
    pub geometry: &'a Geometry,
}

pub fn generation_to_json(generation: &Generation, prefix: &str) -> Result<String, String> {
    let output = JsonOutput {
        prefix,
        summary: &generation.summary,
        reports: &generation.reports,
        warnings: &generation.warnings,
        geometry: &generation.geometry,
    };
    serde_json::to_string_pretty(&output).map_err(|e| format!("Failed to serialize JSON: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclo_drive::{generate, Parameters};

    #[test]
    fn svg_has_one_group_per_sketch() {
        let generation = generate(&Parameters::default()).unwrap();
        let svg = geometry_to_svg(&generation, "T");

        assert!(svg.contains("id=\"T_RingPins\""));
        assert!(svg.contains("id=\"T_OutputPins\""));
        assert!(svg.contains("id=\"T_Disc1\""));
        assert!(svg.contains("id=\"T_Disc2_phase22.50\""));
        assert_eq!(svg.matches("<path").count(), 2);
        assert_eq!(svg.matches("<circle").count(), 9 + 9 + 2 * (9 + 1));
    }

    #[test]
    fn svg_skips_pins_left_out() {
        let params = Parameters { draw_ring_pins: false, draw_output_pins: false, ..Parameters::default() };
        let generation = generate(&params).unwrap();
        let svg = geometry_to_svg(&generation, "T");

        assert!(!svg.contains("T_RingPins"));
        assert!(!svg.contains("T_OutputPins"));
        assert_eq!(svg.matches("<circle").count(), 2 * (9 + 1));
        // Disc 1 outer radius plus its offset still fits the view
        assert!(drawing_extent(&generation.geometry) > 38.0);
    }

    #[test]
    fn path_is_closed_cubic() {
        let generation = generate(&Parameters { disc_count: 1, ..Parameters::default() }).unwrap();
        let d = spline_path_data(&generation.geometry.discs[0].profile);
        assert!(d.starts_with('M'));
        assert!(d.ends_with(" Z"));
        assert_eq!(d.matches(" C").count(), generation.geometry.discs[0].profile.segment_count());
    }

    #[test]
    fn default_prefix_shape() {
        let prefix = default_prefix();
        assert!(prefix.starts_with("CY_"));
        assert_eq!(prefix.len(), 9);
        assert!(prefix[3..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn json_carries_geometry() {
        let generation = generate(&Parameters::default()).unwrap();
        let json = generation_to_json(&generation, "T").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["geometry"]["discs"].as_array().unwrap().len(), 2);
        assert_eq!(value["summary"]["ratio"], 8);
    }

    #[test]
    fn format_names() {
        assert_eq!(OutputFormat::from_name("svg"), Some(OutputFormat::Svg));
        assert_eq!(OutputFormat::from_name("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_name("dxf"), None);
    }
}
