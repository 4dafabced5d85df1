//! Output geometry for the drawing host.
//!
//! Everything here is already in world coordinates (ring center at the
//! origin), so a host only has to draw circles and one spline per disc.

use serde::Serialize;

use crate::fit::FittedCurve;
use crate::geometry::{Circle, Point};

/// One placed disc.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscGeometry {
    /// 1 or 2.
    pub index: u8,
    /// Disc center: (E, 0) for disc 1; (-E, 0) for disc 2 on the opposed eccentric.
    pub center: Point,
    /// Profile rotation around `center`, radians.
    pub phase: f64,
    pub profile: FittedCurve,
    /// Output-pin holes.
    pub holes: Vec<Circle>,
    pub bore: Circle,
}

impl DiscGeometry {
    /// Hole centers relative to the disc center.
    pub fn local_hole_centers(&self) -> impl Iterator<Item = Point> + '_ {
        self.holes
            .iter()
            .map(|h| h.center.translated(-self.center.x, -self.center.y))
    }
}

/// Everything one generation produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geometry {
    pub ring_pins: Vec<Circle>,
    pub output_pins: Vec<Circle>,
    pub discs: Vec<DiscGeometry>,
}

impl Geometry {
    /// Total number of circles a host will draw (pins, holes and bores).
    pub fn circle_count(&self) -> usize {
        self.ring_pins.len()
            + self.output_pins.len()
            + self.discs.iter().map(|d| d.holes.len() + 1).sum::<usize>()
    }
}

/// Bundle the finished parts. No computation happens here.
pub fn assemble(ring_pins: Vec<Circle>, output_pins: Vec<Circle>, discs: Vec<DiscGeometry>) -> Geometry {
    Geometry { ring_pins, output_pins, discs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::{fit, FitConfig};
    use crate::pins::layout;
    use crate::sampler::CurveSample;

    fn tiny_disc(index: u8, center: Point) -> DiscGeometry {
        let mut pts: Vec<Point> = (0..32)
            .map(|i| Point::polar(5.0, std::f64::consts::TAU * i as f64 / 32.0))
            .collect();
        pts.push(pts[0]);
        let profile = fit(&CurveSample::from_closed_points(pts), &FitConfig::default()).value;
        DiscGeometry {
            index,
            center,
            phase: 0.0,
            profile: profile.translated(center.x, center.y),
            holes: layout(2.0, 3, 0.5, 0.0)
                .into_iter()
                .map(|c| c.translated(center.x, center.y))
                .collect(),
            bore: Circle::new(center, 0.5),
        }
    }

    #[test]
    fn assemble_keeps_parts_in_order() {
        let ring = layout(10.0, 9, 1.0, 0.0);
        let output = layout(3.0, 3, 0.3, 0.0);
        let discs = vec![tiny_disc(1, Point::new(0.5, 0.0)), tiny_disc(2, Point::new(-0.5, 0.0))];

        let geometry = assemble(ring.clone(), output.clone(), discs);
        assert_eq!(geometry.ring_pins, ring);
        assert_eq!(geometry.output_pins, output);
        assert_eq!(geometry.discs[0].index, 1);
        assert_eq!(geometry.discs[1].index, 2);
        assert_eq!(geometry.circle_count(), 9 + 3 + 2 * (3 + 1));
    }

    #[test]
    fn local_hole_centers_undo_placement() {
        let disc = tiny_disc(1, Point::new(1.25, 0.0));
        let local: Vec<Point> = disc.local_hole_centers().collect();
        assert!((local[0].x - 2.0).abs() < 1e-12);
        assert!(local[0].y.abs() < 1e-12);
    }

    #[test]
    fn geometry_serializes() {
        let geometry = assemble(layout(10.0, 3, 1.0, 0.0), Vec::new(), vec![tiny_disc(1, Point::new(0.0, 0.0))]);
        let json = serde_json::to_value(&geometry).unwrap();
        assert_eq!(json["ring_pins"].as_array().unwrap().len(), 3);
        assert!(json["discs"][0]["profile"]["control_points"].is_array());
    }
}
