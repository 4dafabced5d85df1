//! Pin layout: evenly spaced circles on a pitch circle.
//!
//! Ring pins, output pins and the holes in each disc all come from here with
//! different counts, radii and phase offsets.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::geometry::{Circle, Point};

/// A set of equal pins on a circle around the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinCircle {
    /// Pitch circle radius.
    pub radius: f64,
    pub pin_count: u32,
    pub pin_radius: f64,
}

impl PinCircle {
    pub fn new(radius: f64, pin_count: u32, pin_radius: f64) -> Self {
        Self { radius, pin_count, pin_radius }
    }

    /// Angle between neighbouring pins.
    pub fn pitch_angle(&self) -> f64 {
        TAU / self.pin_count.max(1) as f64
    }

    /// Pin centers in index order. Index 0 sits at `phase_offset`.
    pub fn centers(&self, phase_offset: f64) -> impl Iterator<Item = Point> + '_ {
        let step = self.pitch_angle();
        (0..self.pin_count).map(move |i| Point::polar(self.radius, phase_offset + step * i as f64))
    }

    pub fn pins(&self, phase_offset: f64) -> Vec<Circle> {
        self.centers(phase_offset)
            .map(|center| Circle::new(center, self.pin_radius))
            .collect()
    }
}

/// Lay out `pin_count` pins of `pin_radius` on a circle of `circle_radius`,
/// at angles `2π·i / pin_count + phase_offset`.
pub fn layout(circle_radius: f64, pin_count: u32, pin_radius: f64, phase_offset: f64) -> Vec<Circle> {
    PinCircle::new(circle_radius, pin_count, pin_radius).pins(phase_offset)
}
