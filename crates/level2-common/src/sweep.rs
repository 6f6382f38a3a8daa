//! A single elevation cut of one moment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{float_eq, NO_DATA};

/// One moment's data for one elevation cut.
///
/// Samples are stored row-major as `[azimuth][gate]`, with [`NO_DATA`]
/// where the radar reported below-threshold or range-folded gates (or
/// where a radial was shorter than the sweep's gate count).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentSweep {
    /// Elevation angle in degrees.
    pub elevation: f32,

    /// Azimuth angle of the first radial, degrees.
    pub az_first: f32,
    /// Azimuth step between radials, degrees.
    pub az_step: f32,
    /// Number of radials in the sweep.
    pub az_count: usize,

    /// Range to the center of the first gate, km.
    pub range_first: f32,
    /// Gate spacing, km.
    pub range_step: f32,
    /// Number of gates per radial.
    pub range_count: usize,

    /// Nyquist velocity in m/s, when the radial data block supplied one.
    pub nyquist_velocity: Option<f32>,

    /// Earliest radial collection time in the sweep.
    pub start_time: Option<DateTime<Utc>>,
    /// Latest radial collection time in the sweep.
    pub end_time: Option<DateTime<Utc>>,

    /// Row-major `[azimuth][gate]` physical values.
    pub data: Vec<f32>,
}

impl MomentSweep {
    /// Value at a given radial and gate, if in bounds.
    pub fn value(&self, azimuth: usize, gate: usize) -> Option<f32> {
        if azimuth >= self.az_count || gate >= self.range_count {
            return None;
        }
        Some(self.data[azimuth * self.range_count + gate])
    }

    /// Whether a gate holds a usable return.
    pub fn has_value(&self, azimuth: usize, gate: usize) -> bool {
        self.value(azimuth, gate)
            .map(|v| v != NO_DATA)
            .unwrap_or(false)
    }

    /// Elementwise comparison at a float tolerance: geometry, times, and
    /// the full sample array must all match.
    pub fn approx_eq(&self, other: &Self, tolerance: f32) -> bool {
        self.az_count == other.az_count
            && self.range_count == other.range_count
            && self.start_time == other.start_time
            && self.end_time == other.end_time
            && self.nyquist_velocity == other.nyquist_velocity
            && float_eq(self.elevation, other.elevation, tolerance)
            && float_eq(self.az_first, other.az_first, tolerance)
            && float_eq(self.az_step, other.az_step, tolerance)
            && float_eq(self.range_first, other.range_first, tolerance)
            && float_eq(self.range_step, other.range_step, tolerance)
            && self.data.len() == other.data.len()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| float_eq(*a, *b, tolerance))
    }
}
