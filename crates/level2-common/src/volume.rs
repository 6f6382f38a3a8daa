//! An assembled radar volume.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Moment, MomentSweep, DEFAULT_TOLERANCE};

/// One complete (or partially assembled) rotation through all elevation
/// cuts, organized per moment.
///
/// Sweep order is elevation scan order as transmitted, not sorted by
/// angle: VCPs revisit low elevations, and consumers that care about the
/// scan sequence need the original order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Level2Volume {
    /// ICAO site identifier, when a volume header was present.
    pub site: Option<String>,
    /// Volume coverage pattern number, when a volume data block was seen.
    pub coverage_pattern: Option<u16>,
    sweeps: BTreeMap<Moment, Vec<MomentSweep>>,
}

impl Level2Volume {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moments present in the volume.
    pub fn moments(&self) -> impl Iterator<Item = &Moment> {
        self.sweeps.keys()
    }

    /// Completed sweeps for a moment, in transmission order.
    pub fn sweeps(&self, moment: &Moment) -> &[MomentSweep] {
        self.sweeps.get(moment).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append a completed sweep for a moment.
    pub fn push_sweep(&mut self, moment: Moment, sweep: MomentSweep) {
        self.sweeps.entry(moment).or_default().push(sweep);
    }

    pub fn is_empty(&self) -> bool {
        self.sweeps.is_empty()
    }

    /// Total number of sweeps across all moments.
    pub fn sweep_count(&self) -> usize {
        self.sweeps.values().map(Vec::len).sum()
    }

    /// Volume equality per the reconstruction contract: every moment's
    /// sweep sequence must be elementwise equal at the given tolerance.
    pub fn approx_eq(&self, other: &Self, tolerance: f32) -> bool {
        if self.sweeps.len() != other.sweeps.len() {
            return false;
        }
        self.sweeps.iter().all(|(moment, sweeps)| {
            let theirs = other.sweeps(moment);
            sweeps.len() == theirs.len()
                && sweeps
                    .iter()
                    .zip(theirs.iter())
                    .all(|(a, b)| a.approx_eq(b, tolerance))
        })
    }

    /// [`Self::approx_eq`] at the default tolerance.
    pub fn equivalent(&self, other: &Self) -> bool {
        self.approx_eq(other, DEFAULT_TOLERANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep(elevation: f32) -> MomentSweep {
        MomentSweep {
            elevation,
            az_first: 0.0,
            az_step: 1.0,
            az_count: 1,
            range_first: 2.125,
            range_step: 0.25,
            range_count: 2,
            nyquist_velocity: None,
            start_time: None,
            end_time: None,
            data: vec![1.0, 2.0],
        }
    }

    #[test]
    fn sweeps_keep_transmission_order() {
        let mut volume = Level2Volume::new();
        for elevation in [0.5, 0.5, 1.5, 0.9] {
            volume.push_sweep(Moment::Reflectivity, sweep(elevation));
        }
        let elevations: Vec<f32> = volume
            .sweeps(&Moment::Reflectivity)
            .iter()
            .map(|s| s.elevation)
            .collect();
        assert_eq!(elevations, vec![0.5, 0.5, 1.5, 0.9]);
    }

    #[test]
    fn equality_requires_same_moments() {
        let mut a = Level2Volume::new();
        a.push_sweep(Moment::Reflectivity, sweep(0.5));
        let mut b = a.clone();
        assert!(a.equivalent(&b));
        b.push_sweep(Moment::Velocity, sweep(0.5));
        assert!(!a.equivalent(&b));
    }

    #[test]
    fn missing_moment_has_no_sweeps() {
        let volume = Level2Volume::new();
        assert!(volume.sweeps(&Moment::Velocity).is_empty());
        assert!(volume.is_empty());
    }
}
