//! Radial/sweep assembly.
//!
//! Consumes the framed message sequence and groups radials into sweeps per
//! moment. All state lives in the [`SweepAssembler`] instance, so multiple
//! decodes can run concurrently without interference.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use level2_common::{Level2Volume, Moment, MomentSweep, NO_DATA};

use crate::error::{DecodeError, Result};
use crate::messages::{DigitalRadarData, MomentBlock, RadarMessage};

/// How to resolve two radials claiming the same azimuth index within one
/// sweep. Duplicate retransmission is a known live-feed characteristic,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Keep the radial that arrived first; ignore the retransmission.
    #[default]
    FirstWins,
    /// Let the retransmission replace the earlier radial.
    LastWins,
}

/// Assembly configuration.
#[derive(Debug, Clone, Default)]
pub struct AssemblerOptions {
    pub duplicate_policy: DuplicatePolicy,
    /// Reject unrecognized moment names instead of preserving them under
    /// their raw name.
    pub strict_moments: bool,
}

/// A sweep under construction for one moment.
struct OpenSweep {
    elevation: f32,
    az_step: f32,
    range_first: f32,
    range_step: f32,
    gate_count: usize,
    nyquist_velocity: Option<f32>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    /// Radials keyed by their transmitted azimuth number, not arrival
    /// order: realtime delivery may reorder at segment boundaries.
    radials: BTreeMap<u16, Radial>,
}

struct Radial {
    azimuth: f32,
    values: Vec<f32>,
}

impl OpenSweep {
    fn open(message: &DigitalRadarData, block: &MomentBlock, time: Option<DateTime<Utc>>) -> Self {
        Self {
            elevation: message.radial.elevation_angle,
            az_step: message.radial.azimuth_step(),
            range_first: block.first_gate_km(),
            range_step: block.gate_interval_km(),
            gate_count: usize::from(block.gate_count),
            nyquist_velocity: None,
            start_time: time,
            end_time: time,
            radials: BTreeMap::new(),
        }
    }

    fn append(
        &mut self,
        azimuth_number: u16,
        azimuth: f32,
        values: Vec<f32>,
        time: Option<DateTime<Utc>>,
        policy: DuplicatePolicy,
    ) {
        if self.radials.contains_key(&azimuth_number) {
            if policy == DuplicatePolicy::FirstWins {
                debug!(azimuth_number, "ignoring duplicate radial");
                return;
            }
            debug!(azimuth_number, "replacing duplicate radial");
        }
        self.radials.insert(azimuth_number, Radial { azimuth, values });
        // The time range tracks collection times, not arrival order:
        // reordered delivery must not skew it.
        if let Some(t) = time {
            if self.start_time.map_or(true, |s| t < s) {
                self.start_time = Some(t);
            }
            if self.end_time.map_or(true, |e| t > e) {
                self.end_time = Some(t);
            }
        }
    }

    fn into_sweep(self) -> MomentSweep {
        let az_count = self.radials.len();
        let gate_count = self.gate_count;
        let az_first = self
            .radials
            .values()
            .next()
            .map(|r| r.azimuth)
            .unwrap_or(0.0);

        let mut data = Vec::with_capacity(az_count * gate_count);
        for radial in self.radials.into_values() {
            // Shorter radials pad with the sentinel, longer ones clamp.
            let take = radial.values.len().min(gate_count);
            data.extend_from_slice(&radial.values[..take]);
            data.extend(std::iter::repeat(NO_DATA).take(gate_count - take));
        }

        MomentSweep {
            elevation: self.elevation,
            az_first,
            az_step: self.az_step,
            az_count,
            range_first: self.range_first,
            range_step: self.range_step,
            range_count: gate_count,
            nyquist_velocity: self.nyquist_velocity,
            start_time: self.start_time,
            end_time: self.end_time,
            data,
        }
    }
}

/// Groups radials into per-moment sweeps, tracking sweep boundary markers.
///
/// Per-moment state machine: `Idle -> Building -> Idle`, transitioning on
/// the radial start/end markers. A sweep that never observes its end
/// marker is incomplete and is never published.
pub struct SweepAssembler {
    options: AssemblerOptions,
    open: BTreeMap<Moment, OpenSweep>,
    volume: Level2Volume,
    volume_complete: bool,
    messages_seen: usize,
}

impl SweepAssembler {
    pub fn new(options: AssemblerOptions) -> Self {
        Self {
            options,
            open: BTreeMap::new(),
            volume: Level2Volume::new(),
            volume_complete: false,
            messages_seen: 0,
        }
    }

    /// Feed one framed message. Non-radar messages are ignored.
    pub fn process(&mut self, message: &RadarMessage) -> Result<()> {
        self.messages_seen += 1;
        match message {
            RadarMessage::DigitalRadarData(m) => self.handle_radial(m),
            RadarMessage::Other { .. } => Ok(()),
        }
    }

    /// Whether an end-of-volume radial has been observed.
    pub fn is_volume_complete(&self) -> bool {
        self.volume_complete
    }

    /// Finish assembly, dropping any sweep still under construction.
    pub fn finish(self) -> Level2Volume {
        for (moment, open) in &self.open {
            debug!(
                moment = %moment,
                radials = open.radials.len(),
                "dropping sweep without end marker"
            );
        }
        self.volume
    }

    fn handle_radial(&mut self, message: &DigitalRadarData) -> Result<()> {
        let status = message.radial.status;

        if status.starts_sweep() && !self.open.is_empty() {
            // A start marker with sweeps still open means the previous
            // cut never delivered its end marker; those sweeps are
            // incomplete and must not be published.
            for (moment, open) in std::mem::take(&mut self.open) {
                warn!(
                    moment = %moment,
                    radials = open.radials.len(),
                    "discarding unterminated sweep at cut boundary"
                );
            }
        }

        if self.volume.site.is_none() && !message.radial.icao.is_empty() {
            self.volume.site = Some(message.radial.icao.clone());
        }
        if let Some(volume_block) = &message.volume_block {
            self.volume.coverage_pattern = Some(volume_block.coverage_pattern);
        }

        let time = message
            .radial
            .date_time()
            .or_else(|| message.message_header.date_time());

        for block in &message.moments {
            let moment = Moment::from_name(&block.name);
            if self.options.strict_moments && !moment.is_known() {
                return Err(DecodeError::UnknownMoment {
                    name: block.name.clone(),
                    message: self.messages_seen - 1,
                });
            }

            // A moment first seen mid-sweep opens its sweep lazily from
            // this radial so its data is not dropped.
            let sweep = self
                .open
                .entry(moment)
                .or_insert_with(|| OpenSweep::open(message, block, time));
            if let Some(radial_block) = &message.radial_block {
                sweep
                    .nyquist_velocity
                    .get_or_insert(radial_block.nyquist_velocity);
            }
            sweep.append(
                message.radial.azimuth_number,
                message.radial.azimuth_angle,
                block.decoded_values(),
                time,
                self.options.duplicate_policy,
            );
        }

        if status.ends_sweep() {
            for (moment, open) in std::mem::take(&mut self.open) {
                let sweep = open.into_sweep();
                debug!(
                    moment = %moment,
                    elevation = sweep.elevation,
                    radials = sweep.az_count,
                    "completed sweep"
                );
                self.volume.push_sweep(moment, sweep);
            }
            if status == crate::messages::RadialStatus::EndOfVolume {
                self.volume_complete = true;
            }
        }

        Ok(())
    }
}
