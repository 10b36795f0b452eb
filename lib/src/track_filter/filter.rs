//! Track filter driver
//!
//! Runs one [`ChannelGate`] per channel over a frame sequence. Gates are
//! created fresh for every call, so repeated runs over the same frames
//! with the same configuration produce identical tracks.

use super::gate::{ChannelGate, GateDecision, Rejection};
use super::track::Track;
use crate::channel::{Channel, PerChannel};
use crate::config::{AgreementGate, FilterConfig};
use crate::frames::Frame;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Accepted and rejected sample counts of one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionCounts {
    pub accepted: usize,
    pub silent: usize,
    pub out_of_band: usize,
    pub discontinuous: usize,
    pub too_fast: usize,
    pub too_dense: usize,
    pub out_of_order: usize,
    pub disagreement: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, decision: GateDecision) {
        match decision {
            GateDecision::Accept => self.accepted += 1,
            GateDecision::Reject(reason) => match reason {
                Rejection::Silent => self.silent += 1,
                Rejection::OutOfBand => self.out_of_band += 1,
                Rejection::Discontinuous => self.discontinuous += 1,
                Rejection::TooFast => self.too_fast += 1,
                Rejection::TooDense => self.too_dense += 1,
                Rejection::OutOfOrder => self.out_of_order += 1,
                Rejection::Disagreement => self.disagreement += 1,
            },
        }
    }

    pub fn rejected(&self) -> usize {
        self.silent
            + self.out_of_band
            + self.discontinuous
            + self.too_fast
            + self.too_dense
            + self.out_of_order
            + self.disagreement
    }

    pub fn total(&self) -> usize {
        self.accepted + self.rejected()
    }
}

/// Per-channel bookkeeping of one filter run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterReport {
    /// Whether the agreement gate synchronized the channels
    pub synchronized: bool,
    /// Number of input frames
    pub frames: usize,
    pub channels: PerChannel<RejectionCounts>,
}

/// Cleaned tracks plus the run's bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutput {
    pub tracks: PerChannel<Track>,
    pub report: FilterReport,
}

/// Frame sequence to per-channel track filter
#[derive(Debug, Clone)]
pub struct TrackFilter {
    config: FilterConfig,
}

impl TrackFilter {
    /// Create a filter, validating the configuration
    pub fn new(config: FilterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Filter every channel of `frames`
    pub fn filter(&self, frames: &[Frame]) -> FilterOutput {
        let output = match self.config.agreement {
            Some(agreement) => self.filter_synchronized(frames, agreement),
            None => self.filter_independent(frames),
        };

        for (channel, track) in output.tracks.iter() {
            let counts = output.report.channels.get(channel);
            log::info!(
                "{} track: kept {} of {} samples ({} silent, {} out of band, {} discontinuous)",
                channel,
                track.len(),
                counts.total(),
                counts.silent,
                counts.out_of_band,
                counts.discontinuous + counts.too_fast
            );
            if track.is_empty() {
                log::warn!("{} track is empty after filtering", channel);
            }
        }

        output
    }

    /// Filter one channel on its own, ignoring every other channel
    pub fn filter_channel(&self, channel: Channel, frames: &[Frame]) -> (Track, RejectionCounts) {
        let mut gate = ChannelGate::from_config(channel, &self.config);
        let mut track = Track::new(channel);
        let mut counts = RejectionCounts::default();

        for frame in frames {
            let value = frame.value(channel);
            let decision = gate.offer(frame.time, value);
            if decision.is_accept() {
                track.push(frame.time, value);
            } else {
                log::debug!("{} at {:.3}s: {:?} ({})", channel, frame.time, decision, value);
            }
            counts.record(decision);
        }

        (track, counts)
    }

    fn filter_independent(&self, frames: &[Frame]) -> FilterOutput {
        let results = PerChannel::from_fn(|channel| self.filter_channel(channel, frames));

        FilterOutput {
            tracks: results.map(|_, (track, _)| track.clone()),
            report: FilterReport {
                synchronized: false,
                frames: frames.len(),
                channels: results.map(|_, (_, counts)| *counts),
            },
        }
    }

    /// Frame-wise filtering: a frame survives when F0 passes its own gate
    /// and at least `min_formants` formants pass theirs. Every channel that
    /// passed is then appended at the frame time and re-anchored.
    fn filter_synchronized(&self, frames: &[Frame], agreement: AgreementGate) -> FilterOutput {
        let mut gates = PerChannel::from_fn(|channel| ChannelGate::from_config(channel, &self.config));
        let mut tracks = PerChannel::from_fn(Track::new);
        let mut counts: PerChannel<RejectionCounts> = PerChannel::default();

        for frame in frames {
            let decisions =
                PerChannel::from_fn(|channel| gates.get(channel).evaluate(frame.time, frame.value(channel)));

            let agreeing = Channel::formants()
                .iter()
                .filter(|&&channel| decisions.get(channel).is_accept())
                .count();
            let frame_ok = decisions.f0.is_accept() && agreeing >= agreement.min_formants;

            for &channel in Channel::all() {
                let decision = match *decisions.get(channel) {
                    GateDecision::Accept if frame_ok => {
                        let value = frame.value(channel);
                        gates.get_mut(channel).accept(frame.time, value);
                        tracks.get_mut(channel).push(frame.time, value);
                        GateDecision::Accept
                    }
                    GateDecision::Accept => GateDecision::Reject(Rejection::Disagreement),
                    GateDecision::Reject(reason) => {
                        gates.get_mut(channel).reject(reason);
                        GateDecision::Reject(reason)
                    }
                };
                counts.get_mut(channel).record(decision);
            }

            if !frame_ok {
                log::debug!(
                    "Frame at {:.3}s dropped: F0 {:?}, {} of 4 formants agreeing",
                    frame.time,
                    decisions.f0,
                    agreeing
                );
            }
        }

        FilterOutput {
            tracks,
            report: FilterReport {
                synchronized: true,
                frames: frames.len(),
                channels: counts,
            },
        }
    }
}
