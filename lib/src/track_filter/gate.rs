//! Per-channel plausibility and continuity gate

use crate::channel::Channel;
use crate::config::{semitone_distance, ChannelSettings, FilterConfig, ResetPolicy};
use serde::{Deserialize, Serialize};

/// Continuity anchor of one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnchorState {
    /// No accepted sample yet (or the anchor was reset)
    Uninitialized,
    /// Last accepted sample
    Tracking { value: f64, time: f64 },
}

/// Why a sample was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// Zero, negative or non-finite: the provider did not detect the channel
    Silent,
    /// Outside the plausibility band
    OutOfBand,
    /// Change from the anchor reaches the continuity threshold
    Discontinuous,
    /// Change from the anchor is faster than the rate gate allows
    TooFast,
    /// Closer to the last accepted sample than the minimum spacing
    TooDense,
    /// Not later than the last accepted sample
    OutOfOrder,
    /// F0 passed but too few formants agreed
    Disagreement,
}

impl Rejection {
    /// Whether this rejection means the sample itself was bad
    pub fn is_implausible(&self) -> bool {
        matches!(
            self,
            Rejection::OutOfBand | Rejection::Discontinuous | Rejection::TooFast
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Accept,
    Reject(Rejection),
}

impl GateDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, GateDecision::Accept)
    }
}

/// Gating state machine for one channel during one run.
///
/// The first plausible sample is accepted without a continuity check and
/// becomes the anchor. Afterwards a sample must lie in the plausibility
/// band and stay within the continuity threshold (and rate gate, when set)
/// of the anchor. Under [`ResetPolicy::Strict`] an implausible sample drops
/// the anchor; under [`ResetPolicy::Lenient`] the anchor is kept.
#[derive(Debug, Clone)]
pub struct ChannelGate {
    channel: Channel,
    settings: ChannelSettings,
    reset_policy: ResetPolicy,
    min_spacing: Option<f64>,
    state: AnchorState,
    last_accepted: Option<f64>,
}

impl ChannelGate {
    pub fn new(
        channel: Channel,
        settings: ChannelSettings,
        reset_policy: ResetPolicy,
        min_spacing: Option<f64>,
    ) -> Self {
        Self {
            channel,
            settings,
            reset_policy,
            min_spacing,
            state: AnchorState::Uninitialized,
            last_accepted: None,
        }
    }

    /// Fresh gate for `channel` configured from `config`
    pub fn from_config(channel: Channel, config: &FilterConfig) -> Self {
        Self::new(
            channel,
            *config.channel(channel),
            config.reset_policy,
            config.min_spacing,
        )
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn state(&self) -> AnchorState {
        self.state
    }

    /// Decide on a sample without changing any state
    pub fn evaluate(&self, time: f64, value: f64) -> GateDecision {
        if !value.is_finite() || value <= 0.0 {
            return GateDecision::Reject(Rejection::Silent);
        }

        if let Some(last) = self.last_accepted {
            if time <= last {
                return GateDecision::Reject(Rejection::OutOfOrder);
            }
            if let Some(spacing) = self.min_spacing {
                if time - last <= spacing {
                    return GateDecision::Reject(Rejection::TooDense);
                }
            }
        }

        if !self.settings.plausibility.contains(value) {
            return GateDecision::Reject(Rejection::OutOfBand);
        }

        match self.state {
            AnchorState::Uninitialized => GateDecision::Accept,
            AnchorState::Tracking {
                value: previous,
                time: previous_time,
            } => {
                if !self.settings.continuity.allows(previous, value) {
                    return GateDecision::Reject(Rejection::Discontinuous);
                }

                if let Some(max_rate) = self.settings.max_rate_semitones_per_second {
                    let dt = time - previous_time;
                    if dt > 0.0 && semitone_distance(previous, value) / dt > max_rate {
                        return GateDecision::Reject(Rejection::TooFast);
                    }
                }

                GateDecision::Accept
            }
        }
    }

    /// Make `(time, value)` the new anchor
    pub fn accept(&mut self, time: f64, value: f64) {
        self.state = AnchorState::Tracking { value, time };
        self.last_accepted = Some(time);
    }

    /// Apply the reset policy for a dropped sample
    pub fn reject(&mut self, reason: Rejection) {
        if self.reset_policy == ResetPolicy::Strict && reason.is_implausible() {
            log::debug!("{} anchor reset after {:?}", self.channel, reason);
            self.state = AnchorState::Uninitialized;
        }
    }

    /// Evaluate a sample and update the anchor accordingly
    pub fn offer(&mut self, time: f64, value: f64) -> GateDecision {
        let decision = self.evaluate(time, value);
        match decision {
            GateDecision::Accept => self.accept(time, value),
            GateDecision::Reject(reason) => self.reject(reason),
        }
        decision
    }
}
