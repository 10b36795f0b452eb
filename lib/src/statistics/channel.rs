//! Average and bounded extrema of a filtered track

use crate::config::{ExtremumBand, ExtremumPolicy};
use crate::error::AnalysisError;
use crate::track_filter::Track;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Summary of one filtered channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStatistics {
    pub average: f64,
    /// `None` only under [`ExtremumPolicy::InBandOnly`] when nothing is in band
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub samples: usize,
}

impl std::fmt::Display for ChannelStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |v: Option<f64>| match v {
            Some(v) => format!("{:.1}", v),
            None => "-".to_string(),
        };
        write!(
            f,
            "avg={:.1} Hz, low={}, high={}, samples={}",
            self.average,
            show(self.low),
            show(self.high),
            self.samples
        )
    }
}

impl ChannelStatistics {
    /// Compute average, low and high of `track`.
    ///
    /// Fails with [`AnalysisError::EmptyInput`] when the track is empty.
    pub fn from_track(track: &Track, band: &ExtremumBand, policy: ExtremumPolicy) -> Result<Self> {
        Ok(Self {
            average: track.average()?,
            low: track.low(band, policy),
            high: track.high(band, policy),
            samples: track.len(),
        })
    }
}

/// Statistics over a track's values
pub trait TrackStatistics {
    /// Arithmetic mean of the values
    fn average(&self) -> Result<f64>;

    /// Lowest value above `band.floor`
    fn low(&self, band: &ExtremumBand, policy: ExtremumPolicy) -> Option<f64>;

    /// Highest value below `band.ceiling`
    fn high(&self, band: &ExtremumBand, policy: ExtremumPolicy) -> Option<f64>;
}

impl TrackStatistics for Track {
    fn average(&self) -> Result<f64> {
        super::descriptive::mean(&self.values)
            .ok_or_else(|| AnalysisError::empty(format!("{} average", self.channel)))
    }

    /// Under [`ExtremumPolicy::SeedFallback`] the scan starts from the first
    /// value and only replaces it with a lower value above the floor, so a
    /// track with nothing above the floor reports its first value.
    fn low(&self, band: &ExtremumBand, policy: ExtremumPolicy) -> Option<f64> {
        match policy {
            ExtremumPolicy::SeedFallback => {
                let seed = *self.values.first()?;
                Some(
                    self.values
                        .iter()
                        .fold(seed, |low, &v| if v > band.floor && v < low { v } else { low }),
                )
            }
            ExtremumPolicy::InBandOnly => self
                .values
                .iter()
                .copied()
                .filter(|&v| band.contains(v))
                .reduce(f64::min),
        }
    }

    fn high(&self, band: &ExtremumBand, policy: ExtremumPolicy) -> Option<f64> {
        match policy {
            ExtremumPolicy::SeedFallback => {
                let seed = *self.values.first()?;
                Some(
                    self.values
                        .iter()
                        .fold(seed, |high, &v| if v < band.ceiling && v > high { v } else { high }),
                )
            }
            ExtremumPolicy::InBandOnly => self
                .values
                .iter()
                .copied()
                .filter(|&v| band.contains(v))
                .reduce(f64::max),
        }
    }
}
