//! Filtered per-channel tracks

use crate::channel::Channel;
use serde::{Deserialize, Serialize};

/// Accepted `(time, value)` pairs of one channel, ascending in time.
///
/// Stored as two parallel sequences, which is also the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub channel: Channel,
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl Track {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            times: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, time: f64, value: f64) {
        self.times.push(time);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(time, value)` pairs
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    pub fn first(&self) -> Option<(f64, f64)> {
        self.points().next()
    }

    pub fn last_time(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Covered time span in seconds (0 for fewer than two points)
    pub fn span(&self) -> f64 {
        match (self.times.first(), self.times.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_points() {
        let mut track = Track::new(Channel::F1);
        assert!(track.is_empty());
        assert_eq!(track.first(), None);
        assert_eq!(track.span(), 0.0);

        track.push(0.0, 500.0);
        track.push(0.25, 510.0);
        assert_eq!(track.len(), 2);
        assert_eq!(track.first(), Some((0.0, 500.0)));
        assert_eq!(track.last_time(), Some(0.25));
        assert_eq!(track.span(), 0.25);

        let points: Vec<_> = track.points().collect();
        assert_eq!(points, vec![(0.0, 500.0), (0.25, 510.0)]);
    }

    #[test]
    fn test_track_serializes_as_parallel_arrays() {
        let mut track = Track::new(Channel::F0);
        track.push(0.1, 120.0);
        let json = serde_json::to_string(&track).unwrap();
        assert_eq!(json, r#"{"channel":"f0","times":[0.1],"values":[120.0]}"#);
    }
}
