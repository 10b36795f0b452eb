//! Frame assembly
//!
//! Zips the per-instant pitch and formant samples into ordered frames. A
//! time step becomes a frame only when all five channels are finite.

use crate::channel::{Channel, PerChannel};
use crate::config::Precision;
use crate::error::AnalysisError;
use crate::provider::{time_grid, AcousticProvider};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Pitch and formant values measured at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Time in seconds
    pub time: f64,
    /// F0..F4 in Hz, indexed by [`Channel::index`]
    pub values: [f64; 5],
}

impl Frame {
    pub fn new(time: f64, values: [f64; 5]) -> Self {
        Self { time, values }
    }

    pub fn value(&self, channel: Channel) -> f64 {
        self.values[channel.index()]
    }
}

/// Build frames by querying `provider` every `time_step` seconds over `[0, duration)`
pub fn assemble_frames<P: AcousticProvider + ?Sized>(
    provider: &P,
    time_step: f64,
    precision: Precision,
) -> Result<Vec<Frame>> {
    let times = time_grid(provider.duration(), time_step)?;
    let streams = PerChannel::from_fn(|channel| {
        times
            .iter()
            .map(|&t| provider.channel_value(channel, t))
            .collect::<Vec<f64>>()
    });

    assemble_from_streams(
        &times,
        [
            &streams.f0,
            &streams.f1,
            &streams.f2,
            &streams.f3,
            &streams.f4,
        ],
        precision,
    )
}

/// Build frames from parallel F0..F4 streams sampled at `times`.
///
/// Frames with any non-finite channel are dropped; surviving values are
/// rounded with `precision`. The output keeps the input time order.
pub fn assemble_from_streams(
    times: &[f64],
    channels: [&[f64]; 5],
    precision: Precision,
) -> Result<Vec<Frame>> {
    for (channel, stream) in Channel::all().iter().zip(channels.iter()) {
        if stream.len() != times.len() {
            return Err(AnalysisError::config(format!(
                "{} stream has {} samples but the time grid has {}",
                channel,
                stream.len(),
                times.len()
            )));
        }
    }

    let mut frames = Vec::with_capacity(times.len());
    for (i, &time) in times.iter().enumerate() {
        let raw = [
            channels[0][i],
            channels[1][i],
            channels[2][i],
            channels[3][i],
            channels[4][i],
        ];
        if raw.iter().any(|v| !v.is_finite()) {
            continue;
        }
        frames.push(Frame::new(time, raw.map(|v| precision.apply(v))));
    }

    log::info!(
        "Assembled {} complete frames out of {} time steps",
        frames.len(),
        times.len()
    );
    if frames.is_empty() && !times.is_empty() {
        log::warn!("No time step had all five channels detected");
    }

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MeasurementTable;

    #[test]
    fn test_partial_frames_are_dropped() {
        let times = [0.0, 0.01, 0.02, 0.03];
        let f0 = [120.0, f64::NAN, 122.0, 123.0];
        let f1 = [500.0, 501.0, 502.0, 503.0];
        let f2 = [1500.0, 1501.0, 1502.0, 1503.0];
        let f3 = [2500.0, 2501.0, f64::INFINITY, 2503.0];
        let f4 = [3500.0, 3501.0, 3502.0, 3503.0];

        let frames =
            assemble_from_streams(&times, [&f0, &f1, &f2, &f3, &f4], Precision::WholeHz).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].time, 0.0);
        assert_eq!(frames[1].time, 0.03);
        assert_eq!(frames[1].value(Channel::F4), 3503.0);
    }

    #[test]
    fn test_zero_values_are_kept_for_the_filter() {
        let times = [0.0];
        let frames = assemble_from_streams(
            &times,
            [&[0.0], &[500.0], &[1500.0], &[2500.0], &[3500.0]],
            Precision::default(),
        )
        .unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].value(Channel::F0), 0.0);
    }

    #[test]
    fn test_rounding_precision() {
        let times = [0.0];
        let streams: [&[f64]; 5] = [
            &[120.4567891],
            &[500.5],
            &[1500.123456],
            &[2500.0],
            &[3500.0],
        ];

        let whole = assemble_from_streams(&times, streams, Precision::WholeHz).unwrap();
        assert_eq!(whole[0].values, [120.0, 501.0, 1500.0, 2500.0, 3500.0]);

        let fine = assemble_from_streams(&times, streams, Precision::Decimals(5)).unwrap();
        assert!((fine[0].value(Channel::F0) - 120.45679).abs() < 1e-9);
        assert!((fine[0].value(Channel::F2) - 1500.12346).abs() < 1e-9);
    }

    #[test]
    fn test_mismatched_lengths() {
        let result = assemble_from_streams(
            &[0.0, 0.01],
            [&[1.0, 2.0], &[1.0], &[1.0, 2.0], &[1.0, 2.0], &[1.0, 2.0]],
            Precision::WholeHz,
        );
        assert!(matches!(result, Err(AnalysisError::Configuration(_))));
    }

    #[test]
    fn test_empty_input_gives_empty_frames() {
        let empty: [&[f64]; 5] = [&[], &[], &[], &[], &[]];
        let frames = assemble_from_streams(&[], empty, Precision::WholeHz).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn test_assemble_from_provider() {
        let table = MeasurementTable::new(
            0.01,
            vec![120.0, 121.0, f64::NAN, 123.0],
            [
                vec![500.0; 4],
                vec![1500.0; 4],
                vec![2500.0; 4],
                vec![3500.0, 3500.0, 3500.0, f64::NAN],
            ],
        );

        let frames = assemble_frames(&table, 0.01, Precision::WholeHz).unwrap();
        let times: Vec<f64> = frames.iter().map(|f| f.time).collect();
        assert_eq!(times, vec![0.0, 0.01]);
        assert!(frames.windows(2).all(|w| w[0].time < w[1].time));
    }
}
