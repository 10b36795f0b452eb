//! Intonation statistics over the raw pitch stream
//!
//! Voicing here is a pitch value inside `[floor, ceiling]`; the track
//! filter's plausibility bands play no part.

use super::descriptive::{hz_to_semitones, mean, ols_slope, percentile, sample_std_dev, sorted};
use crate::config::IntonationConfig;
use crate::error::AnalysisError;
use crate::provider::Stream;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Pitch level, spread and trend of one utterance.
///
/// Every float is NaN when fewer than the configured minimum of voiced
/// frames were found; see [`IntonationStatistics::is_defined`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntonationStatistics {
    #[serde(with = "crate::serde_nan")]
    pub mean_hz: f64,
    #[serde(with = "crate::serde_nan")]
    pub sd_hz: f64,
    #[serde(with = "crate::serde_nan")]
    pub sd_semitones: f64,
    #[serde(with = "crate::serde_nan")]
    pub min_hz: f64,
    #[serde(with = "crate::serde_nan")]
    pub max_hz: f64,
    #[serde(with = "crate::serde_nan")]
    pub p5_hz: f64,
    #[serde(with = "crate::serde_nan")]
    pub p95_hz: f64,
    #[serde(with = "crate::serde_nan")]
    pub range_semitones: f64,
    #[serde(with = "crate::serde_nan")]
    pub range_semitones_p5_p95: f64,
    #[serde(with = "crate::serde_nan")]
    pub slope_semitones_per_second: f64,
    #[serde(with = "crate::serde_nan")]
    pub voiced_fraction: f64,
    pub voiced_frames: usize,
    pub total_frames: usize,
}

impl IntonationStatistics {
    /// The "not computable" result
    pub fn insufficient(voiced_frames: usize, total_frames: usize) -> Self {
        Self {
            mean_hz: f64::NAN,
            sd_hz: f64::NAN,
            sd_semitones: f64::NAN,
            min_hz: f64::NAN,
            max_hz: f64::NAN,
            p5_hz: f64::NAN,
            p95_hz: f64::NAN,
            range_semitones: f64::NAN,
            range_semitones_p5_p95: f64::NAN,
            slope_semitones_per_second: f64::NAN,
            voiced_fraction: f64::NAN,
            voiced_frames,
            total_frames,
        }
    }

    /// False for the insufficient-data result
    pub fn is_defined(&self) -> bool {
        self.mean_hz.is_finite()
    }
}

/// Compute intonation statistics, failing with
/// [`AnalysisError::InsufficientData`] below the voiced-frame minimum.
pub fn try_intonation_statistics(
    pitch: &Stream,
    config: &IntonationConfig,
) -> Result<IntonationStatistics> {
    let (times, hz): (Vec<f64>, Vec<f64>) = pitch
        .times
        .iter()
        .zip(&pitch.values)
        .filter(|(_, f0)| f0.is_finite() && **f0 >= config.floor && **f0 <= config.ceiling)
        .map(|(&t, &f0)| (t, f0))
        .unzip();

    let total_frames = pitch.times.len().min(pitch.values.len());
    let voiced_frames = hz.len();
    if voiced_frames < config.min_voiced_frames.max(1) {
        return Err(AnalysisError::InsufficientData {
            what: "intonation".to_string(),
            required: config.min_voiced_frames,
            found: voiced_frames,
        });
    }

    let semitones: Vec<f64> = hz
        .iter()
        .map(|&f| hz_to_semitones(f, config.reference_hz))
        .collect();
    let ordered = sorted(&hz);

    let (min_hz, max_hz) = (ordered[0], ordered[ordered.len() - 1]);
    let p5_hz = percentile(&ordered, 5.0).unwrap_or(f64::NAN);
    let p95_hz = percentile(&ordered, 95.0).unwrap_or(f64::NAN);

    Ok(IntonationStatistics {
        mean_hz: mean(&hz).unwrap_or(f64::NAN),
        sd_hz: sample_std_dev(&hz),
        sd_semitones: sample_std_dev(&semitones),
        min_hz,
        max_hz,
        p5_hz,
        p95_hz,
        range_semitones: 12.0 * (max_hz / min_hz).log2(),
        range_semitones_p5_p95: 12.0 * (p95_hz / p5_hz).log2(),
        slope_semitones_per_second: ols_slope(&times, &semitones),
        voiced_fraction: voiced_frames as f64 / total_frames as f64,
        voiced_frames,
        total_frames,
    })
}

/// Compute intonation statistics, reporting too little voicing as the
/// all-NaN [`IntonationStatistics::insufficient`] result.
pub fn intonation_statistics(pitch: &Stream, config: &IntonationConfig) -> IntonationStatistics {
    match try_intonation_statistics(pitch, config) {
        Ok(stats) => stats,
        Err(err) => {
            log::warn!("{}", err);
            let voiced = match err {
                AnalysisError::InsufficientData { found, .. } => found,
                _ => 0,
            };
            IntonationStatistics::insufficient(voiced, pitch.times.len().min(pitch.values.len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(points: &[(f64, f64)]) -> Stream {
        Stream {
            times: points.iter().map(|p| p.0).collect(),
            values: points.iter().map(|p| p.1).collect(),
        }
    }

    #[test]
    fn test_rising_contour() {
        // one octave per second: 12 semitones per second
        let points: Vec<(f64, f64)> = (0..10)
            .map(|i| {
                let t = i as f64 * 0.1;
                (t, 110.0 * 2f64.powf(t))
            })
            .collect();

        let stats = try_intonation_statistics(&stream(&points), &IntonationConfig::default()).unwrap();
        assert!(stats.is_defined());
        assert!((stats.slope_semitones_per_second - 12.0).abs() < 1e-9);
        assert_eq!(stats.min_hz, 110.0);
        assert!((stats.max_hz - 110.0 * 2f64.powf(0.9)).abs() < 1e-9);
        assert!((stats.range_semitones - 10.8).abs() < 1e-9);
        assert_eq!(stats.voiced_fraction, 1.0);
        assert!(stats.p5_hz > stats.min_hz && stats.p5_hz < stats.p95_hz);
    }

    #[test]
    fn test_voicing_band_and_fraction() {
        let stats = try_intonation_statistics(
            &stream(&[
                (0.0, 0.0),
                (0.1, 100.0),
                (0.2, 110.0),
                (0.3, f64::NAN),
                (0.4, 120.0),
                (0.5, 130.0),
                (0.6, 900.0),
                (0.7, 140.0),
            ]),
            &IntonationConfig::default(),
        )
        .unwrap();

        assert_eq!(stats.voiced_frames, 5);
        assert_eq!(stats.total_frames, 8);
        assert!((stats.voiced_fraction - 5.0 / 8.0).abs() < 1e-12);
        assert!((stats.mean_hz - 120.0).abs() < 1e-9);
        assert!((stats.p5_hz - 102.0).abs() < 1e-9);
        assert!((stats.p95_hz - 138.0).abs() < 1e-9);
        assert!((stats.range_semitones_p5_p95 - 12.0 * (138.0f64 / 102.0).log2()).abs() < 1e-9);
        assert!((stats.sd_hz - 250f64.sqrt()).abs() < 1e-9);
        assert!(stats.sd_semitones > 0.0);
    }

    #[test]
    fn test_floor_and_ceiling_are_inclusive() {
        let config = IntonationConfig::default();
        let points: Vec<(f64, f64)> = [60.0, 500.0, 60.0, 500.0, 60.0]
            .iter()
            .enumerate()
            .map(|(i, &f)| (i as f64, f))
            .collect();
        let stats = try_intonation_statistics(&stream(&points), &config).unwrap();
        assert_eq!(stats.voiced_frames, 5);
    }

    #[test]
    fn test_insufficient_voicing() {
        let pitch = stream(&[(0.0, 120.0), (0.1, 121.0), (0.2, 0.0), (0.3, 122.0), (0.4, 123.0)]);

        let err = try_intonation_statistics(&pitch, &IntonationConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData {
                required: 5,
                found: 4,
                ..
            }
        ));

        let stats = intonation_statistics(&pitch, &IntonationConfig::default());
        assert!(!stats.is_defined());
        assert!(stats.mean_hz.is_nan());
        assert!(stats.slope_semitones_per_second.is_nan());
        assert!(stats.voiced_fraction.is_nan());
        assert_eq!(stats.voiced_frames, 4);
        assert_eq!(stats.total_frames, 5);

        let json = serde_json::to_value(stats).unwrap();
        assert!(json["mean_hz"].is_null());
    }

    #[test]
    fn test_empty_stream() {
        let stats = intonation_statistics(&Stream::default(), &IntonationConfig::default());
        assert!(!stats.is_defined());
        assert_eq!(stats.total_frames, 0);
    }
}
