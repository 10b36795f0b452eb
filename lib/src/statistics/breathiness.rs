//! Breathiness statistics over the harmonics-to-noise ratio stream

use super::descriptive::{mean, median};
use serde::{Deserialize, Serialize};

/// Mean and median HNR (dB) over voiced frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreathinessStatistics {
    #[serde(with = "crate::serde_nan")]
    pub mean_hnr_db: f64,
    #[serde(with = "crate::serde_nan")]
    pub median_hnr_db: f64,
    pub total_frames: usize,
    pub voiced_frames: usize,
    #[serde(with = "crate::serde_nan")]
    pub voiced_fraction: f64,
}

impl BreathinessStatistics {
    pub fn is_defined(&self) -> bool {
        self.mean_hnr_db.is_finite()
    }
}

/// Summarise an HNR stream.
///
/// A frame is voiced when its value is finite and differs from `sentinel`.
/// Mean and median are NaN without voiced frames. The voiced fraction is
/// NaN when the stream carries no finite value at all, so missing data is
/// not reported as silence.
pub fn breathiness_statistics(hnr: &[f64], sentinel: f64) -> BreathinessStatistics {
    let voiced: Vec<f64> = hnr
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v != sentinel)
        .collect();

    let total_frames = hnr.len();
    let measured = hnr.iter().any(|v| v.is_finite());
    let voiced_fraction = if !measured {
        f64::NAN
    } else {
        voiced.len() as f64 / total_frames as f64
    };

    if !measured && total_frames > 0 {
        log::warn!("No harmonicity data in {} frames", total_frames);
    } else if voiced.is_empty() && total_frames > 0 {
        log::warn!("No voiced frames in {} harmonicity frames", total_frames);
    }

    BreathinessStatistics {
        mean_hnr_db: mean(&voiced).unwrap_or(f64::NAN),
        median_hnr_db: median(&voiced).unwrap_or(f64::NAN),
        total_frames,
        voiced_frames: voiced.len(),
        voiced_fraction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTINEL: f64 = -200.0;

    #[test]
    fn test_sentinel_frames_are_unvoiced() {
        let hnr = [
            10.0, SENTINEL, 12.0, 14.0, SENTINEL, 16.0, 18.0, SENTINEL, 20.0, 22.0,
        ];
        let stats = breathiness_statistics(&hnr, SENTINEL);

        assert_eq!(stats.total_frames, 10);
        assert_eq!(stats.voiced_frames, 7);
        assert!((stats.voiced_fraction - 0.7).abs() < 1e-12);
        assert!((stats.mean_hnr_db - 16.0).abs() < 1e-12);
        assert_eq!(stats.median_hnr_db, 16.0);
        assert!(stats.is_defined());
    }

    #[test]
    fn test_negative_hnr_is_still_voiced() {
        let stats = breathiness_statistics(&[-3.0, -1.0, SENTINEL], SENTINEL);
        assert_eq!(stats.voiced_frames, 2);
        assert_eq!(stats.mean_hnr_db, -2.0);
    }

    #[test]
    fn test_no_voiced_frames() {
        let stats = breathiness_statistics(&[SENTINEL; 4], SENTINEL);
        assert!(stats.mean_hnr_db.is_nan());
        assert!(stats.median_hnr_db.is_nan());
        assert_eq!(stats.voiced_fraction, 0.0);
        assert!(!stats.is_defined());
    }

    #[test]
    fn test_missing_data_is_unvoiced() {
        let stats = breathiness_statistics(&[f64::NAN, 8.0], SENTINEL);
        assert_eq!(stats.voiced_frames, 1);
        assert_eq!(stats.voiced_fraction, 0.5);
    }

    #[test]
    fn test_absent_data_is_not_silence() {
        let stats = breathiness_statistics(&[f64::NAN; 6], SENTINEL);
        assert_eq!(stats.total_frames, 6);
        assert_eq!(stats.voiced_frames, 0);
        assert!(stats.voiced_fraction.is_nan());
        assert!(!stats.is_defined());
    }

    #[test]
    fn test_empty_stream() {
        let stats = breathiness_statistics(&[], SENTINEL);
        assert_eq!(stats.total_frames, 0);
        assert!(stats.voiced_fraction.is_nan());

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"voiced_fraction\":null"));
    }
}
