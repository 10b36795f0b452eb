//! Acoustic analysis provider seam
//!
//! The engine never decodes audio. It queries a provider for pitch,
//! formant and harmonicity values at given instants; undetected values
//! are NaN. [`MeasurementTable`] is a provider backed by measurements
//! that were extracted elsewhere and stored as JSON.

use crate::channel::Channel;
use crate::error::AnalysisError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-instant acoustic measurements for one recorded utterance
pub trait AcousticProvider {
    /// Length of the analysed sample in seconds
    fn duration(&self) -> f64;

    /// Fundamental frequency (Hz) at `time`, NaN when unvoiced
    fn pitch(&self, time: f64) -> f64;

    /// Center frequency (Hz) of formant `number` (1..=4) at `time`, NaN when undetected
    fn formant(&self, number: u8, time: f64) -> f64;

    /// Harmonic-to-noise ratio (dB) at `time`; unvoiced frames carry the provider's sentinel
    fn harmonicity(&self, time: f64) -> f64;

    /// Value of any channel at `time`
    fn channel_value(&self, channel: Channel, time: f64) -> f64 {
        match channel.formant_number() {
            None => self.pitch(time),
            Some(number) => self.formant(number, time),
        }
    }
}

/// Time-ordered samples of one raw stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stream {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl Stream {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Longest time grid a single stream may have
pub const MAX_GRID_SAMPLES: usize = 10_000_000;

/// Sampling instants `t_i = i·step` covering `[0, duration)`
pub fn time_grid(duration: f64, step: f64) -> Result<Vec<f64>> {
    if !(step.is_finite() && step > 0.0) {
        return Err(AnalysisError::config(format!(
            "Time step must be positive, got {}",
            step
        )));
    }
    if !duration.is_finite() || duration < 0.0 {
        return Err(AnalysisError::config(format!(
            "Duration must be a non-negative number of seconds, got {}",
            duration
        )));
    }

    let samples = (duration / step).ceil();
    if !(samples <= MAX_GRID_SAMPLES as f64) {
        return Err(AnalysisError::config(format!(
            "{}s at a {}s step exceeds the limit of {} samples",
            duration, step, MAX_GRID_SAMPLES
        )));
    }

    let mut times = Vec::with_capacity(samples as usize);
    let mut i = 0usize;
    loop {
        let t = i as f64 * step;
        if t >= duration {
            break;
        }
        times.push(t);
        i += 1;
    }
    Ok(times)
}

/// Sample `query` over the provider's time grid
pub fn sample_stream<P, F>(provider: &P, step: f64, query: F) -> Result<Stream>
where
    P: AcousticProvider + ?Sized,
    F: Fn(&P, f64) -> f64,
{
    let times = time_grid(provider.duration(), step)?;
    let values = times.iter().map(|&t| query(provider, t)).collect();
    Ok(Stream { times, values })
}

/// Raw pitch stream at `step`
pub fn pitch_stream<P: AcousticProvider + ?Sized>(provider: &P, step: f64) -> Result<Stream> {
    sample_stream(provider, step, |p, t| p.pitch(t))
}

/// Raw harmonicity stream at `step`
pub fn harmonicity_stream<P: AcousticProvider + ?Sized>(provider: &P, step: f64) -> Result<Stream> {
    sample_stream(provider, step, |p, t| p.harmonicity(t))
}

/// Pre-extracted measurements on fixed time grids.
///
/// Queries return the value at the nearest grid index, or NaN outside the
/// recorded range. `null` entries in JSON mean "undetected".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementTable {
    /// Sample duration (s); defaults to the pitch grid length when absent
    #[serde(default)]
    pub duration: Option<f64>,
    /// Grid step (s) of the pitch and formant arrays
    pub time_step: f64,
    #[serde(with = "crate::serde_nan::vec")]
    pub pitch: Vec<f64>,
    #[serde(with = "crate::serde_nan::vec")]
    pub f1: Vec<f64>,
    #[serde(with = "crate::serde_nan::vec")]
    pub f2: Vec<f64>,
    #[serde(with = "crate::serde_nan::vec")]
    pub f3: Vec<f64>,
    #[serde(with = "crate::serde_nan::vec")]
    pub f4: Vec<f64>,
    /// Grid step (s) of the harmonicity array; defaults to `time_step`
    #[serde(default)]
    pub harmonicity_time_step: Option<f64>,
    #[serde(default, with = "crate::serde_nan::vec")]
    pub harmonicity: Vec<f64>,
}

impl MeasurementTable {
    /// Table with pitch and formants on a shared grid and no harmonicity data
    pub fn new(time_step: f64, pitch: Vec<f64>, formants: [Vec<f64>; 4]) -> Self {
        let [f1, f2, f3, f4] = formants;
        Self {
            duration: None,
            time_step,
            pitch,
            f1,
            f2,
            f3,
            f4,
            harmonicity_time_step: None,
            harmonicity: Vec::new(),
        }
    }

    pub fn with_harmonicity(mut self, time_step: f64, values: Vec<f64>) -> Self {
        self.harmonicity_time_step = Some(time_step);
        self.harmonicity = values;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(AnalysisError::config(format!(
                "Measurement time step must be positive, got {}",
                self.time_step
            )));
        }
        if let Some(step) = self.harmonicity_time_step {
            if !(step.is_finite() && step > 0.0) {
                return Err(AnalysisError::config(format!(
                    "Harmonicity time step must be positive, got {}",
                    step
                )));
            }
        }
        if let Some(duration) = self.duration {
            if !duration.is_finite() || duration < 0.0 {
                return Err(AnalysisError::config(format!(
                    "Measurement duration must be non-negative, got {}",
                    duration
                )));
            }
            let recorded = self.recorded_span();
            if duration > recorded + self.time_step {
                return Err(AnalysisError::config(format!(
                    "Measurement duration {}s exceeds the recorded {:.3}s",
                    duration, recorded
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON measurement document
    pub fn from_json_str(text: &str) -> Result<Self> {
        let table: MeasurementTable = serde_json::from_str(text)?;
        table.validate()?;
        Ok(table)
    }

    /// Read a JSON measurement file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let table = Self::from_json_str(&text)?;
        log::info!(
            "Loaded measurements: {} pitch frames, {} harmonicity frames, {:.2}s",
            table.pitch.len(),
            table.harmonicity.len(),
            table.duration()
        );
        Ok(table)
    }

    /// Time covered by the longest recorded array
    fn recorded_span(&self) -> f64 {
        let frames = [&self.pitch, &self.f1, &self.f2, &self.f3, &self.f4]
            .iter()
            .map(|values| values.len())
            .max()
            .unwrap_or(0);
        let measured = frames as f64 * self.time_step;
        let harmonicity = self.harmonicity.len() as f64 * self.harmonicity_step();
        measured.max(harmonicity)
    }

    fn harmonicity_step(&self) -> f64 {
        self.harmonicity_time_step.unwrap_or(self.time_step)
    }

    fn lookup(&self, values: &[f64], step: f64, time: f64) -> f64 {
        if !time.is_finite() || time < 0.0 || time >= self.duration() {
            return f64::NAN;
        }
        let index = (time / step).round() as usize;
        values.get(index).copied().unwrap_or(f64::NAN)
    }
}

impl AcousticProvider for MeasurementTable {
    fn duration(&self) -> f64 {
        self.duration
            .unwrap_or(self.pitch.len() as f64 * self.time_step)
    }

    fn pitch(&self, time: f64) -> f64 {
        self.lookup(&self.pitch, self.time_step, time)
    }

    fn formant(&self, number: u8, time: f64) -> f64 {
        let values = match number {
            1 => &self.f1,
            2 => &self.f2,
            3 => &self.f3,
            4 => &self.f4,
            _ => return f64::NAN,
        };
        self.lookup(values, self.time_step, time)
    }

    fn harmonicity(&self, time: f64) -> f64 {
        self.lookup(&self.harmonicity, self.harmonicity_step(), time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_table() -> MeasurementTable {
        MeasurementTable::new(
            0.1,
            vec![120.0, f64::NAN, 122.0],
            [
                vec![500.0, 510.0, 520.0],
                vec![1500.0, 1510.0, 1520.0],
                vec![2500.0, 2510.0, 2520.0],
                vec![3500.0, 3510.0],
            ],
        )
        .with_harmonicity(0.05, vec![-200.0, 12.0, 13.0, 14.0, -200.0, 15.0])
    }

    #[test]
    fn test_time_grid_excludes_duration() {
        let grid = time_grid(1.0, 0.25).unwrap();
        assert_eq!(grid, vec![0.0, 0.25, 0.5, 0.75]);

        let grid = time_grid(1.0, 0.01).unwrap();
        assert_eq!(grid.len(), 100);
        assert!((grid[99] - 0.99).abs() < 1e-12);

        assert!(time_grid(0.0, 0.01).unwrap().is_empty());
        assert!(time_grid(1.0, 0.0).is_err());
    }

    #[test]
    fn test_oversized_time_grid_rejected() {
        assert!(matches!(
            time_grid(1e20, 0.01),
            Err(AnalysisError::Configuration(_))
        ));
        assert!(time_grid(1e6, 1e-6).is_err());
        assert!(time_grid(1000.0, 0.001).is_ok());
    }

    #[test]
    fn test_duration_beyond_recording_rejected() {
        let json = r#"{
            "duration": 1e20,
            "time_step": 0.01,
            "pitch": [120.0, 121.0],
            "f1": [500.0, 505.0],
            "f2": [1500.0, 1505.0],
            "f3": [2500.0, 2505.0],
            "f4": [3500.0, 3505.0]
        }"#;
        assert!(matches!(
            MeasurementTable::from_json_str(json),
            Err(AnalysisError::Configuration(_))
        ));

        let json = json.replace("1e20", "0.02");
        let table = MeasurementTable::from_json_str(&json).unwrap();
        assert_eq!(table.duration(), 0.02);
    }

    #[test]
    fn test_huge_provider_duration_fails_analysis() {
        struct Endless;

        impl AcousticProvider for Endless {
            fn duration(&self) -> f64 {
                1e20
            }
            fn pitch(&self, _time: f64) -> f64 {
                120.0
            }
            fn formant(&self, _number: u8, _time: f64) -> f64 {
                500.0
            }
            fn harmonicity(&self, _time: f64) -> f64 {
                10.0
            }
        }

        let mut analyzer = crate::VocalAnalyzer::new();
        assert!(matches!(
            analyzer.analyze(&Endless),
            Err(AnalysisError::Configuration(_))
        ));
    }

    #[test]
    fn test_nearest_grid_lookup() {
        let table = small_table();
        assert!((table.duration() - 0.3).abs() < 1e-12);
        assert_eq!(table.pitch(0.0), 120.0);
        assert_eq!(table.pitch(0.21), 122.0);
        assert!(table.pitch(0.1).is_nan());
        assert!(table.pitch(0.5).is_nan());
        assert!(table.pitch(-0.1).is_nan());

        assert_eq!(table.formant(2, 0.1), 1510.0);
        assert!(table.formant(4, 0.2).is_nan());
        assert!(table.formant(5, 0.0).is_nan());
        assert_eq!(table.channel_value(Channel::F3, 0.0), 2500.0);
        assert_eq!(table.channel_value(Channel::F0, 0.0), 120.0);

        assert_eq!(table.harmonicity(0.05), 12.0);
    }

    #[test]
    fn test_streams() {
        let table = small_table();
        let pitch = pitch_stream(&table, 0.1).unwrap();
        assert_eq!(pitch.len(), 3);
        assert_eq!(pitch.values[0], 120.0);
        assert!(pitch.values[1].is_nan());

        let hnr = harmonicity_stream(&table, 0.05).unwrap();
        assert_eq!(hnr.len(), 6);
        assert_eq!(hnr.values[5], 15.0);
    }

    #[test]
    fn test_json_with_nulls() {
        let json = r#"{
            "time_step": 0.01,
            "pitch": [110.0, null],
            "f1": [500.0, 505.0],
            "f2": [1500.0, null],
            "f3": [2500.0, 2505.0],
            "f4": [3500.0, 3505.0],
            "harmonicity": [-200.0, 8.5]
        }"#;

        let table = MeasurementTable::from_json_str(json).unwrap();
        assert_eq!(table.pitch[0], 110.0);
        assert!(table.pitch[1].is_nan());
        assert!(table.f2[1].is_nan());
        assert_eq!(table.harmonicity(0.01), 8.5);
    }

    #[test]
    fn test_invalid_time_step_rejected() {
        let json = r#"{"time_step": 0.0, "pitch": [], "f1": [], "f2": [], "f3": [], "f4": []}"#;
        assert!(matches!(
            MeasurementTable::from_json_str(json),
            Err(AnalysisError::Configuration(_))
        ));
    }
}
