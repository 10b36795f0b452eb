//! Analysis configuration
//!
//! Every behavioral variant of the track filter (continuity unit, reset
//! policy, spacing gate, cross-channel agreement) is a configuration value
//! here rather than a separate code path. All sections deserialize with
//! defaults, so a partial TOML file overlays [`AnalysisConfig::default`].

use crate::channel::{Channel, PerChannel};
use crate::error::AnalysisError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Half-open plausibility interval `[low, high)` in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value < self.high
    }
}

/// Bounds used only when reporting low/high extrema.
///
/// A low candidate must be strictly above `floor`, a high candidate
/// strictly below `ceiling`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtremumBand {
    pub floor: f64,
    pub ceiling: f64,
}

impl ExtremumBand {
    pub const fn new(floor: f64, ceiling: f64) -> Self {
        Self { floor, ceiling }
    }

    pub fn contains(&self, value: f64) -> bool {
        value > self.floor && value < self.ceiling
    }
}

/// Unit in which frame-to-frame change is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuityUnit {
    /// Absolute difference in Hz
    Hertz,
    /// `12·|log2(v/p)|`
    Semitones,
}

impl ContinuityUnit {
    pub fn name(&self) -> &'static str {
        match self {
            ContinuityUnit::Hertz => "Hz",
            ContinuityUnit::Semitones => "semitones",
        }
    }
}

/// Maximum allowed change between consecutive accepted samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Continuity {
    pub unit: ContinuityUnit,
    pub threshold: f64,
}

impl Continuity {
    pub const fn hertz(threshold: f64) -> Self {
        Self {
            unit: ContinuityUnit::Hertz,
            threshold,
        }
    }

    pub const fn semitones(threshold: f64) -> Self {
        Self {
            unit: ContinuityUnit::Semitones,
            threshold,
        }
    }

    /// Distance from `previous` to `candidate` in this rule's unit
    pub fn distance(&self, previous: f64, candidate: f64) -> f64 {
        match self.unit {
            ContinuityUnit::Hertz => (candidate - previous).abs(),
            ContinuityUnit::Semitones => semitone_distance(previous, candidate),
        }
    }

    /// True when the change stays strictly below the threshold
    pub fn allows(&self, previous: f64, candidate: f64) -> bool {
        self.distance(previous, candidate) < self.threshold
    }
}

/// Unsigned semitone distance `12·|log2(b/a)|`
pub fn semitone_distance(a: f64, b: f64) -> f64 {
    12.0 * (b / a).log2().abs()
}

/// Gating table entry for one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelSettings {
    pub plausibility: Band,
    pub continuity: Continuity,
    /// Reject jumps faster than this many semitones per second
    #[serde(default)]
    pub max_rate_semitones_per_second: Option<f64>,
    pub extremum: ExtremumBand,
}

impl ChannelSettings {
    /// Canonical gating values for `channel` with continuity measured in `unit`
    pub fn canonical(channel: Channel, unit: ContinuityUnit) -> Self {
        let (low, high, hz, st, floor, ceiling) = match channel {
            Channel::F0 => (75.0, 550.0, 60.0, 4.0, 91.0, 650.0),
            Channel::F1 => (250.0, 890.0, 250.0, 5.0, 250.0, 900.0),
            Channel::F2 => (800.0, 2800.0, 450.0, 7.0, 600.0, 2500.0),
            Channel::F3 => (1750.0, 3600.0, 650.0, 8.0, 1500.0, 3400.0),
            Channel::F4 => (2850.0, 4500.0, 850.0, 9.0, 2500.0, 4500.0),
        };
        let continuity = match unit {
            ContinuityUnit::Hertz => Continuity::hertz(hz),
            ContinuityUnit::Semitones => Continuity::semitones(st),
        };

        Self {
            plausibility: Band::new(low, high),
            continuity,
            max_rate_semitones_per_second: None,
            extremum: ExtremumBand::new(floor, ceiling),
        }
    }

    fn validate(&self, channel: Channel) -> Result<()> {
        let band = self.plausibility;
        if !(band.low.is_finite() && band.high.is_finite()) || band.low <= 0.0 || band.low >= band.high
        {
            return Err(AnalysisError::config(format!(
                "{} plausibility band must satisfy 0 < low < high, got [{}, {})",
                channel, band.low, band.high
            )));
        }

        if !(self.continuity.threshold > 0.0) {
            return Err(AnalysisError::config(format!(
                "{} continuity threshold must be positive, got {}",
                channel, self.continuity.threshold
            )));
        }

        if let Some(rate) = self.max_rate_semitones_per_second {
            if !(rate > 0.0) {
                return Err(AnalysisError::config(format!(
                    "{} rate gate must be positive, got {}",
                    channel, rate
                )));
            }
        }

        let extremum = self.extremum;
        if !(extremum.floor.is_finite() && extremum.ceiling.is_finite())
            || extremum.floor >= extremum.ceiling
        {
            return Err(AnalysisError::config(format!(
                "{} extremum band floor ({}) must be below ceiling ({})",
                channel, self.extremum.floor, self.extremum.ceiling
            )));
        }

        Ok(())
    }
}

/// What happens to a channel's anchor when a sample is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// The anchor is dropped; the next sample re-acquires the track
    Strict,
    /// The bad sample is skipped and the anchor is kept
    #[default]
    Lenient,
}

/// Cross-channel agreement gate: F0 is only kept when enough formants agree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementGate {
    pub min_formants: usize,
}

impl Default for AgreementGate {
    fn default() -> Self {
        Self { min_formants: 3 }
    }
}

/// Track filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub channels: PerChannel<ChannelSettings>,
    pub reset_policy: ResetPolicy,
    /// Minimum time (s) between accepted samples of a channel; `None` disables the gate
    pub min_spacing: Option<f64>,
    /// Enables synchronized filtering with the agreement gate
    pub agreement: Option<AgreementGate>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::with_unit(ContinuityUnit::Hertz)
    }
}

impl FilterConfig {
    /// Canonical table with every channel measured in `unit`
    pub fn with_unit(unit: ContinuityUnit) -> Self {
        Self {
            channels: PerChannel::from_fn(|channel| ChannelSettings::canonical(channel, unit)),
            reset_policy: ResetPolicy::Lenient,
            min_spacing: None,
            agreement: None,
        }
    }

    /// Settings for one channel
    pub fn channel(&self, channel: Channel) -> &ChannelSettings {
        self.channels.get(channel)
    }

    /// Switch every channel to `unit`, using the canonical threshold for that unit
    pub fn set_continuity_unit(&mut self, unit: ContinuityUnit) {
        for &channel in Channel::all() {
            let canonical = ChannelSettings::canonical(channel, unit);
            self.channels.get_mut(channel).continuity = canonical.continuity;
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (channel, settings) in self.channels.iter() {
            settings.validate(channel)?;
        }

        if let Some(spacing) = self.min_spacing {
            if !spacing.is_finite() || spacing < 0.0 {
                return Err(AnalysisError::config(format!(
                    "Minimum spacing must be a non-negative number of seconds, got {}",
                    spacing
                )));
            }
        }

        if let Some(agreement) = self.agreement {
            if agreement.min_formants < 1 || agreement.min_formants > 4 {
                return Err(AnalysisError::config(format!(
                    "Agreement gate needs between 1 and 4 formants, got {}",
                    agreement.min_formants
                )));
            }
        }

        Ok(())
    }
}

/// Rounding applied to channel values during frame assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// Round to the nearest Hz
    WholeHz,
    /// Round to this many decimal places
    Decimals(u8),
}

impl Default for Precision {
    fn default() -> Self {
        Precision::Decimals(5)
    }
}

impl Precision {
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            Precision::WholeHz => value.round(),
            Precision::Decimals(places) => {
                let scale = 10f64.powi(places as i32);
                (value * scale).round() / scale
            }
        }
    }
}

/// How low/high extrema behave when nothing falls inside the search band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremumPolicy {
    /// Seed the scan with the first track value and return it if nothing in band beats it
    #[default]
    SeedFallback,
    /// Consider in-band values only; report no value when none exist
    InBandOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    pub extremum_policy: ExtremumPolicy,
}

/// Intonation statistics over the raw pitch stream
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntonationConfig {
    /// Sampling step (s) for the raw pitch stream
    pub time_step: f64,
    /// Voicing floor (Hz), inclusive
    pub floor: f64,
    /// Voicing ceiling (Hz), inclusive
    pub ceiling: f64,
    /// Reference frequency for semitone conversion
    pub reference_hz: f64,
    pub min_voiced_frames: usize,
}

impl Default for IntonationConfig {
    fn default() -> Self {
        Self {
            time_step: 0.005,
            floor: 60.0,
            ceiling: 500.0,
            reference_hz: 55.0,
            min_voiced_frames: 5,
        }
    }
}

/// Breathiness statistics over the raw harmonicity stream
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreathinessConfig {
    pub time_step: f64,
    /// Value the provider uses for unvoiced frames
    pub unvoiced_sentinel_db: f64,
}

impl Default for BreathinessConfig {
    fn default() -> Self {
        Self {
            time_step: 0.005,
            unvoiced_sentinel_db: -200.0,
        }
    }
}

/// Complete configuration of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Frame grid step (s) for pitch and formant sampling
    pub time_step: f64,
    pub precision: Precision,
    pub filter: FilterConfig,
    pub statistics: StatisticsConfig,
    pub intonation: IntonationConfig,
    pub breathiness: BreathinessConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            time_step: 0.01,
            precision: Precision::default(),
            filter: FilterConfig::default(),
            statistics: StatisticsConfig::default(),
            intonation: IntonationConfig::default(),
            breathiness: BreathinessConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        validate_time_step("Frame", self.time_step)?;
        validate_time_step("Intonation", self.intonation.time_step)?;
        validate_time_step("Breathiness", self.breathiness.time_step)?;

        if let Precision::Decimals(places) = self.precision {
            if places > 12 {
                return Err(AnalysisError::config(format!(
                    "Precision must be at most 12 decimal places, got {}",
                    places
                )));
            }
        }

        self.filter.validate()?;

        let intonation = &self.intonation;
        if !(intonation.floor.is_finite() && intonation.ceiling.is_finite())
            || intonation.floor <= 0.0
            || intonation.floor >= intonation.ceiling
        {
            return Err(AnalysisError::config(format!(
                "Intonation voicing band must satisfy 0 < floor < ceiling, got [{}, {}]",
                intonation.floor, intonation.ceiling
            )));
        }
        if !(intonation.reference_hz.is_finite() && intonation.reference_hz > 0.0) {
            return Err(AnalysisError::config(format!(
                "Semitone reference must be positive, got {}",
                intonation.reference_hz
            )));
        }
        if intonation.min_voiced_frames < 2 {
            return Err(AnalysisError::config(format!(
                "Intonation needs at least 2 voiced frames, got {}",
                intonation.min_voiced_frames
            )));
        }

        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Self::from_toml_str(&text)
    }
}

fn validate_time_step(what: &str, step: f64) -> Result<()> {
    if step.is_finite() && step > 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::config(format!(
            "{} time step must be a positive number of seconds, got {}",
            what, step
        )))
    }
}

/// Named filter configurations covering the observed gating variants
pub mod presets {
    use super::*;

    /// Preset information structure
    pub struct PresetInfo {
        pub id: usize,
        pub name: &'static str,
        pub description: &'static str,
        pub config: AnalysisConfig,
    }

    /// Independent channels, absolute-Hz continuity, lenient anchors
    pub fn independent_hz() -> AnalysisConfig {
        AnalysisConfig::default()
    }

    /// Independent channels, semitone continuity, lenient anchors
    pub fn independent_semitones() -> AnalysisConfig {
        AnalysisConfig {
            filter: FilterConfig::with_unit(ContinuityUnit::Semitones),
            ..AnalysisConfig::default()
        }
    }

    /// Semitone continuity where any rejection forces re-acquisition
    pub fn strict_semitones() -> AnalysisConfig {
        let mut config = independent_semitones();
        config.filter.reset_policy = ResetPolicy::Strict;
        config
    }

    /// Frame-synchronized filtering: F0 rate gate, 3-of-4 formant agreement, 50 ms spacing
    pub fn synchronized() -> AnalysisConfig {
        let mut config = independent_semitones();
        config.filter.channels.f0.max_rate_semitones_per_second = Some(24.0);
        config.filter.agreement = Some(AgreementGate { min_formants: 3 });
        config.filter.min_spacing = Some(0.05);
        config
    }

    pub fn all_presets() -> Vec<PresetInfo> {
        vec![
            PresetInfo {
                id: 1,
                name: "independent_hz",
                description: "Per-channel filtering with absolute Hz continuity (default)",
                config: independent_hz(),
            },
            PresetInfo {
                id: 2,
                name: "independent_semitones",
                description: "Per-channel filtering with semitone continuity",
                config: independent_semitones(),
            },
            PresetInfo {
                id: 3,
                name: "strict_semitones",
                description: "Semitone continuity, one bad sample forces re-acquisition",
                config: strict_semitones(),
            },
            PresetInfo {
                id: 4,
                name: "synchronized",
                description: "Whole-frame filtering with F0 rate gate, formant agreement and 50 ms spacing",
                config: synchronized(),
            },
        ]
    }

    /// Look up a preset by name or numeric id
    pub fn by_name(name: &str) -> Result<AnalysisConfig> {
        let key = name.trim().to_ascii_lowercase();
        all_presets()
            .into_iter()
            .find(|preset| preset.name == key || preset.id.to_string() == key)
            .map(|preset| preset.config)
            .ok_or_else(|| AnalysisError::config(format!("unknown preset '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.time_step, 0.01);
        assert_eq!(config.filter.reset_policy, ResetPolicy::Lenient);
        assert!(config.filter.agreement.is_none());
        assert!(config.filter.min_spacing.is_none());
    }

    #[test]
    fn test_canonical_table() {
        let f0 = ChannelSettings::canonical(Channel::F0, ContinuityUnit::Hertz);
        assert_eq!(f0.plausibility, Band::new(75.0, 550.0));
        assert_eq!(f0.continuity, Continuity::hertz(60.0));

        let f4 = ChannelSettings::canonical(Channel::F4, ContinuityUnit::Semitones);
        assert_eq!(f4.plausibility, Band::new(2850.0, 4500.0));
        assert_eq!(f4.continuity, Continuity::semitones(9.0));
        assert_eq!(f4.extremum, ExtremumBand::new(2500.0, 4500.0));
    }

    #[test]
    fn test_band_is_half_open() {
        let band = Band::new(75.0, 550.0);
        assert!(band.contains(75.0));
        assert!(band.contains(549.999));
        assert!(!band.contains(550.0));
        assert!(!band.contains(74.9));
    }

    #[test]
    fn test_semitone_continuity() {
        let rule = Continuity::semitones(9.0);
        assert!((rule.distance(100.0, 200.0) - 12.0).abs() < 1e-9);
        assert!(!rule.allows(100.0, 200.0));

        let d = rule.distance(100.0, 103.0);
        assert!((d - 0.5117).abs() < 1e-3);
        for &channel in Channel::all() {
            let settings = ChannelSettings::canonical(channel, ContinuityUnit::Semitones);
            assert!(settings.continuity.allows(100.0, 103.0));
        }
    }

    #[test]
    fn test_precision_rounding() {
        assert_eq!(Precision::WholeHz.apply(120.6), 121.0);
        assert!((Precision::Decimals(5).apply(120.123456789) - 120.12346).abs() < 1e-9);
        assert_eq!(Precision::Decimals(0).apply(99.5), 100.0);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AnalysisConfig::default();
        config.filter.channels.f1.plausibility = Band::new(900.0, 250.0);
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::Configuration(_))
        ));

        let mut config = AnalysisConfig::default();
        config.filter.agreement = Some(AgreementGate { min_formants: 5 });
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.time_step = 0.0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.filter.channels.f2.continuity = Continuity::hertz(-1.0);
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.intonation.floor = 600.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        let mut config = AnalysisConfig::default();
        config.filter.channels.f3.extremum = ExtremumBand::new(f64::NAN, 3400.0);
        assert!(matches!(config.validate(), Err(AnalysisError::Configuration(_))));

        let mut config = AnalysisConfig::default();
        config.filter.channels.f1.extremum = ExtremumBand::new(250.0, f64::NAN);
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.intonation.ceiling = f64::NAN;
        assert!(matches!(config.validate(), Err(AnalysisError::Configuration(_))));

        let mut config = AnalysisConfig::default();
        config.intonation.ceiling = f64::INFINITY;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.intonation.reference_hz = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_overlays_defaults() {
        let text = r#"
            time_step = 0.02
            precision = "whole_hz"

            [filter]
            reset_policy = "strict"
            min_spacing = 0.05

            [filter.agreement]
            min_formants = 2

            [intonation]
            floor = 75.0
        "#;

        let config = AnalysisConfig::from_toml_str(text).unwrap();
        assert_eq!(config.time_step, 0.02);
        assert_eq!(config.precision, Precision::WholeHz);
        assert_eq!(config.filter.reset_policy, ResetPolicy::Strict);
        assert_eq!(config.filter.min_spacing, Some(0.05));
        assert_eq!(config.filter.agreement, Some(AgreementGate { min_formants: 2 }));
        assert_eq!(config.intonation.floor, 75.0);
        assert_eq!(config.intonation.ceiling, 500.0);
        assert_eq!(config.filter.channels, FilterConfig::default().channels);
    }

    #[test]
    fn test_toml_validation_error() {
        let text = "[breathiness]\ntime_step = -1.0\n";
        assert!(matches!(
            AnalysisConfig::from_toml_str(text),
            Err(AnalysisError::Configuration(_))
        ));
    }

    #[test]
    fn test_set_continuity_unit_keeps_bands() {
        let mut filter = FilterConfig::default();
        filter.channels.f1.plausibility = Band::new(300.0, 800.0);
        filter.set_continuity_unit(ContinuityUnit::Semitones);
        assert_eq!(filter.channels.f1.plausibility, Band::new(300.0, 800.0));
        assert_eq!(filter.channels.f1.continuity, Continuity::semitones(5.0));
    }

    #[test]
    fn test_presets() {
        let presets = presets::all_presets();
        assert_eq!(presets.len(), 4);
        for preset in &presets {
            assert!(preset.config.validate().is_ok(), "{} invalid", preset.name);
        }

        let sync = presets::by_name("synchronized").unwrap();
        assert_eq!(sync.filter.agreement, Some(AgreementGate { min_formants: 3 }));
        assert_eq!(sync.filter.channels.f0.max_rate_semitones_per_second, Some(24.0));
        assert_eq!(sync.filter.min_spacing, Some(0.05));

        assert_eq!(presets::by_name("3").unwrap().filter.reset_policy, ResetPolicy::Strict);
        assert!(presets::by_name("nope").is_err());
    }
}
