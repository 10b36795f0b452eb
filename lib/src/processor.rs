//! Analysis pipeline coordinator
//!
//! Provides the [`VocalAnalyzer`] struct that runs frame assembly, track
//! filtering and the statistic blocks over one provider and keeps the
//! latest results.

use crate::channel::PerChannel;
use crate::config::AnalysisConfig;
use crate::frames::{assemble_frames, Frame};
use crate::provider::{harmonicity_stream, pitch_stream, AcousticProvider};
use crate::statistics::{
    breathiness_statistics, intonation_statistics, BreathinessStatistics, ChannelStatistics,
    IntonationStatistics,
};
use crate::track_filter::{FilterReport, Track, TrackFilter};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Everything one analysis run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Number of complete frames handed to the track filter
    pub frame_count: usize,
    pub tracks: PerChannel<Track>,
    /// `None` for channels whose track came out empty
    pub channels: PerChannel<Option<ChannelStatistics>>,
    pub intonation: IntonationStatistics,
    pub breathiness: BreathinessStatistics,
    pub filter: FilterReport,
}

impl AnalysisReport {
    /// Track averages, `None` where the track is empty
    pub fn averages(&self) -> PerChannel<Option<f64>> {
        self.channels.map(|_, stats| stats.as_ref().map(|s| s.average))
    }

    /// Number of channels with at least one accepted sample
    pub fn tracked_channels(&self) -> usize {
        count_tracked(&self.tracks)
    }
}

fn count_tracked(tracks: &PerChannel<Track>) -> usize {
    tracks.iter().filter(|(_, track)| !track.is_empty()).count()
}

/// Main analysis coordinator for one utterance at a time
pub struct VocalAnalyzer {
    config: AnalysisConfig,
    frames: Option<Vec<Frame>>,
    report: Option<AnalysisReport>,
}

impl VocalAnalyzer {
    /// Create a new analyzer with the default configuration
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
            frames: None,
            report: None,
        }
    }

    /// Create a new analyzer with a custom configuration
    pub fn with_config(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            frames: None,
            report: None,
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Set a new configuration (clears any existing analysis)
    pub fn set_config(&mut self, config: AnalysisConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        self.clear();
        Ok(())
    }

    /// Run the whole pipeline over `provider`.
    ///
    /// Results replace the previous ones only when every stage succeeded.
    pub fn analyze<P: AcousticProvider + ?Sized>(&mut self, provider: &P) -> Result<&AnalysisReport> {
        let config = &self.config;
        log::info!(
            "Analyzing {:.2}s of measurements (frame step {}s)",
            provider.duration(),
            config.time_step
        );

        let frames = assemble_frames(provider, config.time_step, config.precision)?;

        let filter = TrackFilter::new(config.filter.clone())?;
        let output = filter.filter(&frames);

        let channels = output.tracks.map(|channel, track| {
            if track.is_empty() {
                log::warn!("No statistics for {}: track is empty", channel);
                return Ok(None);
            }
            let settings = config.filter.channel(channel);
            ChannelStatistics::from_track(track, &settings.extremum, config.statistics.extremum_policy)
                .map(Some)
        });
        let channels = channels.transpose()?;

        let pitch = pitch_stream(provider, config.intonation.time_step)?;
        let intonation = intonation_statistics(&pitch, &config.intonation);

        let hnr = harmonicity_stream(provider, config.breathiness.time_step)?;
        let breathiness = breathiness_statistics(&hnr.values, config.breathiness.unvoiced_sentinel_db);

        log::info!(
            "Analysis complete: {} frames, {} of 5 channels tracked",
            frames.len(),
            count_tracked(&output.tracks)
        );

        let report = AnalysisReport {
            frame_count: frames.len(),
            tracks: output.tracks,
            channels,
            intonation,
            breathiness,
            filter: output.report,
        };

        self.frames = Some(frames);
        Ok(self.report.insert(report))
    }

    /// Frames assembled by the last successful run
    pub fn frames(&self) -> Option<&[Frame]> {
        self.frames.as_deref()
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    pub fn has_analysis(&self) -> bool {
        self.report.is_some()
    }

    /// Drop all results, keeping the configuration
    pub fn clear(&mut self) {
        self.frames = None;
        self.report = None;
    }
}

impl Default for VocalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
