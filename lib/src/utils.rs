//! Utility functions for loading, formatting and exporting analyses
//!
//! Helpers used by client applications around [`VocalAnalyzer`].

use crate::channel::Channel;
use crate::processor::{AnalysisReport, VocalAnalyzer};
use crate::provider::MeasurementTable;
use crate::Result;
use std::path::Path;

/// Load a JSON measurement file and analyze it
pub fn load_and_analyze<P: AsRef<Path>>(analyzer: &mut VocalAnalyzer, path: P) -> Result<MeasurementTable> {
    let table = MeasurementTable::load(path.as_ref())?;
    let report = analyzer.analyze(&table)?;

    log::info!(
        "Analysis of {} complete: {} frames, {} F0 samples kept",
        path.as_ref().display(),
        report.frame_count,
        report.tracks.f0.len()
    );

    Ok(table)
}

/// Write the report as pretty-printed JSON
pub fn write_report_json<P: AsRef<Path>>(path: P, report: &AnalysisReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path.as_ref(), json)?;
    log::info!("Exported report to {}", path.as_ref().display());
    Ok(())
}

/// Format a frequency value for display
pub fn format_frequency(freq_hz: f64) -> String {
    if !freq_hz.is_finite() {
        "n/a".to_string()
    } else if freq_hz >= 1000.0 {
        format!("{:.2} kHz", freq_hz / 1000.0)
    } else {
        format!("{:.1} Hz", freq_hz)
    }
}

/// Format a duration in seconds, switching to minutes past one minute
pub fn format_time(time_sec: f64) -> String {
    match time_sec {
        t if !t.is_finite() => "n/a".to_string(),
        t if t < 60.0 => format!("{:.2}s", t),
        t => format!("{}m {:.1}s", (t / 60.0).floor(), t.rem_euclid(60.0)),
    }
}

fn format_number(value: f64, unit: &str) -> String {
    if value.is_finite() {
        format!("{:.2} {}", value, unit)
    } else {
        "n/a".to_string()
    }
}

fn format_option(value: Option<f64>) -> String {
    value.map(format_frequency).unwrap_or_else(|| "-".to_string())
}

/// Get a multi-line summary of an analysis report
pub fn analysis_summary(report: &AnalysisReport) -> String {
    let mut summary = String::new();

    summary.push_str(&format!("Frames: {} complete\n", report.frame_count));
    summary.push_str(&format!(
        "Filter: {}\n",
        if report.filter.synchronized {
            "synchronized"
        } else {
            "independent"
        }
    ));

    summary.push_str("Tracks:\n");
    for &channel in Channel::all() {
        let track = report.tracks.get(channel);
        match report.channels.get(channel) {
            Some(stats) => summary.push_str(&format!(
                "  {}: {} samples over {}, avg {}, low {}, high {}\n",
                channel,
                track.len(),
                format_time(track.span()),
                format_frequency(stats.average),
                format_option(stats.low),
                format_option(stats.high)
            )),
            None => summary.push_str(&format!("  {}: empty\n", channel)),
        }
    }

    let intonation = &report.intonation;
    summary.push_str("Intonation:\n");
    if intonation.is_defined() {
        summary.push_str(&format!(
            "  Mean: {} (sd {:.2} Hz, {:.2} st)\n",
            format_frequency(intonation.mean_hz),
            intonation.sd_hz,
            intonation.sd_semitones
        ));
        summary.push_str(&format!(
            "  Range: {} - {} ({})\n",
            format_frequency(intonation.min_hz),
            format_frequency(intonation.max_hz),
            format_number(intonation.range_semitones, "st")
        ));
        summary.push_str(&format!(
            "  P5-P95: {} - {} ({})\n",
            format_frequency(intonation.p5_hz),
            format_frequency(intonation.p95_hz),
            format_number(intonation.range_semitones_p5_p95, "st")
        ));
        summary.push_str(&format!(
            "  Slope: {}\n",
            format_number(intonation.slope_semitones_per_second, "st/s")
        ));
    } else {
        summary.push_str("  Insufficient voiced frames\n");
    }
    summary.push_str(&format!(
        "  Voiced: {} of {} frames\n",
        intonation.voiced_frames, intonation.total_frames
    ));

    let breathiness = &report.breathiness;
    summary.push_str("Breathiness:\n");
    summary.push_str(&format!(
        "  Mean HNR: {}, median HNR: {}\n",
        format_number(breathiness.mean_hnr_db, "dB"),
        format_number(breathiness.median_hnr_db, "dB")
    ));
    summary.push_str(&format!(
        "  Voiced: {} of {} frames\n",
        breathiness.voiced_frames, breathiness.total_frames
    ));

    summary
}
