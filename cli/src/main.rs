//! Vocal Analysis CLI
//!
//! Command-line interface for the vocal analysis library.
//! Provides an interactive shell and a batch mode over JSON measurement files.

use std::process;

use clap::{Arg, ArgAction, ArgMatches, Command};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use vocal_analysis_lib::{
    config::{presets, AgreementGate, ContinuityUnit, ExtremumPolicy, Precision, ResetPolicy},
    processor::VocalAnalyzer,
    provider::MeasurementTable,
    utils, AcousticProvider, AnalysisConfig, Channel, Result,
};

#[cfg(feature = "sqlite")]
use vocal_analysis_lib::store::{AnalysisStore, SqliteStore};
#[cfg(feature = "image")]
use vocal_analysis_lib::visualization::{PlotRenderer, TrackRenderer};

/// Application state
struct AppState {
    analyzer: VocalAnalyzer,
    table: Option<MeasurementTable>,
    current_file: Option<String>,
}

impl AppState {
    fn new() -> Self {
        Self {
            analyzer: VocalAnalyzer::new(),
            table: None,
            current_file: None,
        }
    }
}

/// Print the help message showing available commands
fn print_help() {
    println!("Available commands:");
    println!("  load <filename>                    - Load a JSON measurement file and analyze it");
    println!("  analyze                            - Re-analyze the loaded measurements with current settings");
    println!("  config                             - Show current analysis configuration");
    println!("  set <parameter> <value...>         - Change a configuration value");
    println!("  preset <name|number>               - Load a configuration preset");
    println!("  presets                            - List available presets");
    println!("  tracks [channel]                   - Show track lengths, or one channel's samples");
    println!("  stats                              - Show per-channel statistics and rejection counts");
    println!("  intonation                         - Show intonation statistics");
    println!("  breathiness                        - Show breathiness statistics");
    println!("  report                             - Show the full analysis summary");
    println!("  plot <filename>                    - Render the tracks to a PNG image");
    println!("  save <database>                    - Store the analysis in a SQLite database");
    println!("  latest <database>                  - Show the most recently stored analysis");
    println!("  clear-db <database>                - Delete every stored analysis");
    println!("  export <filename>                  - Write the analysis as JSON");
    println!("  status                             - Show analyzer status");
    println!("  help                               - Show this help message");
    println!("  quit                               - Exit the program");
    println!();
    println!("Parameters for 'set':");
    print_set_parameters();
    println!();
    println!("Examples:");
    println!("  load take1.json");
    println!("  set unit semitones");
    println!("  set band f1 300 850");
    println!("  preset synchronized");
    println!("  analyze");
    println!("  plot take1.png");
    println!("  save vocal_analysis.db");
}

fn print_set_parameters() {
    println!("  unit <hz|semitones>                - Continuity unit (canonical thresholds)");
    println!("  reset <strict|lenient>             - Anchor reset policy on rejection");
    println!("  spacing <seconds|off>              - Minimum spacing between accepted samples");
    println!("  agreement <1-4|off>                - Formants that must agree with F0 (synchronized mode)");
    println!("  rate <st_per_s|off>                - F0 rate gate in semitones per second");
    println!("  precision <whole|decimals>         - Rounding of assembled frame values");
    println!("  time_step <seconds>                - Frame grid step");
    println!("  extremum <seed|in_band>            - Low/high policy when nothing is in band");
    println!("  band <channel> <low> <high>        - Plausibility band in Hz");
    println!("  threshold <channel> <value>        - Continuity threshold in the channel's unit");
    println!("  floor <hz> / ceiling <hz>          - Intonation voicing band");
}

fn parse_number(value: &str) -> std::result::Result<f64, String> {
    value
        .parse::<f64>()
        .map_err(|_| format!("Invalid number: {}", value))
}

fn parse_optional(value: &str) -> std::result::Result<Option<f64>, String> {
    match value {
        "off" | "none" => Ok(None),
        _ => parse_number(value).map(Some),
    }
}

fn parse_channel(value: &str) -> std::result::Result<Channel, String> {
    value.parse::<Channel>().map_err(|e| e.to_string())
}

/// Apply one `set` command to a copy of the configuration
fn apply_setting(
    config: &mut AnalysisConfig,
    param: &str,
    args: &[&str],
) -> std::result::Result<String, String> {
    let value = args
        .first()
        .copied()
        .ok_or_else(|| format!("Missing value for {}", param))?;

    match param {
        "unit" => {
            let unit = match value {
                "hz" | "hertz" => ContinuityUnit::Hertz,
                "st" | "semitones" => ContinuityUnit::Semitones,
                _ => return Err(format!("Invalid unit: {}", value)),
            };
            config.filter.set_continuity_unit(unit);
            Ok(format!("Continuity measured in {}", unit.name()))
        }
        "reset" => {
            config.filter.reset_policy = match value {
                "strict" => ResetPolicy::Strict,
                "lenient" => ResetPolicy::Lenient,
                _ => return Err(format!("Invalid reset policy: {}", value)),
            };
            Ok(format!("Reset policy set to {:?}", config.filter.reset_policy))
        }
        "spacing" => {
            config.filter.min_spacing = parse_optional(value)?;
            Ok(format!("Minimum spacing: {:?}", config.filter.min_spacing))
        }
        "agreement" => {
            config.filter.agreement = match value {
                "off" | "none" => None,
                _ => Some(AgreementGate {
                    min_formants: value
                        .parse::<usize>()
                        .map_err(|_| format!("Invalid formant count: {}", value))?,
                }),
            };
            Ok(format!("Agreement gate: {:?}", config.filter.agreement))
        }
        "rate" => {
            config.filter.channels.f0.max_rate_semitones_per_second = parse_optional(value)?;
            Ok(format!(
                "F0 rate gate: {:?}",
                config.filter.channels.f0.max_rate_semitones_per_second
            ))
        }
        "precision" => {
            config.precision = match value {
                "whole" | "whole_hz" => Precision::WholeHz,
                _ => Precision::Decimals(
                    value
                        .parse::<u8>()
                        .map_err(|_| format!("Invalid precision: {}", value))?,
                ),
            };
            Ok(format!("Precision: {:?}", config.precision))
        }
        "time_step" => {
            config.time_step = parse_number(value)?;
            Ok(format!("Frame time step: {}s", config.time_step))
        }
        "extremum" => {
            config.statistics.extremum_policy = match value {
                "seed" | "seed_fallback" => ExtremumPolicy::SeedFallback,
                "in_band" | "in_band_only" => ExtremumPolicy::InBandOnly,
                _ => return Err(format!("Invalid extremum policy: {}", value)),
            };
            Ok(format!("Extremum policy: {:?}", config.statistics.extremum_policy))
        }
        "band" => {
            if args.len() != 3 {
                return Err("Usage: set band <channel> <low> <high>".to_string());
            }
            let channel = parse_channel(args[0])?;
            let settings = config.filter.channels.get_mut(channel);
            settings.plausibility.low = parse_number(args[1])?;
            settings.plausibility.high = parse_number(args[2])?;
            Ok(format!("{} plausibility band: [{}, {}) Hz", channel, args[1], args[2]))
        }
        "threshold" => {
            if args.len() != 2 {
                return Err("Usage: set threshold <channel> <value>".to_string());
            }
            let channel = parse_channel(args[0])?;
            let continuity = &mut config.filter.channels.get_mut(channel).continuity;
            continuity.threshold = parse_number(args[1])?;
            Ok(format!(
                "{} continuity threshold: {} {}",
                channel,
                continuity.threshold,
                continuity.unit.name()
            ))
        }
        "floor" => {
            config.intonation.floor = parse_number(value)?;
            Ok(format!("Intonation floor: {} Hz", config.intonation.floor))
        }
        "ceiling" => {
            config.intonation.ceiling = parse_number(value)?;
            Ok(format!("Intonation ceiling: {} Hz", config.intonation.ceiling))
        }
        _ => Err(format!("Unknown parameter: {}", param)),
    }
}

fn print_config(config: &AnalysisConfig) {
    println!("Current Analysis Configuration:");
    println!("  Frame time step: {}s", config.time_step);
    println!("  Precision: {:?}", config.precision);
    println!("  Reset policy: {:?}", config.filter.reset_policy);
    println!("  Minimum spacing: {:?}", config.filter.min_spacing);
    println!("  Agreement gate: {:?}", config.filter.agreement);
    println!("  Extremum policy: {:?}", config.statistics.extremum_policy);
    println!("  Channels:");
    for (channel, settings) in config.filter.channels.iter() {
        println!(
            "    {}: band [{}, {}) Hz, continuity < {} {}{}, extrema ({}, {})",
            channel,
            settings.plausibility.low,
            settings.plausibility.high,
            settings.continuity.threshold,
            settings.continuity.unit.name(),
            settings
                .max_rate_semitones_per_second
                .map(|rate| format!(", rate <= {} st/s", rate))
                .unwrap_or_default(),
            settings.extremum.floor,
            settings.extremum.ceiling
        );
    }
    println!(
        "  Intonation: step {}s, voicing [{}, {}] Hz, reference {} Hz, min {} frames",
        config.intonation.time_step,
        config.intonation.floor,
        config.intonation.ceiling,
        config.intonation.reference_hz,
        config.intonation.min_voiced_frames
    );
    println!(
        "  Breathiness: step {}s, unvoiced sentinel {} dB",
        config.breathiness.time_step, config.breathiness.unvoiced_sentinel_db
    );
}

fn load_file(state: &mut AppState, filename: &str) -> Result<()> {
    let table = utils::load_and_analyze(&mut state.analyzer, filename)?;
    state.table = Some(table);
    state.current_file = Some(filename.to_string());
    Ok(())
}

#[cfg(feature = "image")]
fn plot_tracks(state: &AppState, filename: &str) -> Result<()> {
    match state.analyzer.report() {
        Some(report) => PlotRenderer::new().save(&report.tracks, filename),
        None => Err(vocal_analysis_lib::AnalysisError::empty("plot")),
    }
}

#[cfg(feature = "sqlite")]
fn save_to_database(state: &AppState, filename: &str) -> Result<i64> {
    let report = state
        .analyzer
        .report()
        .ok_or_else(|| vocal_analysis_lib::AnalysisError::empty("database record"))?;

    #[cfg(feature = "image")]
    let png = PlotRenderer::new().render(&report.tracks)?;
    #[cfg(not(feature = "image"))]
    let png: Vec<u8> = Vec::new();

    let mut store = SqliteStore::open(filename)?;
    store.persist(report, &png)
}

#[cfg(feature = "sqlite")]
fn describe_latest(filename: &str) -> Result<Option<String>> {
    let store = SqliteStore::open(filename)?;
    let Some(record) = store.load_latest()? else {
        return Ok(None);
    };

    let mut text = format!("Record {} stored at {}\n", record.id, record.timestamp);
    for &channel in Channel::all() {
        let average = (*record.averages.get(channel))
            .map(utils::format_frequency)
            .unwrap_or_else(|| "-".to_string());
        text.push_str(&format!(
            "  {}: {} samples, avg {}\n",
            channel,
            record.tracks.get(channel).len(),
            average
        ));
    }
    text.push_str(&format!("  Plot: {} bytes", record.scatter_plot.len()));
    Ok(Some(text))
}

#[cfg(feature = "sqlite")]
fn clear_database(filename: &str) -> Result<usize> {
    SqliteStore::open(filename)?.clear()
}

fn export_report(state: &AppState, filename: &str) -> Result<()> {
    match state.analyzer.report() {
        Some(report) => utils::write_report_json(filename, report),
        None => Err(vocal_analysis_lib::AnalysisError::empty("export")),
    }
}

/// Process a user command
fn process_command(command: &str, state: &mut AppState) {
    let parts: Vec<&str> = command.split_whitespace().collect();

    if parts.is_empty() {
        return;
    }
    log::debug!("Command: {}", command);

    match parts[0] {
        "load" => {
            if parts.len() != 2 {
                println!("Usage: load <filename>");
                return;
            }

            let filename = parts[1];
            println!("Loading file: {}", filename);

            match load_file(state, filename) {
                Ok(_) => {
                    println!("File loaded successfully!");
                    if let Some(report) = state.analyzer.report() {
                        println!("{}", utils::analysis_summary(report));
                    }
                }
                Err(e) => println!("Error loading file: {}", e),
            }
        }

        "analyze" => {
            let Some(table) = &state.table else {
                println!("No measurements loaded. Load a file first.");
                return;
            };

            println!("Re-analyzing measurements with current configuration...");
            match state.analyzer.analyze(table) {
                Ok(report) => {
                    println!("Analysis complete!");
                    println!("{}", utils::analysis_summary(report));
                }
                Err(e) => println!("Error during analysis: {}", e),
            }
        }

        "config" => print_config(state.analyzer.config()),

        "set" => {
            if parts.len() < 3 {
                println!("Usage: set <parameter> <value...>");
                print_set_parameters();
                return;
            }

            let mut config = state.analyzer.config().clone();
            match apply_setting(&mut config, parts[1], &parts[2..]) {
                Ok(message) => match state.analyzer.set_config(config) {
                    Ok(_) => {
                        println!("{}", message);
                        if state.table.is_some() {
                            println!("Run 'analyze' to apply the new settings");
                        }
                    }
                    Err(e) => println!("Invalid configuration: {}", e),
                },
                Err(e) => println!("{}", e),
            }
        }

        "preset" => {
            if parts.len() != 2 {
                println!("Usage: preset <name|number>");
                return;
            }

            match presets::by_name(parts[1]) {
                Ok(config) => match state.analyzer.set_config(config) {
                    Ok(_) => println!("Applied preset {}", parts[1]),
                    Err(e) => println!("Invalid preset configuration: {}", e),
                },
                Err(e) => println!("{}", e),
            }
        }

        "presets" => {
            println!("Available presets:");
            for preset in presets::all_presets() {
                println!("  {}: {} - {}", preset.id, preset.name, preset.description);
            }
        }

        "tracks" => {
            let Some(report) = state.analyzer.report() else {
                println!("No analysis available");
                return;
            };

            match parts.get(1) {
                Some(name) => match parse_channel(name) {
                    Ok(channel) => {
                        let track = report.tracks.get(channel);
                        println!("{} track ({} samples):", channel, track.len());
                        for (time, value) in track.points() {
                            println!("  {:>8.3}s  {}", time, utils::format_frequency(value));
                        }
                    }
                    Err(e) => println!("{}", e),
                },
                None => {
                    for (channel, track) in report.tracks.iter() {
                        println!("  {}: {} samples", channel, track.len());
                    }
                }
            }
        }

        "stats" => {
            let Some(report) = state.analyzer.report() else {
                println!("No analysis available");
                return;
            };

            println!("Channel statistics:");
            for &channel in Channel::all() {
                match report.channels.get(channel) {
                    Some(stats) => println!("  {}: {}", channel, stats),
                    None => println!("  {}: empty track", channel),
                }
            }
            println!("Rejections ({} frames):", report.filter.frames);
            for (channel, counts) in report.filter.channels.iter() {
                println!(
                    "  {}: kept {}, silent {}, out of band {}, discontinuous {}, too fast {}, too dense {}, disagreement {}",
                    channel,
                    counts.accepted,
                    counts.silent,
                    counts.out_of_band,
                    counts.discontinuous,
                    counts.too_fast,
                    counts.too_dense,
                    counts.disagreement
                );
            }
        }

        "intonation" => match state.analyzer.report() {
            Some(report) => {
                let stats = &report.intonation;
                if !stats.is_defined() {
                    println!(
                        "Insufficient voiced frames ({} of {})",
                        stats.voiced_frames, stats.total_frames
                    );
                    return;
                }
                println!("Intonation:");
                println!("  Mean: {}", utils::format_frequency(stats.mean_hz));
                println!("  SD: {:.2} Hz / {:.2} st", stats.sd_hz, stats.sd_semitones);
                println!(
                    "  Min/Max: {} / {}",
                    utils::format_frequency(stats.min_hz),
                    utils::format_frequency(stats.max_hz)
                );
                println!(
                    "  P5/P95: {} / {}",
                    utils::format_frequency(stats.p5_hz),
                    utils::format_frequency(stats.p95_hz)
                );
                println!(
                    "  Range: {:.2} st (P5-P95 {:.2} st)",
                    stats.range_semitones, stats.range_semitones_p5_p95
                );
                println!("  Slope: {:.2} st/s", stats.slope_semitones_per_second);
                println!("  Voiced fraction: {:.3}", stats.voiced_fraction);
            }
            None => println!("No analysis available"),
        },

        "breathiness" => match state.analyzer.report() {
            Some(report) => {
                let stats = &report.breathiness;
                println!("Breathiness:");
                println!("  Mean HNR: {:.2} dB", stats.mean_hnr_db);
                println!("  Median HNR: {:.2} dB", stats.median_hnr_db);
                println!(
                    "  Voiced: {} of {} frames ({:.3})",
                    stats.voiced_frames, stats.total_frames, stats.voiced_fraction
                );
            }
            None => println!("No analysis available"),
        },

        "report" => match state.analyzer.report() {
            Some(report) => println!("{}", utils::analysis_summary(report)),
            None => println!("No analysis available"),
        },

        "plot" => {
            if parts.len() != 2 {
                println!("Usage: plot <filename>");
                return;
            }

            #[cfg(feature = "image")]
            {
                match plot_tracks(state, parts[1]) {
                    Ok(_) => println!("Plot saved to {}", parts[1]),
                    Err(e) => println!("Error generating plot: {}", e),
                }
            }

            #[cfg(not(feature = "image"))]
            {
                println!("Plot generation requires the 'image' feature to be enabled.");
            }
        }

        "save" => {
            if parts.len() != 2 {
                println!("Usage: save <database>");
                return;
            }

            #[cfg(feature = "sqlite")]
            {
                match save_to_database(state, parts[1]) {
                    Ok(id) => println!("Stored analysis as record {} in {}", id, parts[1]),
                    Err(e) => println!("Error saving analysis: {}", e),
                }
            }

            #[cfg(not(feature = "sqlite"))]
            {
                println!("Database storage requires the 'sqlite' feature to be enabled.");
            }
        }

        "latest" => {
            if parts.len() != 2 {
                println!("Usage: latest <database>");
                return;
            }

            #[cfg(feature = "sqlite")]
            {
                match describe_latest(parts[1]) {
                    Ok(Some(text)) => println!("{}", text),
                    Ok(None) => println!("No analyses stored in {}", parts[1]),
                    Err(e) => println!("Error reading database: {}", e),
                }
            }

            #[cfg(not(feature = "sqlite"))]
            {
                println!("Database storage requires the 'sqlite' feature to be enabled.");
            }
        }

        "clear-db" => {
            if parts.len() != 2 {
                println!("Usage: clear-db <database>");
                return;
            }

            #[cfg(feature = "sqlite")]
            {
                match clear_database(parts[1]) {
                    Ok(removed) => println!("Removed {} stored analyses from {}", removed, parts[1]),
                    Err(e) => println!("Error clearing database: {}", e),
                }
            }

            #[cfg(not(feature = "sqlite"))]
            {
                println!("Database storage requires the 'sqlite' feature to be enabled.");
            }
        }

        "export" => {
            if parts.len() != 2 {
                println!("Usage: export <filename>");
                return;
            }

            match export_report(state, parts[1]) {
                Ok(_) => println!("Report exported to {}", parts[1]),
                Err(e) => println!("Error exporting report: {}", e),
            }
        }

        "status" => {
            println!("Analyzer Status:");
            println!(
                "  Measurements loaded: {}",
                if state.table.is_some() { "Yes" } else { "No" }
            );
            if let Some(table) = &state.table {
                println!("  Duration: {}", utils::format_time(table.duration()));
            }
            println!(
                "  Analysis: {}",
                if state.analyzer.has_analysis() {
                    "Yes"
                } else {
                    "No"
                }
            );

            if let Some(filename) = &state.current_file {
                println!("  Current file: {}", filename);
            }

            if let Some(frames) = state.analyzer.frames() {
                println!("  Complete frames: {}", frames.len());
            }

            if let Some(report) = state.analyzer.report() {
                println!("  Tracked channels: {} of 5", report.tracked_channels());
            }
        }

        "help" => print_help(),

        "quit" | "exit" => {
            println!("Goodbye!");
            process::exit(0);
        }

        _ => {
            println!("Unknown command: '{}'", parts[0]);
            println!("Type 'help' for available commands");
        }
    }
}

/// Run the outputs requested on the command line; true when all succeeded
fn run_requested_outputs(matches: &ArgMatches, state: &AppState) -> bool {
    let mut ok = true;

    if let Some(filename) = matches.get_one::<String>("plot") {
        #[cfg(feature = "image")]
        {
            match plot_tracks(state, filename) {
                Ok(_) => println!("Plot saved to {}", filename),
                Err(e) => {
                    eprintln!("Error generating plot: {}", e);
                    ok = false;
                }
            }
        }

        #[cfg(not(feature = "image"))]
        {
            eprintln!("Plot generation not available for {}", filename);
            ok = false;
        }
    }

    if let Some(filename) = matches.get_one::<String>("db") {
        #[cfg(feature = "sqlite")]
        {
            match save_to_database(state, filename) {
                Ok(id) => println!("Stored analysis as record {} in {}", id, filename),
                Err(e) => {
                    eprintln!("Error saving analysis: {}", e);
                    ok = false;
                }
            }
        }

        #[cfg(not(feature = "sqlite"))]
        {
            eprintln!("Database storage not available for {}", filename);
            ok = false;
        }
    }

    if let Some(filename) = matches.get_one::<String>("export") {
        match export_report(state, filename) {
            Ok(_) => println!("Report exported to {}", filename),
            Err(e) => {
                eprintln!("Error exporting report: {}", e);
                ok = false;
            }
        }
    }

    ok
}

fn main() {
    // Parse command line arguments
    let matches = Command::new("Vocal Analysis")
        .version(vocal_analysis_lib::VERSION)
        .about("Pitch and formant track filtering and voice statistics")
        .arg(
            Arg::new("file")
                .help("JSON measurement file to load on startup")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML configuration file")
                .value_name("TOML"),
        )
        .arg(
            Arg::new("preset")
                .long("preset")
                .short('p')
                .help("Configuration preset (independent_hz, independent_semitones, strict_semitones, synchronized)")
                .value_name("NAME")
                .conflicts_with("config"),
        )
        .arg(
            Arg::new("batch")
                .long("batch")
                .short('b')
                .help("Analyze FILE, print the summary, write requested outputs and exit")
                .action(ArgAction::SetTrue)
                .requires("file"),
        )
        .arg(
            Arg::new("plot")
                .long("plot")
                .help("Write the track plot to this PNG file")
                .value_name("PNG"),
        )
        .arg(
            Arg::new("db")
                .long("db")
                .help("Store the analysis in this SQLite database")
                .value_name("SQLITE"),
        )
        .arg(
            Arg::new("export")
                .long("export")
                .help("Write the analysis report as JSON")
                .value_name("JSON"),
        )
        .get_matches();

    // Initialize the library
    vocal_analysis_lib::init();

    let batch = matches.get_flag("batch");
    if !batch {
        println!("Vocal Analysis v{}", vocal_analysis_lib::VERSION);
        println!("Type 'help' for available commands\n");
    }

    let mut state = AppState::new();

    // Apply command line configuration
    let config = if let Some(path) = matches.get_one::<String>("config") {
        AnalysisConfig::load(path)
    } else if let Some(name) = matches.get_one::<String>("preset") {
        presets::by_name(name)
    } else {
        Ok(AnalysisConfig::default())
    };

    match config.and_then(|config| state.analyzer.set_config(config)) {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            process::exit(2);
        }
    }

    // Load file from command line if provided
    if let Some(filename) = matches.get_one::<String>("file") {
        println!("Loading file: {}", filename);
        match load_file(&mut state, filename) {
            Ok(_) => {
                if let Some(report) = state.analyzer.report() {
                    println!("{}", utils::analysis_summary(report));
                }
                let outputs_ok = run_requested_outputs(&matches, &state);
                if batch {
                    process::exit(if outputs_ok { 0 } else { 1 });
                }
            }
            Err(e) => {
                eprintln!("Error loading file: {}", e);
                if batch {
                    process::exit(1);
                }
            }
        }
    }

    // Setup readline
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Failed to create readline: {}", e);
            process::exit(1);
        }
    };

    // Main command loop
    loop {
        let readline = rl.readline("vocal> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    rl.add_history_entry(trimmed).ok();
                    process_command(trimmed, &mut state);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
}
