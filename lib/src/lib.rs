//! Vocal Analysis Library
//!
//! Turns per-frame pitch and formant measurements of a recorded utterance
//! into cleaned frequency tracks and summary statistics. Measurements come
//! from an [`AcousticProvider`]; the engine assembles complete frames,
//! gates every channel for plausibility and continuity, and summarises
//! the surviving tracks together with intonation and breathiness figures
//! taken from the raw pitch and harmonicity streams.

pub mod channel;
pub mod config;
pub mod error;
pub mod frames;
pub mod processor;
pub mod provider;
pub mod serde_nan;
pub mod statistics;
#[cfg(feature = "sqlite")]
pub mod store;
pub mod track_filter;
pub mod utils;
#[cfg(feature = "image")]
pub mod visualization;

pub use channel::{Channel, PerChannel};
pub use config::{AnalysisConfig, ContinuityUnit, FilterConfig, ResetPolicy};
pub use error::AnalysisError;
pub use frames::Frame;
pub use processor::{AnalysisReport, VocalAnalyzer};
pub use provider::{AcousticProvider, MeasurementTable};
pub use track_filter::{Track, TrackFilter};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
///
/// Sets up logging. Verbosity follows `RUST_LOG`. Safe to call more than
/// once; later calls are ignored.
pub fn init() {
    #[cfg(feature = "env_logger")]
    {
        let _ = env_logger::try_init();
    }
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
