//! Summary statistics
//!
//! Channel statistics (average and bounded low/high) are computed over
//! filtered tracks. The intonation and breathiness blocks work directly on
//! the raw pitch and harmonicity streams with their own voicing rules.

pub mod breathiness;
pub mod channel;
pub mod descriptive;
pub mod intonation;

pub use breathiness::{breathiness_statistics, BreathinessStatistics};
pub use channel::{ChannelStatistics, TrackStatistics};
pub use intonation::{intonation_statistics, try_intonation_statistics, IntonationStatistics};
