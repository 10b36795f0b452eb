//! Track filtering
//!
//! Turns an assembled frame sequence into one cleaned track per channel.
//! Each channel runs its own two-stage gate: zero/undetected samples are
//! dropped, then a small state machine checks plausibility and continuity
//! against the last accepted sample. With the agreement gate enabled the
//! channels are filtered frame by frame and F0 is only kept when enough
//! formants agree.

pub mod filter;
pub mod gate;
pub mod track;

pub use filter::{FilterOutput, FilterReport, RejectionCounts, TrackFilter};
pub use gate::{AnchorState, ChannelGate, GateDecision, Rejection};
pub use track::Track;
