//! Frequency channels tracked by the analysis
//!
//! Pitch (F0) and the first four formants (F1..F4). Channel-specific
//! behavior is always looked up through [`PerChannel`], never by name.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One measured frequency channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Fundamental frequency (pitch)
    F0,
    /// First formant
    F1,
    /// Second formant
    F2,
    /// Third formant
    F3,
    /// Fourth formant
    F4,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Channel {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "f0" | "pitch" => Ok(Channel::F0),
            "f1" => Ok(Channel::F1),
            "f2" => Ok(Channel::F2),
            "f3" => Ok(Channel::F3),
            "f4" => Ok(Channel::F4),
            other => Err(AnalysisError::config(format!("unknown channel '{}'", other))),
        }
    }
}

impl Channel {
    /// All channels in ascending frequency order
    pub fn all() -> &'static [Channel] {
        &[
            Channel::F0,
            Channel::F1,
            Channel::F2,
            Channel::F3,
            Channel::F4,
        ]
    }

    /// The formant channels only
    pub fn formants() -> &'static [Channel] {
        &[Channel::F1, Channel::F2, Channel::F3, Channel::F4]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Channel::F0 => "F0",
            Channel::F1 => "F1",
            Channel::F2 => "F2",
            Channel::F3 => "F3",
            Channel::F4 => "F4",
        }
    }

    /// Formant number (1..=4) as understood by the acoustic provider, `None` for pitch
    pub fn formant_number(&self) -> Option<u8> {
        match self {
            Channel::F0 => None,
            Channel::F1 => Some(1),
            Channel::F2 => Some(2),
            Channel::F3 => Some(3),
            Channel::F4 => Some(4),
        }
    }

    /// Position of the channel inside a frame's value array
    pub fn index(&self) -> usize {
        match self {
            Channel::F0 => 0,
            Channel::F1 => 1,
            Channel::F2 => 2,
            Channel::F3 => 3,
            Channel::F4 => 4,
        }
    }
}

/// One value per channel.
///
/// Named fields keep the table exhaustive: every channel has an entry and
/// serialized forms read as `f0 = ...`, `f1 = ...`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerChannel<T> {
    pub f0: T,
    pub f1: T,
    pub f2: T,
    pub f3: T,
    pub f4: T,
}

impl<T> PerChannel<T> {
    /// Build a table by evaluating `f` for every channel
    pub fn from_fn<F: FnMut(Channel) -> T>(mut f: F) -> Self {
        Self {
            f0: f(Channel::F0),
            f1: f(Channel::F1),
            f2: f(Channel::F2),
            f3: f(Channel::F3),
            f4: f(Channel::F4),
        }
    }

    pub fn get(&self, channel: Channel) -> &T {
        match channel {
            Channel::F0 => &self.f0,
            Channel::F1 => &self.f1,
            Channel::F2 => &self.f2,
            Channel::F3 => &self.f3,
            Channel::F4 => &self.f4,
        }
    }

    pub fn get_mut(&mut self, channel: Channel) -> &mut T {
        match channel {
            Channel::F0 => &mut self.f0,
            Channel::F1 => &mut self.f1,
            Channel::F2 => &mut self.f2,
            Channel::F3 => &mut self.f3,
            Channel::F4 => &mut self.f4,
        }
    }

    /// Transform every entry, keeping the channel alongside
    pub fn map<U, F: FnMut(Channel, &T) -> U>(&self, mut f: F) -> PerChannel<U> {
        PerChannel::from_fn(|channel| f(channel, self.get(channel)))
    }

    /// Iterate `(channel, value)` in channel order
    pub fn iter(&self) -> impl Iterator<Item = (Channel, &T)> {
        Channel::all().iter().map(move |&channel| (channel, self.get(channel)))
    }
}

impl<T, E> PerChannel<std::result::Result<T, E>> {
    /// Turn a table of results into a result of a table, failing on the first error
    pub fn transpose(self) -> std::result::Result<PerChannel<T>, E> {
        Ok(PerChannel {
            f0: self.f0?,
            f1: self.f1?,
            f2: self.f2?,
            f3: self.f3?,
            f4: self.f4?,
        })
    }
}
