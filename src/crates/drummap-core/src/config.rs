use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};

/// Valid denominators for a time signature
pub const BEAT_UNITS: [u8; 6] = [1, 2, 4, 8, 16, 32];

/// Tempo override in beats per minute, limited to 20-300
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tempo(u16);

impl Tempo {
    pub const MIN_BPM: u32 = 20;
    pub const MAX_BPM: u32 = 300;

    pub fn new(bpm: u32) -> Result<Self> {
        if (Self::MIN_BPM..=Self::MAX_BPM).contains(&bpm) {
            Ok(Tempo(bpm as u16))
        } else {
            Err(Error::TempoOutOfRange(bpm))
        }
    }

    pub fn bpm(&self) -> u16 {
        self.0
    }

    /// Microseconds per quarter note, as stored in a Set Tempo meta event
    pub fn micros_per_beat(&self) -> u32 {
        (60_000_000.0 / self.0 as f64).round() as u32
    }
}

/// Time signature override, e.g. 7/4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSignature {
    pub beats: u8,
    pub unit: u8,
}

impl TimeSignature {
    pub fn new(beats: u8, unit: u8) -> Result<Self> {
        if beats < 1 {
            return Err(Error::InvalidTimeSignature(format!(
                "beats-per-bar must be >= 1, got {}",
                beats
            )));
        }
        if !BEAT_UNITS.contains(&unit) {
            return Err(Error::InvalidTimeSignature(format!(
                "beat unit {} is not one of {:?}",
                unit, BEAT_UNITS
            )));
        }
        Ok(TimeSignature { beats, unit })
    }

    /// Denominator as the power of two that MIDI stores
    pub fn unit_pow2(&self) -> u8 {
        self.unit.trailing_zeros() as u8
    }
}

impl FromStr for TimeSignature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || {
            Error::InvalidTimeSignature(format!("'{}'. Expected format: N/D (e.g. 4/4)", s))
        };

        let (beats, unit) = s.split_once('/').ok_or_else(malformed)?;
        let is_number = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
        if !is_number(beats) || !is_number(unit) {
            return Err(malformed());
        }

        // Digits only, so a parse failure means the value is too large for a MIDI byte
        let beats: u8 = beats.parse().map_err(|_| {
            Error::InvalidTimeSignature(format!("beats-per-bar {} is too large", beats))
        })?;
        let unit: u8 = unit.parse().map_err(|_| {
            Error::InvalidTimeSignature(format!("beat unit {} is not one of {:?}", unit, BEAT_UNITS))
        })?;

        TimeSignature::new(beats, unit)
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats, self.unit)
    }
}

/// How long the duplicate-note tracker remembers sounding notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateScope {
    /// One tracker for the whole file; duplicates are detected across tracks
    #[default]
    File,
    /// Tracker is cleared before every track
    Track,
}

impl FromStr for DuplicateScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(DuplicateScope::File),
            "track" => Ok(DuplicateScope::Track),
            other => Err(format!("unknown duplicate scope '{}', expected file or track", other)),
        }
    }
}

/// Settings for one conversion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionConfig {
    pub tempo: Option<Tempo>,
    pub time_signature: Option<TimeSignature>,
    /// Move every mapped note onto the percussion channel
    pub force_percussion: bool,
    /// Keep source meta events instead of replacing them
    pub preserve_meta: bool,
    pub remove_duplicates: bool,
    /// Drop note events whose note is not in the drum map
    pub discard_unmapped: bool,
    pub duplicate_scope: DuplicateScope,
}
