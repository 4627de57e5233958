use std::fmt;
use std::ops::AddAssign;
use std::path::PathBuf;

use serde::Serialize;

/// What happened to one track during conversion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackReport {
    pub index: usize,
    pub events_in: usize,
    pub events_out: usize,
    pub notes_mapped: usize,
    pub notes_unmapped: usize,
    pub notes_discarded: usize,
    pub duplicates_suppressed: usize,
    pub percussion_reroutes: usize,
    pub meta_dropped: usize,
    pub meta_synthesized: usize,
    pub end_of_track_appended: usize,
}

impl TrackReport {
    pub fn new(index: usize) -> Self {
        TrackReport { index, ..Default::default() }
    }
}

impl AddAssign<&TrackReport> for TrackReport {
    fn add_assign(&mut self, other: &TrackReport) {
        self.events_in += other.events_in;
        self.events_out += other.events_out;
        self.notes_mapped += other.notes_mapped;
        self.notes_unmapped += other.notes_unmapped;
        self.notes_discarded += other.notes_discarded;
        self.duplicates_suppressed += other.duplicates_suppressed;
        self.percussion_reroutes += other.percussion_reroutes;
        self.meta_dropped += other.meta_dropped;
        self.meta_synthesized += other.meta_synthesized;
        self.end_of_track_appended += other.end_of_track_appended;
    }
}

/// Summary of a whole conversion run, serializable for `--report-json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub timing: String,
    pub tracks: Vec<TrackReport>,
}

impl ConversionReport {
    /// Counters summed over all tracks; `index` carries no meaning here, use
    /// `tracks.len()` for the track count
    pub fn totals(&self) -> TrackReport {
        let mut totals = TrackReport::default();
        for track in &self.tracks {
            totals += track;
        }
        totals
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let totals = self.totals();
        write!(
            f,
            "{} track(s), {} -> {} events; {} notes mapped, {} unmapped, {} discarded, {} duplicates removed, {} moved to percussion",
            self.tracks.len(),
            totals.events_in,
            totals.events_out,
            totals.notes_mapped,
            totals.notes_unmapped,
            totals.notes_discarded,
            totals.duplicates_suppressed,
            totals.percussion_reroutes,
        )
    }
}
