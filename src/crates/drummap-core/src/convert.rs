use std::path::Path;

use midly::Smf;

use crate::config::{ConversionConfig, DuplicateScope};
use crate::error::Result;
use crate::mapping::Mapping;
use crate::midi::{describe_timing, write_file, MidiSource};
use crate::report::ConversionReport;
use crate::track::TrackRewriter;
use crate::tracker::DuplicateTracker;

/// Drives one conversion run over every track of a file
///
/// Each run owns its duplicate tracker. The mapping is only borrowed, so one
/// mapping can back any number of converters.
pub struct Converter<'m> {
    mapping: &'m Mapping,
    config: &'m ConversionConfig,
}

impl<'m> Converter<'m> {
    pub fn new(mapping: &'m Mapping, config: &'m ConversionConfig) -> Self {
        Self { mapping, config }
    }

    /// Convert `infile` and write the result to `outfile`
    pub fn convert(&self, infile: &Path, outfile: &Path) -> Result<ConversionReport> {
        let source = MidiSource::from_file(infile)?;
        let smf = source.parse()?;

        let (output, mut report) = self.convert_smf(&smf)?;
        report.input = infile.to_path_buf();
        report.output = outfile.to_path_buf();

        write_file(outfile, &output)?;
        log::info!("New MIDI file saved as: {}", outfile.display());

        Ok(report)
    }

    /// Rewrite every track of a parsed file; header format and timing are kept
    pub fn convert_smf<'a>(&self, smf: &Smf<'a>) -> Result<(Smf<'a>, ConversionReport)> {
        let rewriter = TrackRewriter::new(self.mapping, self.config);
        let mut tracker = DuplicateTracker::new();
        let mut output = Smf::new(smf.header);
        let mut reports = Vec::with_capacity(smf.tracks.len());

        for (track_index, track) in smf.tracks.iter().enumerate() {
            if self.config.duplicate_scope == DuplicateScope::Track {
                tracker.reset();
            }
            let (events, report) = rewriter.rewrite(track_index, track, &mut tracker)?;
            log::debug!(
                "Track {}: {} events in, {} events out",
                track_index,
                report.events_in,
                report.events_out
            );
            output.tracks.push(events);
            reports.push(report);
        }

        let report = ConversionReport {
            input: Default::default(),
            output: Default::default(),
            timing: describe_timing(&smf.header.timing),
            tracks: reports,
        };
        Ok((output, report))
    }
}

/// Convenience wrapper around [`Converter::convert`]
pub fn convert(
    mapping: &Mapping,
    infile: &Path,
    outfile: &Path,
    config: &ConversionConfig,
) -> Result<ConversionReport> {
    Converter::new(mapping, config).convert(infile, outfile)
}
