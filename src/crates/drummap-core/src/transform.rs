use midly::num::u4;
use midly::TrackEvent;

use crate::config::ConversionConfig;
use crate::mapping::{gm_drum_name, Mapping};
use crate::note::{NoteEvent, PERCUSSION_CHANNEL};
use crate::report::TrackReport;
use crate::tracker::{DuplicateTracker, Verdict};

/// Applies the drum map and channel policy to single events
pub struct EventTransformer<'m> {
    mapping: &'m Mapping,
    config: &'m ConversionConfig,
}

impl<'m> EventTransformer<'m> {
    pub fn new(mapping: &'m Mapping, config: &'m ConversionConfig) -> Self {
        Self { mapping, config }
    }

    /// Rewrite one event. `None` means the event is dropped from the output.
    ///
    /// Only note-on and note-off events are changed; everything else comes back
    /// as given, delta included.
    pub fn transform<'a>(
        &self,
        event: &TrackEvent<'a>,
        tracker: &mut DuplicateTracker,
        report: &mut TrackReport,
    ) -> Option<TrackEvent<'a>> {
        let Some(note) = NoteEvent::from_kind(&event.kind) else {
            return Some(*event);
        };

        log::info!("Note {} time={}", note, event.delta.as_int());

        if self.config.remove_duplicates && tracker.observe(&note) == Verdict::Suppress {
            report.duplicates_suppressed += 1;
            return None;
        }

        let note = self.map_note(note, report)?;
        Some(TrackEvent {
            delta: event.delta,
            kind: note.to_kind(),
        })
    }

    fn map_note(&self, mut note: NoteEvent, report: &mut TrackReport) -> Option<NoteEvent> {
        let original = note.key.as_int();

        let Some(mapped) = self.mapping.get(note.key) else {
            report.notes_unmapped += 1;
            if self.config.discard_unmapped {
                log::debug!("Note {} not defined in drum map; discarding.", original);
                report.notes_discarded += 1;
                return None;
            }
            log::debug!("Note {} not defined in drum map; keeping original.", original);
            return Some(note);
        };

        note.key = mapped;
        report.notes_mapped += 1;

        if self.config.force_percussion || note.is_percussion() {
            log::info!(
                "Percussion channel {} is forced for note {} -> {} ({})",
                PERCUSSION_CHANNEL + 1,
                original,
                mapped.as_int(),
                gm_drum_name(mapped.as_int())
            );
            if !note.is_percussion() {
                report.percussion_reroutes += 1;
            }
            note.channel = u4::new(PERCUSSION_CHANNEL);
        }

        Some(note)
    }
}
