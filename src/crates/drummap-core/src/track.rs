use midly::num::u28;
use midly::{TrackEvent, TrackEventKind};

use crate::config::ConversionConfig;
use crate::error::Result;
use crate::mapping::Mapping;
use crate::midi::{end_of_track, is_end_of_track, merge_delta, tempo_event, time_signature_event};
use crate::report::TrackReport;
use crate::tracker::DuplicateTracker;
use crate::transform::EventTransformer;

/// Rewrites the events of one track at a time
pub struct TrackRewriter<'m> {
    transformer: EventTransformer<'m>,
    config: &'m ConversionConfig,
}

impl<'m> TrackRewriter<'m> {
    pub fn new(mapping: &'m Mapping, config: &'m ConversionConfig) -> Self {
        Self {
            transformer: EventTransformer::new(mapping, config),
            config,
        }
    }

    /// Rewrite one track. Dropped events hand their delta on to the next event
    /// that is written, so everything after them keeps its absolute position.
    /// Fails if a carried gap grows past the largest delta MIDI can store.
    pub fn rewrite<'a>(
        &self,
        track_index: usize,
        events: &[TrackEvent<'a>],
        tracker: &mut DuplicateTracker,
    ) -> Result<(Vec<TrackEvent<'a>>, TrackReport)> {
        let mut report = TrackReport::new(track_index);
        report.events_in = events.len();

        let mut output: Vec<TrackEvent<'a>> = self.header_events(track_index);
        report.meta_synthesized = output.len();
        output.reserve(events.len() + 1);

        let mut carried = 0u64;
        for event in events {
            let kept = match event.kind {
                TrackEventKind::Meta(meta) => {
                    if self.config.preserve_meta {
                        Some(*event)
                    } else {
                        log::debug!(
                            "Skipping meta message {:?} (preserve_meta={}).",
                            meta,
                            self.config.preserve_meta
                        );
                        report.meta_dropped += 1;
                        None
                    }
                }
                _ => self.transformer.transform(event, tracker, &mut report),
            };

            match kept {
                Some(mut event) => {
                    event.delta = merge_delta(carried, event.delta)?;
                    carried = 0;
                    output.push(event);
                }
                None => carried = carried.saturating_add(u64::from(event.delta.as_int())),
            }
        }

        if self.config.preserve_meta {
            output.push(TrackEvent {
                delta: merge_delta(carried, u28::new(0))?,
                ..end_of_track()
            });
            report.end_of_track_appended = 1;

            // The source track usually has its own marker already, which leaves two
            let markers = output.iter().filter(|e| is_end_of_track(e)).count();
            if markers > 1 {
                log::warn!(
                    "Track {} has {} end-of-track markers after preserving meta events",
                    track_index,
                    markers
                );
            }
        } else if carried > 0 {
            log::debug!("Track {}: {} trailing ticks of dropped events not carried", track_index, carried);
        }

        report.events_out = output.len();
        Ok((output, report))
    }

    /// Tempo and time signature overrides, written at the start of the first track
    /// only when source meta events are being replaced
    fn header_events(&self, track_index: usize) -> Vec<TrackEvent<'static>> {
        let mut events = Vec::new();
        if track_index != 0 || self.config.preserve_meta {
            return events;
        }

        if let Some(tempo) = self.config.tempo {
            events.push(tempo_event(tempo));
        }
        if let Some(ts) = self.config.time_signature {
            events.push(time_signature_event(ts));
        }
        events
    }
}
