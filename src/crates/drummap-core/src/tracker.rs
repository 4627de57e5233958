use std::collections::HashSet;

use crate::note::NoteEvent;

/// Whether a note event may be written out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Suppress,
}

/// Remembers which (channel, note) pairs are sounding so that a second strike
/// of a note that was never released can be dropped
#[derive(Debug, Default)]
pub struct DuplicateTracker {
    sounding: HashSet<(u8, u8)>,
}

impl DuplicateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, note: &NoteEvent) -> Verdict {
        let key = (note.channel.as_int(), note.key.as_int());

        if note.is_release() {
            self.sounding.remove(&key);
            return Verdict::Pass;
        }

        if self.sounding.insert(key) {
            Verdict::Pass
        } else {
            log::info!("Duplicate note, channel='{}', note='{}'", key.0, key.1);
            Verdict::Suppress
        }
    }

    pub fn reset(&mut self) {
        self.sounding.clear();
    }

    pub fn is_sounding(&self, channel: u8, note: u8) -> bool {
        self.sounding.contains(&(channel, note))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::NoteKind;
    use midly::num::{u4, u7};

    fn note(kind: NoteKind, channel: u8, key: u8, vel: u8) -> NoteEvent {
        NoteEvent {
            kind,
            channel: u4::new(channel),
            key: u7::new(key),
            vel: u7::new(vel),
        }
    }

    #[test]
    fn test_second_strike_suppressed() {
        let mut tracker = DuplicateTracker::new();
        assert_eq!(tracker.observe(&note(NoteKind::On, 9, 36, 100)), Verdict::Pass);
        assert_eq!(tracker.observe(&note(NoteKind::On, 9, 36, 90)), Verdict::Suppress);
        assert!(tracker.is_sounding(9, 36));
    }

    #[test]
    fn test_note_off_releases() {
        let mut tracker = DuplicateTracker::new();
        tracker.observe(&note(NoteKind::On, 9, 36, 100));
        assert_eq!(tracker.observe(&note(NoteKind::Off, 9, 36, 64)), Verdict::Pass);
        assert!(!tracker.is_sounding(9, 36));
        assert_eq!(tracker.observe(&note(NoteKind::On, 9, 36, 100)), Verdict::Pass);
    }

    #[test]
    fn test_zero_velocity_releases() {
        let mut tracker = DuplicateTracker::new();
        tracker.observe(&note(NoteKind::On, 0, 38, 100));
        assert_eq!(tracker.observe(&note(NoteKind::On, 0, 38, 0)), Verdict::Pass);
        assert!(!tracker.is_sounding(0, 38));
    }

    #[test]
    fn test_release_of_silent_note_passes() {
        let mut tracker = DuplicateTracker::new();
        assert_eq!(tracker.observe(&note(NoteKind::Off, 0, 38, 0)), Verdict::Pass);
        assert!(!tracker.is_sounding(0, 38));
    }

    #[test]
    fn test_keys_are_per_channel() {
        let mut tracker = DuplicateTracker::new();
        assert_eq!(tracker.observe(&note(NoteKind::On, 0, 36, 100)), Verdict::Pass);
        assert_eq!(tracker.observe(&note(NoteKind::On, 9, 36, 100)), Verdict::Pass);
        assert_eq!(tracker.observe(&note(NoteKind::On, 0, 37, 100)), Verdict::Pass);
    }

    #[test]
    fn test_reset_forgets() {
        let mut tracker = DuplicateTracker::new();
        tracker.observe(&note(NoteKind::On, 9, 36, 100));
        tracker.reset();
        assert_eq!(tracker.observe(&note(NoteKind::On, 9, 36, 100)), Verdict::Pass);
    }
}
