use std::fmt;

use midly::num::{u4, u7};
use midly::{MidiMessage, TrackEventKind};

/// MIDI channel reserved for percussion in General MIDI (channel 10, 0-based)
pub const PERCUSSION_CHANNEL: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    On,
    Off,
}

/// A note-on or note-off, split out of the raw event once so the rest of the
/// pipeline never has to ask whether an event carries a note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub kind: NoteKind,
    pub channel: u4,
    pub key: u7,
    pub vel: u7,
}

impl NoteEvent {
    pub fn from_kind(kind: &TrackEventKind) -> Option<Self> {
        match *kind {
            TrackEventKind::Midi { channel, message: MidiMessage::NoteOn { key, vel } } => Some(NoteEvent {
                kind: NoteKind::On,
                channel,
                key,
                vel,
            }),
            TrackEventKind::Midi { channel, message: MidiMessage::NoteOff { key, vel } } => Some(NoteEvent {
                kind: NoteKind::Off,
                channel,
                key,
                vel,
            }),
            _ => None,
        }
    }

    pub fn to_kind<'a>(self) -> TrackEventKind<'a> {
        let message = match self.kind {
            NoteKind::On => MidiMessage::NoteOn { key: self.key, vel: self.vel },
            NoteKind::Off => MidiMessage::NoteOff { key: self.key, vel: self.vel },
        };
        TrackEventKind::Midi { channel: self.channel, message }
    }

    /// Note-on with velocity above zero
    pub fn is_strike(&self) -> bool {
        self.kind == NoteKind::On && self.vel.as_int() > 0
    }

    /// Note-off, or the zero-velocity note-on that stands in for one
    pub fn is_release(&self) -> bool {
        !self.is_strike()
    }

    pub fn is_percussion(&self) -> bool {
        self.channel.as_int() == PERCUSSION_CHANNEL
    }
}

impl fmt::Display for NoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            NoteKind::On => "note_on",
            NoteKind::Off => "note_off",
        };
        write!(
            f,
            "{} channel={} note={} ({}) velocity={}",
            kind,
            self.channel.as_int(),
            self.key.as_int(),
            note_num_to_str(self.key.as_int()),
            self.vel.as_int()
        )
    }
}

/// Convert a MIDI note number to a string representation (e.g., "c4", "g#5")
pub fn note_num_to_str(note_num: u8) -> String {
    const NOTE_NAMES: [&str; 12] = [
        "c", "c#", "d", "d#", "e", "f", "f#", "g", "g#", "a", "a#", "b"
    ];

    let note_name = NOTE_NAMES[(note_num % 12) as usize];
    let octave = (note_num / 12) as i32 - 1;

    format!("{}{}", note_name, octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_on(channel: u8, key: u8, vel: u8) -> TrackEventKind<'static> {
        TrackEventKind::Midi {
            channel: u4::new(channel),
            message: MidiMessage::NoteOn { key: u7::new(key), vel: u7::new(vel) },
        }
    }

    #[test]
    fn test_note_conversion() {
        assert_eq!(note_num_to_str(60), "c4"); // Middle C
        assert_eq!(note_num_to_str(36), "c1"); // Bass drum
        assert_eq!(note_num_to_str(0), "c-1");
    }

    #[test]
    fn test_classify_notes() {
        let on = NoteEvent::from_kind(&note_on(9, 36, 100)).unwrap();
        assert_eq!(on.kind, NoteKind::On);
        assert!(on.is_strike());
        assert!(on.is_percussion());

        let silent = NoteEvent::from_kind(&note_on(0, 36, 0)).unwrap();
        assert!(silent.is_release());
        assert!(!silent.is_percussion());

        let off = TrackEventKind::Midi {
            channel: u4::new(3),
            message: MidiMessage::NoteOff { key: u7::new(38), vel: u7::new(64) },
        };
        let off = NoteEvent::from_kind(&off).unwrap();
        assert_eq!(off.kind, NoteKind::Off);
        assert!(off.is_release());
    }

    #[test]
    fn test_non_notes_are_not_classified() {
        let cc = TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::Controller { controller: u7::new(7), value: u7::new(100) },
        };
        assert!(NoteEvent::from_kind(&cc).is_none());
        assert!(NoteEvent::from_kind(&TrackEventKind::Meta(midly::MetaMessage::EndOfTrack)).is_none());
    }

    #[test]
    fn test_round_trip_kind() {
        let kind = note_on(5, 42, 90);
        assert_eq!(NoteEvent::from_kind(&kind).unwrap().to_kind(), kind);
    }
}
