use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use midly::num::{u24, u28};
use midly::{MetaMessage, Smf, Timing, TrackEvent, TrackEventKind};
use tempfile::NamedTempFile;

use crate::config::{Tempo, TimeSignature};
use crate::error::{Error, Result};

/// Raw bytes of an input file; parsed tracks borrow from it
pub struct MidiSource {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl MidiSource {
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)
            .map_err(|e| Error::conversion(format!("Failed to read MIDI file: {}", path.display()), e))?;

        Ok(MidiSource {
            path: path.to_path_buf(),
            bytes,
        })
    }

    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        MidiSource {
            path: path.into(),
            bytes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parse(&self) -> Result<Smf<'_>> {
        Smf::parse(&self.bytes)
            .map_err(|e| Error::conversion(format!("Failed to parse MIDI file: {}", self.path.display()), e))
    }
}

/// Encode `smf` and move it into place at `path` in one step
///
/// Tracks are sealed with [`seal_track`] first. The bytes go to a temporary
/// file next to the destination which is then renamed over it, so a failure
/// never leaves a half-written file behind. An existing destination keeps its
/// permissions; a new one gets the usual umask-filtered mode.
pub fn write_file(path: &Path, smf: &Smf) -> Result<()> {
    let sealed = Smf {
        header: smf.header,
        tracks: smf
            .tracks
            .iter()
            .map(|track| seal_track(track))
            .collect::<Result<Vec<_>>>()?,
    };

    let mut bytes = Vec::new();
    sealed
        .write_std(&mut bytes)
        .map_err(|e| Error::conversion("Failed to encode MIDI data", e))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let context = || format!("Failed to write MIDI file: {}", path.display());

    let mut file = temp_file_in(dir).map_err(|e| Error::conversion(context(), e))?;
    file.write_all(&bytes).map_err(|e| Error::conversion(context(), e))?;
    if let Ok(existing) = fs::metadata(path) {
        file.as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| Error::conversion(context(), e))?;
    }
    file.persist(path).map_err(|e| Error::conversion(context(), e.error))?;

    Ok(())
}

fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".drummap");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Same mode a plain `File::create` asks for; the umask still applies
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

/// Largest delta a track event can hold
pub const MAX_DELTA: u32 = (1 << 28) - 1;

/// Add the ticks of dropped events onto the delta of the next kept one
///
/// Fails instead of wrapping when the sum no longer fits in a 28-bit delta.
pub fn merge_delta(carried: u64, delta: u28) -> Result<u28> {
    let total = carried.saturating_add(u64::from(delta.as_int()));
    if total > u64::from(MAX_DELTA) {
        return Err(Error::conversion(
            "Failed to merge event timing",
            format!("gap of {} ticks exceeds the largest MIDI delta ({})", total, MAX_DELTA),
        ));
    }
    Ok(u28::new(total as u32))
}

/// Make sure a track ends with exactly one end-of-track marker
///
/// Every end-of-track in the input is dropped and its delta is carried over to
/// the event that follows it; the remainder goes on the final marker.
pub fn seal_track<'a>(events: &[TrackEvent<'a>]) -> Result<Vec<TrackEvent<'a>>> {
    let mut sealed = Vec::with_capacity(events.len() + 1);
    let mut carried = 0u64;

    for event in events {
        if is_end_of_track(event) {
            carried = carried.saturating_add(u64::from(event.delta.as_int()));
            continue;
        }
        let mut event = *event;
        if carried > 0 {
            event.delta = merge_delta(carried, event.delta)?;
            carried = 0;
        }
        sealed.push(event);
    }

    sealed.push(TrackEvent {
        delta: merge_delta(carried, u28::new(0))?,
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    Ok(sealed)
}

pub fn is_end_of_track(event: &TrackEvent) -> bool {
    matches!(event.kind, TrackEventKind::Meta(MetaMessage::EndOfTrack))
}

pub fn end_of_track() -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    }
}

pub fn tempo_event(tempo: Tempo) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo.micros_per_beat()))),
    }
}

pub fn time_signature_event(ts: TimeSignature) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TimeSignature(
            ts.beats,
            ts.unit_pow2(),
            24, // MIDI clocks per metronome click
            8,  // 32nd notes per quarter note
        )),
    }
}

pub fn describe_timing(timing: &Timing) -> String {
    match timing {
        Timing::Metrical(tpb) => format!("{} ticks per beat", tpb.as_int()),
        Timing::Timecode(fps, subframe) => format!("{} fps, {} ticks per frame", fps.as_f32(), subframe),
    }
}
