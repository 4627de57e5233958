//! Drum map: a note-number to note-number lookup read from CSV-like rows
//!
//! Each row is `input_note,output_note[,...]`. A row is used only when both of
//! the first two cells are 1-3 digit numbers in 0..=127, which lets header rows,
//! separator rows and comments sit in the same file. Extra columns are ignored
//! and a later row overrides an earlier one with the same input note.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::OnceLock;

use midly::num::u7;
use regex::Regex;

use crate::error::{Error, Result};

/// Addictive Drums 2 layout to General MIDI percussion
const BUNDLED_AD2_GM: &str = include_str!("../data/ad2gm.csv");

fn note_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{1,3}$").expect("note pattern is a valid regex"))
}

/// Immutable note lookup used during conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    notes: BTreeMap<u8, u8>,
}

impl Mapping {
    /// Build from raw cell pairs; rows that are not two valid note numbers are skipped
    pub fn from_rows<I, K, V>(rows: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut notes = BTreeMap::new();
        for (input, output) in rows {
            if let (Some(from), Some(to)) = (parse_note(input.as_ref()), parse_note(output.as_ref())) {
                notes.insert(from, to);
            }
        }
        Mapping { notes }
    }

    /// Rows are decoded lossily, so stray bytes only spoil the row they sit in
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rows = Vec::new();
        for line in BufReader::new(reader).split(b'\n') {
            rows.extend(leading_pair(&String::from_utf8_lossy(&line?)));
        }
        Ok(Self::from_rows(rows))
    }

    /// Read a drum map file, failing with `ResourceNotFound` if it cannot be opened
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|_| Error::ResourceNotFound(path.to_path_buf()))?;
        let mapping = Self::from_reader(file).map_err(|e| match e {
            Error::Io(io) => Error::conversion(format!("Failed to read drum map: {}", path.display()), io),
            other => other,
        })?;
        log::debug!("Loaded {} drum map entries from {}", mapping.len(), path.display());
        Ok(mapping)
    }

    /// The drum map shipped with the crate
    pub fn bundled() -> Self {
        Self::from_rows(BUNDLED_AD2_GM.lines().filter_map(leading_pair))
    }

    pub fn get(&self, note: u7) -> Option<u7> {
        self.notes.get(&note.as_int()).map(|&to| u7::new(to))
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.notes.iter().map(|(&from, &to)| (from, to))
    }
}

impl FromIterator<(u8, u8)> for Mapping {
    /// Pairs outside 0..=127 are skipped, like malformed rows
    fn from_iter<T: IntoIterator<Item = (u8, u8)>>(iter: T) -> Self {
        let notes = iter
            .into_iter()
            .filter(|&(from, to)| from <= 127 && to <= 127)
            .collect();
        Mapping { notes }
    }
}

fn parse_note(cell: &str) -> Option<u8> {
    let cell = cell.trim();
    if !note_pattern().is_match(cell) {
        return None;
    }
    let note: u16 = cell.parse().ok()?;
    if note <= 127 {
        Some(note as u8)
    } else {
        None
    }
}

/// First two cells of a row; shorter rows yield nothing
fn leading_pair(line: &str) -> Option<(String, String)> {
    let mut cells = split_cells(line).into_iter();
    Some((cells.next()?, cells.next()?))
}

/// Split one comma-delimited line, honoring double-quoted cells with `""` escapes
fn split_cells(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(std::mem::take(&mut cell)),
            '\r' | '\n' if !in_quotes => {}
            _ => cell.push(c),
        }
    }

    if !cells.is_empty() || !cell.trim().is_empty() {
        cells.push(cell);
    }
    cells
}

/// Human-readable name of a General MIDI percussion note, used in log output
pub fn gm_drum_name(note_num: u8) -> &'static str {
    match note_num {
        35 => "Acoustic Bass Drum",
        36 => "Bass Drum 1",
        37 => "Side Stick",
        38 => "Acoustic Snare",
        39 => "Hand Clap",
        40 => "Electric Snare",
        41 => "Low Floor Tom",
        42 => "Closed Hi-Hat",
        43 => "High Floor Tom",
        44 => "Pedal Hi-Hat",
        45 => "Low Tom",
        46 => "Open Hi-Hat",
        47 => "Low-Mid Tom",
        48 => "Hi-Mid Tom",
        49 => "Crash Cymbal 1",
        50 => "High Tom",
        51 => "Ride Cymbal 1",
        52 => "Chinese Cymbal",
        53 => "Ride Bell",
        54 => "Tambourine",
        55 => "Splash Cymbal",
        56 => "Cowbell",
        57 => "Crash Cymbal 2",
        58 => "Vibraslap",
        59 => "Ride Cymbal 2",
        60 => "Hi Bongo",
        61 => "Low Bongo",
        62 => "Mute Hi Conga",
        63 => "Open Hi Conga",
        64 => "Low Conga",
        65 => "High Timbale",
        66 => "Low Timbale",
        67 => "High Agogo",
        68 => "Low Agogo",
        69 => "Cabasa",
        70 => "Maracas",
        71 => "Short Whistle",
        72 => "Long Whistle",
        73 => "Short Guiro",
        74 => "Long Guiro",
        75 => "Claves",
        76 => "Hi Wood Block",
        77 => "Low Wood Block",
        78 => "Mute Cuica",
        79 => "Open Cuica",
        80 => "Mute Triangle",
        81 => "Open Triangle",
        _ => "Unknown Drum",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    const SAMPLE_CSV: &str = "\"INP\",\"OUT\",\"AD2\",\"GM\"\n\
        \"---\",\"---\",\"---\",\"--\"\n\
        \"036\",\"036\",\"Kick\",\"Electric Bass Drum\"\n\
        \"038\",\"040\",\"Snare Open Hit\",\"Electric Snare or Rimshot\"\n\
        \n";

    #[test]
    fn test_reads_sample_csv() {
        let mapping = Mapping::from_reader(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get(u7::new(36)), Some(u7::new(36)));
        assert_eq!(mapping.get(u7::new(38)), Some(u7::new(40)));
        assert_eq!(mapping.get(u7::new(42)), None);
    }

    #[test]
    fn test_skips_invalid_rows() {
        let mapping = Mapping::from_rows([
            ("128", "36"),  // out of range
            ("36", "200"),  // out of range
            ("1000", "36"), // too many digits
            ("", "36"),
            ("36", ""),
            ("-1", "36"),
            ("3a", "36"),
            ("4.0", "36"),
            (" 42 ", " 44 "), // whitespace is trimmed
            ("0", "127"),
        ]);
        assert_eq!(mapping.iter().collect::<Vec<_>>(), vec![(0, 127), (42, 44)]);
    }

    #[test]
    fn test_later_rows_override() {
        let mapping = Mapping::from_reader("36,35\n36,36\n".as_bytes()).unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get(u7::new(36)), Some(u7::new(36)));
    }

    #[test]
    fn test_single_column_rows_skipped() {
        let mapping = Mapping::from_reader("36\n\n  \n38,40,extra,cells\n".as_bytes()).unwrap();
        assert_eq!(mapping.iter().collect::<Vec<_>>(), vec![(38, 40)]);
    }

    #[test]
    fn test_split_cells_quotes() {
        assert_eq!(split_cells(r#""036","a, b","say ""hi""""#), vec!["036", "a, b", "say \"hi\""]);
        assert_eq!(split_cells("1,2\r\n"), vec!["1", "2"]);
        assert_eq!(split_cells(",5"), vec!["", "5"]);
        assert!(split_cells("").is_empty());
    }

    #[test]
    fn test_invalid_utf8_only_spoils_its_row() {
        let bytes = b"36,36,Kick \xe9\n3\xe98,40\n42,44\n";
        let mapping = Mapping::from_reader(&bytes[..]).unwrap();
        assert_eq!(mapping.iter().collect::<Vec<_>>(), vec![(36, 36), (42, 44)]);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_CSV.as_bytes()).unwrap();
        let mapping = Mapping::from_path(file.path()).unwrap();
        assert_eq!(mapping.get(u7::new(38)), Some(u7::new(40)));
    }

    #[test]
    fn test_missing_file_is_resource_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv");
        match Mapping::from_path(&missing) {
            Err(Error::ResourceNotFound(path)) => assert_eq!(path, missing),
            other => panic!("expected ResourceNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_bundled_map() {
        let mapping = Mapping::bundled();
        assert!(!mapping.is_empty());
        assert_eq!(mapping.get(u7::new(36)), Some(u7::new(36)));
        assert_eq!(mapping.get(u7::new(38)), Some(u7::new(40)));
        assert!(mapping.iter().all(|(from, to)| from <= 127 && to <= 127));
    }

    #[test]
    fn test_from_iter_filters_range() {
        let mapping: Mapping = vec![(36, 36), (200, 1), (1, 200)].into_iter().collect();
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_drum_names() {
        assert_eq!(gm_drum_name(36), "Bass Drum 1");
        assert_eq!(gm_drum_name(40), "Electric Snare");
        assert_eq!(gm_drum_name(0), "Unknown Drum");
    }

    proptest! {
        #[test]
        fn prop_valid_rows_always_map(from in 0u8..=127, to in 0u8..=127) {
            let mapping = Mapping::from_rows([(from.to_string(), format!("{:03}", to))]);
            prop_assert_eq!(mapping.get(u7::new(from)), Some(u7::new(to)));
        }

        #[test]
        fn prop_unknown_notes_miss(from in 0u8..=127, probe in 0u8..=127) {
            prop_assume!(from != probe);
            let mapping = Mapping::from_rows([(from.to_string(), "36".to_string())]);
            prop_assert_eq!(mapping.get(u7::new(probe)), None);
        }
    }
}
