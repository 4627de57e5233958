use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use drummap_core::{ConversionConfig, DuplicateScope, Tempo, TimeSignature};

#[derive(Parser, Debug)]
#[command(name = "drummap")]
#[command(about = "Convert MIDI files between different drum mappings", long_about = None)]
pub struct Args {
    /// Input MIDI file with source drum mapping
    pub infile: PathBuf,

    /// Output MIDI file with target drum mapping
    pub outfile: PathBuf,

    /// Drum mapping CSV file (default: bundled Addictive Drums 2 to General MIDI map)
    #[arg(long)]
    pub drum_map: Option<PathBuf>,

    /// Discard notes that are not defined in the drum map
    #[arg(long)]
    pub discard_unmapped: bool,

    /// Force mapped notes onto General MIDI percussion channel 10
    #[arg(long)]
    pub force_percussion: bool,

    /// Logging verbosity level
    #[arg(long, value_enum, ignore_case = true, default_value = "info")]
    pub log_level: LogLevel,

    /// Preserve tempo/time signature meta events from the source file
    #[arg(long)]
    pub preserve_meta: bool,

    /// Remove duplicate notes
    #[arg(long)]
    pub remove_duplicates: bool,

    /// Whether duplicate detection spans the whole file or restarts on every track
    #[arg(long, default_value = "file", value_parser = parse_duplicate_scope)]
    pub duplicate_scope: DuplicateScope,

    /// Tempo for the output MIDI file in BPM (20-300)
    #[arg(long, value_parser = parse_tempo)]
    pub tempo: Option<Tempo>,

    /// Time signature for the output MIDI file, e.g. 4/4
    #[arg(long, value_parser = parse_time_signature)]
    pub time_signature: Option<TimeSignature>,

    /// Print a JSON conversion report to stdout
    #[arg(long)]
    pub report_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    #[value(alias = "warn")]
    Warning,
    Error,
    Critical,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Error | LogLevel::Critical => log::LevelFilter::Error,
        }
    }
}

impl Args {
    pub fn config(&self) -> ConversionConfig {
        ConversionConfig {
            tempo: self.tempo,
            time_signature: self.time_signature,
            force_percussion: self.force_percussion,
            preserve_meta: self.preserve_meta,
            remove_duplicates: self.remove_duplicates,
            discard_unmapped: self.discard_unmapped,
            duplicate_scope: self.duplicate_scope,
        }
    }
}

fn parse_tempo(s: &str) -> Result<Tempo, String> {
    let bpm: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a whole number of BPM", s))?;
    Tempo::new(bpm).map_err(|e| e.to_string())
}

fn parse_time_signature(s: &str) -> Result<TimeSignature, String> {
    s.parse().map_err(|e: drummap_core::Error| e.to_string())
}

fn parse_duplicate_scope(s: &str) -> Result<DuplicateScope, String> {
    s.parse()
}
