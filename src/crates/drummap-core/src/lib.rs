//! Drum note remapping for Standard MIDI Files
//!
//! Rewrites every note-on and note-off of a file through a drum map (for example
//! a drum sampler's layout onto General MIDI percussion), optionally moving
//! mapped notes to the percussion channel, removing overlapping duplicate
//! strikes and replacing the tempo and time signature.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//! use drummap_core::{convert, ConversionConfig, Mapping, Tempo};
//!
//! let mapping = Mapping::bundled();
//! let config = ConversionConfig {
//!     tempo: Some(Tempo::new(140)?),
//!     force_percussion: true,
//!     ..Default::default()
//! };
//! let report = convert(&mapping, Path::new("in.mid"), Path::new("out.mid"), &config)?;
//! println!("{}", report);
//! # Ok::<(), drummap_core::Error>(())
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod mapping;
pub mod midi;
pub mod note;
pub mod report;
pub mod track;
pub mod tracker;
pub mod transform;

pub use config::{ConversionConfig, DuplicateScope, Tempo, TimeSignature};
pub use convert::{convert, Converter};
pub use error::{Error, Result};
pub use mapping::Mapping;
pub use note::{NoteEvent, NoteKind, PERCUSSION_CHANNEL};
pub use report::{ConversionReport, TrackReport};
pub use track::TrackRewriter;
pub use tracker::{DuplicateTracker, Verdict};
pub use transform::EventTransformer;
