use std::path::PathBuf;

/// Errors raised while validating input or converting a file
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Input MIDI file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Drum map not found: {}", .0.display())]
    ResourceNotFound(PathBuf),

    #[error("Invalid time signature: {0}")]
    InvalidTimeSignature(String),

    #[error("Tempo out of range: {0}. Must be 20-300 BPM.")]
    TempoOutOfRange(u32),

    #[error("Conversion failed: {context}")]
    Conversion {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn conversion(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Conversion {
            context: context.into(),
            source: source.into(),
        }
    }

    /// True for bad user input that is rejected before any conversion work starts
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::FileNotFound(_)
                | Error::ResourceNotFound(_)
                | Error::InvalidTimeSignature(_)
                | Error::TempoOutOfRange(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
