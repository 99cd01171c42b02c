use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unsupported input file: {} (expected .mid, .midi or .json)", .0.display())]
    UnsupportedInput(PathBuf),

    #[error("Unsupported MIDI timing: {0}")]
    UnsupportedTiming(String),

    #[error("MIDI parse error: {0}")]
    Midi(#[from] midly::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Invalid note: '{0}'")]
    InvalidNote(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Codec executable not found: {0}")]
    CodecNotFound(String),

    #[error("Codec failed with status {status}: {stderr}")]
    Codec { status: i32, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
