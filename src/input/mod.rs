//! Input sources: standard MIDI files and mapping-tool hitsound JSON

pub mod json;
pub mod midi;

use crate::error::{Error, Result};
use crate::note::Pitch;
use std::path::{Path, PathBuf};

/// One performed note with absolute timing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub pitch: Pitch,
    /// Performed length, not yet quantized
    pub duration_ms: f64,
    pub onset_ms: i64,
}

/// Input file selected for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Midi(PathBuf),
    Json(PathBuf),
}

impl InputSource {
    /// Pick the source kind from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("mid") | Some("midi") => Ok(Self::Midi(path.to_path_buf())),
            Some("json") => Ok(Self::Json(path.to_path_buf())),
            _ => Err(Error::UnsupportedInput(path.to_path_buf())),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Midi(path) | Self::Json(path) => path,
        }
    }
}

/// Round a fractional millisecond to the nearest integer, ties to even
pub(crate) fn round_ms(ms: f64) -> i64 {
    ms.round_ties_even() as i64
}
