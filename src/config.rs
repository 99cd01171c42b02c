//! Run configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default tempo (120 BPM)
pub const DEFAULT_TEMPO: u32 = 500_000;

/// Marker line in the `[Events]` section where sample lines are spliced
pub const SAMPLE_MARKER: &str = "//Storyboard Sound Samples";

/// Parameters for one conversion run
///
/// Every tunable that used to be a global default lives here and is handed to the
/// converter, resolver and assembler at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory receiving the beatmap and generated clips
    pub output_dir: PathBuf,
    /// Octaves added to every pitch before bank lookup
    pub octave_shift: i32,
    /// Milliseconds added to every onset
    pub offset_ms: i64,
    /// Sample volume written on each storyboard line (0-100)
    pub volume: u8,
    /// Value written to the template's `Version:` field
    pub version_name: String,
    /// Tempo in effect before the first tempo event (microseconds per beat)
    pub default_tempo: u32,
    /// Quantizer roughness (1.0 rounds up to the next millisecond)
    pub roughness: f64,
    /// Extra audio kept after the canonical duration for the release tail
    pub padding_ms: u32,
    /// Upper bound on the fade-out length
    pub fade_ceiling_ms: u32,
    /// Fraction of the slice used for the fade-out when below the ceiling
    pub fade_fraction: f64,
    /// Level below which leading audio counts as silence
    pub silence_threshold_dbfs: f64,
    /// Chunk size used by leading-silence detection
    pub silence_chunk_ms: u32,
    /// Headroom kept below full scale when normalizing
    pub headroom_db: f64,
    /// Write a scanned hitsound bank back as `hitsoundbank.json`
    pub persist_bank: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            octave_shift: 0,
            offset_ms: 0,
            volume: 100,
            version_name: "Hitsounds".to_string(),
            default_tempo: DEFAULT_TEMPO,
            roughness: 1.0,
            padding_ms: 300,
            fade_ceiling_ms: 300,
            fade_fraction: 0.2,
            silence_threshold_dbfs: -50.0,
            silence_chunk_ms: 10,
            headroom_db: 0.1,
            persist_bank: true,
        }
    }
}

impl Config {
    /// Fade-out length for a slice of `slice_ms` milliseconds
    pub fn fade_ms(&self, slice_ms: f64) -> f64 {
        (slice_ms * self.fade_fraction).min(f64::from(self.fade_ceiling_ms))
    }
}
