//! Slicing a continuous key-by-key recording into a hitsound bank

use super::{HitsoundBank, BANK_INDEX};
use crate::audio::{AudioCodec, Clip};
use crate::error::{Error, Result};
use crate::note::{Pitch, MIN_PITCH};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Layout of the source recording and the keys to extract
#[derive(Debug, Clone)]
pub struct BankLayout {
    /// First key to extract
    pub start: Pitch,
    /// Last key to extract (inclusive)
    pub end: Pitch,
    /// Length of each key's sounding slot
    pub slot_ms: u32,
    /// Gap between the end of one slot and the start of the next
    pub gap_ms: u32,
    /// Peak level below which a slot is considered empty
    pub silence_threshold_dbfs: f64,
    /// Headroom kept when normalizing each slot
    pub headroom_db: f64,
}

impl Default for BankLayout {
    fn default() -> Self {
        Self {
            start: Pitch::clamped(21),
            end: Pitch::clamped(88),
            slot_ms: 2000,
            gap_ms: 5000,
            silence_threshold_dbfs: -60.0,
            headroom_db: 0.1,
        }
    }
}

impl BankLayout {
    /// Where `pitch`'s slot begins in the recording
    ///
    /// Slots are laid out for every key from A0 regardless of `start`.
    pub fn slot_start_ms(&self, pitch: Pitch) -> f64 {
        let index = f64::from(pitch.get() - MIN_PITCH);
        index * f64::from(self.slot_ms + self.gap_ms)
    }
}

/// Builds a bank directory from one recording
pub struct BankBuilder<'a> {
    codec: &'a dyn AudioCodec,
    layout: BankLayout,
}

impl<'a> BankBuilder<'a> {
    pub fn new(codec: &'a dyn AudioCodec, layout: BankLayout) -> Self {
        Self { codec, layout }
    }

    /// Decode `recording` and build the bank into `out_dir`
    pub fn build_file(&self, recording: &Path, out_dir: &Path) -> Result<HitsoundBank> {
        let source = self.codec.decode(recording)?;
        self.build(&source, out_dir)
    }

    /// Write one normalized clip per key in range plus the index file
    ///
    /// Keys whose slot is silent or past the end of the recording stay unmapped.
    pub fn build(&self, source: &Clip, out_dir: &Path) -> Result<HitsoundBank> {
        if self.layout.start > self.layout.end {
            return Err(Error::InvalidNote(format!(
                "start key {} is above end key {}",
                self.layout.start, self.layout.end
            )));
        }
        std::fs::create_dir_all(out_dir)?;

        let mut bank = HitsoundBank::new();
        for pitch in Pitch::all() {
            if pitch < self.layout.start || pitch > self.layout.end {
                continue;
            }

            let start = self.layout.slot_start_ms(pitch);
            let mut slot = source.slice_ms(start, start + f64::from(self.layout.slot_ms));
            if slot.frames() == 0 || slot.is_silent(self.layout.silence_threshold_dbfs) {
                warn!(note = %pitch, at_ms = start, "No audible signal in slot, leaving key unmapped");
                continue;
            }

            slot.normalize(self.layout.headroom_db);
            let path: PathBuf = out_dir.join(format!("{}.{}", pitch.name(), self.codec.extension()));
            self.codec.encode(&slot, &path)?;
            bank.insert(pitch, path);
        }

        bank.save(&out_dir.join(BANK_INDEX))?;
        info!(dir = %out_dir.display(), mapped = bank.len(), "Built hitsound bank");
        Ok(bank)
    }
}
