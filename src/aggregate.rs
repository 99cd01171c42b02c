//! Grouping of note onsets by generated asset

use crate::input::json::{HitsoundExport, HitsoundLayer};
use crate::input::{round_ms, NoteEvent};
use crate::note::Pitch;
use crate::timing::quantize;
use std::collections::BTreeMap;
use tracing::warn;

/// Identity of one generated clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetKey {
    pub pitch: Pitch,
    pub duration_ms: u32,
}

impl AssetKey {
    pub fn new(pitch: Pitch, duration_ms: u32) -> Self {
        Self { pitch, duration_ms }
    }

    /// Key of an exported layer, `None` when its key or length is unusable
    pub fn for_layer(layer: &HitsoundLayer, roughness: f64) -> Option<Self> {
        let pitch = layer
            .sample_args
            .key
            .as_f64()
            .and_then(|k| Pitch::try_from(k as i64).ok())?;
        let length = layer.sample_args.length.as_f64()?;
        Some(Self::new(pitch, quantize(length, roughness)))
    }
}

/// Onset times grouped by the clip they trigger
#[derive(Debug, Clone, Default)]
pub struct SampleTable {
    groups: BTreeMap<AssetKey, Vec<i64>>,
}

impl SampleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group notes by pitch and quantized duration
    pub fn from_notes(notes: &[NoteEvent], roughness: f64) -> Self {
        let mut table = Self::new();
        for note in notes {
            let key = AssetKey::new(note.pitch, quantize(note.duration_ms, roughness));
            table.insert(key, note.onset_ms);
        }
        table
    }

    /// One group per layer; layers sharing a key are appended in file order
    pub fn from_export(export: &HitsoundExport, roughness: f64) -> Self {
        let mut table = Self::new();
        for (index, layer) in export.layers.iter().enumerate() {
            let Some(key) = AssetKey::for_layer(layer, roughness) else {
                warn!(
                    layer = index,
                    key = ?layer.sample_args.key,
                    length = ?layer.sample_args.length,
                    "Skipping layer with invalid key or length"
                );
                continue;
            };

            let times = table.groups.entry(key).or_default();
            for time in &layer.times {
                match time.as_f64() {
                    Some(ms) => times.push(round_ms(ms)),
                    None => warn!(layer = index, time = ?time, "Skipping unparsable time"),
                }
            }
        }
        table.groups.retain(|_, times| !times.is_empty());
        table
    }

    pub fn contains(&self, key: &AssetKey) -> bool {
        self.groups.contains_key(key)
    }

    pub fn insert(&mut self, key: AssetKey, onset_ms: i64) {
        self.groups.entry(key).or_default().push(onset_ms);
    }

    /// Groups in key order
    pub fn iter(&self) -> impl Iterator<Item = (&AssetKey, &Vec<i64>)> {
        self.groups.iter()
    }

    /// Number of distinct asset keys
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of onsets across all groups
    pub fn onset_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}
