//! Storyboard sample events

pub mod template;

pub use template::{Metadata, Template};

use crate::aggregate::SampleTable;
use crate::config::Config;
use crate::error::Result;
use crate::note::Pitch;
use crate::resolver::HitsoundResolver;
use std::fmt;
use tracing::warn;

/// One `Sample` event in the storyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryboardLine {
    pub time_ms: i64,
    /// Pitch the asset was generated for, used as the tie-break at equal times
    pub pitch: Pitch,
    pub asset_name: String,
    pub volume: u8,
}

impl fmt::Display for StoryboardLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sample,{},0,\"{}\",{}",
            self.time_ms, self.asset_name, self.volume
        )
    }
}

/// A note dropped because the bank had no clip for its pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingAsset {
    pub pitch: Pitch,
    pub time_ms: i64,
}

/// Sorted sample events plus the notes that could not be resolved
#[derive(Debug, Clone, Default)]
pub struct Storyboard {
    pub lines: Vec<StoryboardLine>,
    pub missing: Vec<MissingAsset>,
}

impl Storyboard {
    /// Resolve every group once and flatten it into offset, sorted lines
    pub fn assemble(
        table: &SampleTable,
        resolver: &mut HitsoundResolver<'_>,
        config: &Config,
    ) -> Result<Self> {
        let mut storyboard = Self::default();
        let volume = config.volume.min(100);

        for (key, onsets) in table.iter() {
            match resolver.resolve(key.pitch, key.duration_ms)? {
                Some(asset) => {
                    storyboard
                        .lines
                        .extend(onsets.iter().map(|&onset| StoryboardLine {
                            time_ms: onset + config.offset_ms,
                            pitch: key.pitch,
                            asset_name: asset.name.clone(),
                            volume,
                        }));
                }
                None => {
                    for &onset in onsets {
                        let time_ms = onset + config.offset_ms;
                        warn!(
                            key = key.pitch.get(),
                            note = %key.pitch,
                            time_ms,
                            "Missing hitsound, dropping note"
                        );
                        storyboard.missing.push(MissingAsset {
                            pitch: key.pitch,
                            time_ms,
                        });
                    }
                }
            }
        }

        sort_lines(&mut storyboard.lines);
        Ok(storyboard)
    }

    /// Lines rendered in storyboard syntax
    pub fn rendered(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }
}

/// Order by time, then pitch, then asset name
pub fn sort_lines(lines: &mut [StoryboardLine]) {
    lines.sort_by(|a, b| {
        (a.time_ms, a.pitch, &a.asset_name).cmp(&(b.time_ms, b.pitch, &b.asset_name))
    });
}
