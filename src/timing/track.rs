//! Per-track note reconstruction

use crate::note::Pitch;
use std::collections::HashMap;

/// The subset of track events relevant to note timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    NoteOn { key: u8, velocity: u8 },
    NoteOff { key: u8 },
    /// Set tempo meta event (microseconds per beat)
    Tempo(u32),
    /// Anything else; only its delta time matters
    Other,
}

/// A completed note on the tick timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickNote {
    pub pitch: Pitch,
    pub on_tick: u64,
    pub duration_ticks: u64,
}

impl TickNote {
    pub fn off_tick(&self) -> u64 {
        self.on_tick + self.duration_ticks
    }
}

/// Result of scanning one track
#[derive(Debug, Clone, Default)]
pub struct TrackScan {
    /// Completed notes in note-off order
    pub notes: Vec<TickNote>,
    /// Tempo changes as `(absolute tick, microseconds per beat)`
    pub tempo_changes: Vec<(u64, u32)>,
    /// Keys outside the playable range that were skipped
    pub out_of_range: usize,
}

/// Walk a track's `(delta_ticks, event)` stream and pair note-ons with note-offs
///
/// A repeated note-on for a sounding key restarts it. Note-offs without a
/// matching note-on, zero-length notes and notes still open at the end of the
/// track are dropped.
pub fn scan_track(events: impl IntoIterator<Item = (u32, TickEvent)>) -> TrackScan {
    let mut scan = TrackScan::default();
    let mut open: HashMap<Pitch, u64> = HashMap::new();
    let mut ticks: u64 = 0;

    for (delta, event) in events {
        ticks += u64::from(delta);

        match event {
            TickEvent::Tempo(tempo) => scan.tempo_changes.push((ticks, tempo)),
            TickEvent::NoteOn { key, velocity } if velocity > 0 => match Pitch::new(key) {
                Some(pitch) => {
                    open.insert(pitch, ticks);
                }
                None => scan.out_of_range += 1,
            },
            TickEvent::NoteOn { key, .. } | TickEvent::NoteOff { key } => {
                let Some(pitch) = Pitch::new(key) else {
                    continue;
                };
                if let Some(on_tick) = open.remove(&pitch) {
                    let duration_ticks = ticks - on_tick;
                    if duration_ticks > 0 {
                        scan.notes.push(TickNote {
                            pitch,
                            on_tick,
                            duration_ticks,
                        });
                    }
                }
            }
            TickEvent::Other => {}
        }
    }

    scan
}
