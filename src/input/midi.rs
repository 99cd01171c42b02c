//! Standard MIDI file ingestion

use super::{round_ms, NoteEvent};
use crate::error::{Error, Result};
use crate::timing::{scan_track, TempoMap, TickEvent, TrackScan};
use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::path::Path;
use tracing::{debug, warn};

/// Read a MIDI file and return its notes in onset order
pub fn load_midi(path: &Path, default_tempo: u32) -> Result<Vec<NoteEvent>> {
    let data = std::fs::read(path)?;
    parse_midi(&data, default_tempo)
}

/// Parse raw MIDI bytes and return their notes in onset order
pub fn parse_midi(data: &[u8], default_tempo: u32) -> Result<Vec<NoteEvent>> {
    let smf = Smf::parse(data)?;
    notes_from_smf(&smf, default_tempo)
}

/// Convert every track of a parsed file to millisecond-timed notes
///
/// Format 0 and 1 files share one tempo map built from the tempo events of all
/// tracks (conventionally the first). Format 2 tracks are independent songs and
/// each uses its own tempo events.
pub fn notes_from_smf(smf: &Smf, default_tempo: u32) -> Result<Vec<NoteEvent>> {
    let ticks_per_beat = match smf.header.timing {
        Timing::Metrical(tpb) => tpb.as_int(),
        Timing::Timecode(fps, subframes) => {
            return Err(Error::UnsupportedTiming(format!(
                "SMPTE timecode ({} fps, {} subframes)",
                fps.as_f32(),
                subframes
            )));
        }
    };

    let scans: Vec<TrackScan> = smf
        .tracks
        .iter()
        .map(|track| scan_track(track.iter().map(tick_event)))
        .collect();

    let shared_tempo = match smf.header.format {
        Format::Sequential => None,
        Format::SingleTrack | Format::Parallel => Some(TempoMap::from_changes(
            ticks_per_beat,
            default_tempo,
            scans.iter().flat_map(|s| s.tempo_changes.iter().copied()),
        )),
    };

    let mut notes = Vec::new();
    for (index, scan) in scans.iter().enumerate() {
        if scan.out_of_range > 0 {
            warn!(
                track = index,
                skipped = scan.out_of_range,
                "Skipping notes outside the piano range"
            );
        }

        let own_tempo;
        let tempo = match &shared_tempo {
            Some(map) => map,
            None => {
                own_tempo = TempoMap::from_changes(
                    ticks_per_beat,
                    default_tempo,
                    scan.tempo_changes.iter().copied(),
                );
                &own_tempo
            }
        };

        debug!(track = index, notes = scan.notes.len(), "Scanned track");
        notes.extend(scan.notes.iter().map(|note| NoteEvent {
            pitch: note.pitch,
            duration_ms: tempo.span_ms(note.on_tick, note.off_tick()),
            onset_ms: round_ms(tempo.ms_at(note.on_tick)),
        }));
    }

    notes.sort_by_key(|n| (n.onset_ms, n.pitch));
    Ok(notes)
}

fn tick_event(event: &TrackEvent) -> (u32, TickEvent) {
    let kind = match event.kind {
        TrackEventKind::Midi {
            message: MidiMessage::NoteOn { key, vel },
            ..
        } => TickEvent::NoteOn {
            key: key.as_int(),
            velocity: vel.as_int(),
        },
        TrackEventKind::Midi {
            message: MidiMessage::NoteOff { key, .. },
            ..
        } => TickEvent::NoteOff { key: key.as_int() },
        TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => TickEvent::Tempo(tempo.as_int()),
        _ => TickEvent::Other,
    };
    (event.delta.as_int(), kind)
}
