//! Reference MIDI that plays every key once, for recording a bank
//!
//! Render it through any instrument and feed the result to the bank builder;
//! the note spacing matches [`BankLayout`](super::builder::BankLayout)'s defaults.

use crate::config::DEFAULT_TEMPO;
use crate::error::Result;
use crate::note::Pitch;
use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::path::Path;

/// Resolution of the generated file
pub const SCALE_TICKS_PER_BEAT: u16 = 480;

const VELOCITY: u8 = 100;

/// Convert seconds to ticks at the default tempo
fn seconds_to_ticks(seconds: u32) -> u32 {
    let micros = u64::from(seconds) * 1_000_000;
    (micros * u64::from(SCALE_TICKS_PER_BEAT) / u64::from(DEFAULT_TEMPO)) as u32
}

/// Build the scale: each key held `play_s` seconds, `wait_s` seconds apart
pub fn reference_scale(play_s: u32, wait_s: u32) -> Smf<'static> {
    let play = seconds_to_ticks(play_s);
    let wait = seconds_to_ticks(wait_s);

    let mut track = vec![TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(DEFAULT_TEMPO))),
    }];

    for (index, pitch) in Pitch::all().enumerate() {
        let key = u7::new(pitch.get());
        track.push(TrackEvent {
            delta: u28::new(if index == 0 { 0 } else { wait }),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOn {
                    key,
                    vel: u7::new(VELOCITY),
                },
            },
        });
        track.push(TrackEvent {
            delta: u28::new(play),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOff {
                    key,
                    vel: u7::new(0),
                },
            },
        });
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(SCALE_TICKS_PER_BEAT)),
    ));
    smf.tracks.push(track);
    smf
}

/// Write the default scale (2 s notes, 5 s gaps) to `path`
pub fn write_reference_scale(path: &Path) -> Result<()> {
    reference_scale(2, 5).save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::builder::BankLayout;
    use crate::input::midi::notes_from_smf;

    #[test]
    fn test_seconds_to_ticks() {
        assert_eq!(seconds_to_ticks(2), 1920);
        assert_eq!(seconds_to_ticks(5), 4800);
    }

    #[test]
    fn test_scale_matches_bank_layout() {
        let notes = notes_from_smf(&reference_scale(2, 5), DEFAULT_TEMPO).unwrap();
        assert_eq!(notes.len(), Pitch::all().count());

        let layout = BankLayout::default();
        for note in &notes {
            assert_eq!(note.duration_ms, 2000.0);
            assert_eq!(note.onset_ms as f64, layout.slot_start_ms(note.pitch));
        }
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.mid");
        write_reference_scale(&path).unwrap();

        let data = std::fs::read(&path).unwrap();
        let smf = Smf::parse(&data).unwrap();
        assert_eq!(smf.tracks.len(), 1);
        assert_eq!(smf.header.format, Format::SingleTrack);
    }
}
