//! MIDI pitch range and note naming

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Lowest key on a piano keyboard (A0)
pub const MIN_PITCH: u8 = 21;
/// Highest MIDI key (G9)
pub const MAX_PITCH: u8 = 127;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A MIDI key number guaranteed to lie in `MIN_PITCH..=MAX_PITCH`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pitch(u8);

impl Pitch {
    pub fn new(key: u8) -> Option<Self> {
        (MIN_PITCH..=MAX_PITCH).contains(&key).then_some(Self(key))
    }

    /// Nearest pitch in range
    pub const fn clamped(key: u8) -> Self {
        if key < MIN_PITCH {
            Self(MIN_PITCH)
        } else if key > MAX_PITCH {
            Self(MAX_PITCH)
        } else {
            Self(key)
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every pitch from A0 to G9 in ascending order
    pub fn all() -> impl Iterator<Item = Pitch> {
        (MIN_PITCH..=MAX_PITCH).map(Pitch)
    }

    /// Transpose by whole octaves, returning `None` if the result leaves the range
    pub fn shift_octaves(self, octaves: i32) -> Option<Self> {
        let key = octaves
            .checked_mul(12)
            .and_then(|delta| i32::from(self.0).checked_add(delta))?;
        u8::try_from(key).ok().and_then(Self::new)
    }

    /// Octave number, incremented at every C (A0, B0, C1, ...)
    pub fn octave(self) -> u8 {
        self.0 / 12 - 1
    }

    /// Note name such as `C#4`
    pub fn name(self) -> String {
        format!("{}{}", NOTE_NAMES[usize::from(self.0 % 12)], self.octave())
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl TryFrom<i64> for Pitch {
    type Error = Error;

    fn try_from(key: i64) -> Result<Self> {
        u8::try_from(key)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| Error::InvalidNote(key.to_string()))
    }
}

impl FromStr for Pitch {
    type Err = Error;

    /// Parse either a note name (`A0`, `C#4`) or a plain key number (`60`)
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(key) = s.parse::<i64>() {
            return Pitch::try_from(key);
        }

        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| Error::InvalidNote(s.to_string()))?;
        let (letter, octave) = s.split_at(split);
        let semitone = NOTE_NAMES
            .iter()
            .position(|n| n.eq_ignore_ascii_case(letter))
            .ok_or_else(|| Error::InvalidNote(s.to_string()))?;
        let octave: i64 = octave
            .parse()
            .map_err(|_| Error::InvalidNote(s.to_string()))?;

        Pitch::try_from((octave + 1) * 12 + semitone as i64)
            .map_err(|_| Error::InvalidNote(s.to_string()))
    }
}
