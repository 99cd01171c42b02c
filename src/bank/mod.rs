//! Hitsound bank: the source clip for every piano key

pub mod builder;
pub mod scale;

use crate::error::{Error, Result};
use crate::note::Pitch;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// File name of the persisted key-to-path index
pub const BANK_INDEX: &str = "hitsoundbank.json";

/// Source clip path per pitch; unmapped pitches have no entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HitsoundBank {
    entries: BTreeMap<Pitch, PathBuf>,
}

impl HitsoundBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pitch: Pitch, path: PathBuf) {
        self.entries.insert(pitch, path);
    }

    pub fn get(&self, pitch: Pitch) -> Option<&Path> {
        self.entries.get(&pitch).map(PathBuf::as_path)
    }

    /// Number of mapped pitches
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Map each pitch to the first file (by name) whose name contains its note name
    pub fn scan(dir: &Path) -> Result<Self> {
        let mut names = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name != BANK_INDEX {
                names.push(name);
            }
        }
        names.sort();

        let mut bank = Self::new();
        for pitch in Pitch::all() {
            let note = pitch.name();
            if let Some(name) = names.iter().find(|n| n.contains(&note)) {
                bank.insert(pitch, dir.join(name));
            }
        }
        Ok(bank)
    }

    /// Parse the persisted index: pitch strings to paths, `""` for unmapped
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(text)?;
        let mut bank = Self::new();
        for (key, path) in raw {
            let pitch: Pitch = key
                .trim()
                .parse::<i64>()
                .map_err(|_| Error::InvalidNote(key.clone()))
                .and_then(Pitch::try_from)?;
            if !path.is_empty() {
                bank.insert(pitch, PathBuf::from(path));
            }
        }
        Ok(bank)
    }

    /// Serialize with one key for every pitch, unmapped ones as `""`
    pub fn to_json(&self) -> Result<String> {
        let raw: serde_json::Map<String, serde_json::Value> = Pitch::all()
            .map(|pitch| {
                let path = self
                    .get(pitch)
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_default();
                (pitch.get().to_string(), serde_json::Value::String(path))
            })
            .collect();
        Ok(serde_json::to_string_pretty(&raw)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// How a bank was obtained for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankLoad {
    /// Read from an existing index, trusted as-is
    Loaded(HitsoundBank),
    /// Scanned from the directory's files
    Built {
        bank: HitsoundBank,
        needs_persist: bool,
    },
}

impl BankLoad {
    /// Load `dir/hitsoundbank.json` if present, otherwise scan `dir`
    pub fn open(dir: &Path, persist: bool) -> Result<Self> {
        let index = dir.join(BANK_INDEX);
        if index.is_file() {
            let bank = HitsoundBank::load(&index)?;
            debug!(index = %index.display(), mapped = bank.len(), "Loaded hitsound bank");
            return Ok(Self::Loaded(bank));
        }

        let bank = HitsoundBank::scan(dir)?;
        debug!(dir = %dir.display(), mapped = bank.len(), "Scanned hitsound bank");
        Ok(Self::Built {
            bank,
            needs_persist: persist,
        })
    }

    /// Write the index for a freshly built bank if required, and return the bank
    pub fn into_bank(self, dir: &Path) -> Result<HitsoundBank> {
        match self {
            Self::Loaded(bank) => Ok(bank),
            Self::Built {
                bank,
                needs_persist,
            } => {
                if needs_persist {
                    let index = dir.join(BANK_INDEX);
                    bank.save(&index)?;
                    info!(index = %index.display(), "Saved hitsound bank index");
                }
                Ok(bank)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn pitch(name: &str) -> Pitch {
        name.parse().unwrap()
    }

    #[test]
    fn test_scan_matches_note_names() {
        let dir = tempdir().unwrap();
        for name in ["piano C4.ogg", "piano C#4.ogg", "A0.wav", "readme.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("D4")).unwrap();

        let bank = HitsoundBank::scan(dir.path()).unwrap();
        assert_eq!(bank.len(), 3);
        assert_eq!(bank.get(pitch("C4")), Some(dir.path().join("piano C4.ogg").as_path()));
        assert_eq!(bank.get(pitch("C#4")), Some(dir.path().join("piano C#4.ogg").as_path()));
        assert_eq!(bank.get(pitch("A0")), Some(dir.path().join("A0.wav").as_path()));
        assert_eq!(bank.get(pitch("D4")), None);
    }

    #[test]
    fn test_json_round_trip_uses_empty_sentinel() {
        let mut bank = HitsoundBank::new();
        bank.insert(pitch("C4"), PathBuf::from("bank/C4.ogg"));

        let json = bank.to_json().unwrap();
        let raw: BTreeMap<String, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(raw.len(), 107);
        assert_eq!(raw["60"], "bank/C4.ogg");
        assert_eq!(raw["61"], "");

        assert_eq!(HitsoundBank::from_json(&json).unwrap(), bank);
    }

    #[test]
    fn test_invalid_index_key() {
        assert!(HitsoundBank::from_json(r#"{"3": "low.ogg"}"#).is_err());
        assert!(HitsoundBank::from_json(r#"{"x": ""}"#).is_err());
    }

    #[test]
    fn test_built_then_loaded() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("C4.wav"), b"").unwrap();

        let first = BankLoad::open(dir.path(), true).unwrap();
        assert!(matches!(first, BankLoad::Built { needs_persist: true, .. }));
        let bank = first.into_bank(dir.path()).unwrap();
        assert!(dir.path().join(BANK_INDEX).is_file());

        let second = BankLoad::open(dir.path(), true).unwrap();
        assert_eq!(second, BankLoad::Loaded(bank));
    }

    #[test]
    fn test_index_is_trusted_as_is() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("C4.wav"), b"").unwrap();
        std::fs::write(dir.path().join(BANK_INDEX), r#"{"62": "elsewhere/D4.ogg"}"#).unwrap();

        let bank = BankLoad::open(dir.path(), true).unwrap().into_bank(dir.path()).unwrap();
        assert_eq!(bank.get(pitch("C4")), None);
        assert_eq!(bank.get(pitch("D4")), Some(Path::new("elsewhere/D4.ogg")));
    }

    #[test]
    fn test_no_persist() {
        let dir = tempdir().unwrap();
        let load = BankLoad::open(dir.path(), false).unwrap();
        load.into_bank(dir.path()).unwrap();
        assert!(!dir.path().join(BANK_INDEX).exists());
    }
}
