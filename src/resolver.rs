//! Hitsound resolution: one generated clip per asset key

use crate::aggregate::AssetKey;
use crate::audio::AudioCodec;
use crate::bank::HitsoundBank;
use crate::config::Config;
use crate::error::Result;
use crate::note::Pitch;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A generated clip, referenced from the storyboard by `name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// File name relative to the output directory
    pub name: String,
    pub path: PathBuf,
}

/// Slices bank clips on demand and remembers what it already generated
///
/// Each asset key is encoded at most once per resolver; later requests return
/// the cached file.
pub struct HitsoundResolver<'a> {
    bank: &'a HitsoundBank,
    codec: &'a dyn AudioCodec,
    config: &'a Config,
    output_dir: PathBuf,
    cache: HashMap<AssetKey, ResolvedAsset>,
}

impl<'a> HitsoundResolver<'a> {
    pub fn new(
        bank: &'a HitsoundBank,
        codec: &'a dyn AudioCodec,
        config: &'a Config,
        output_dir: &Path,
    ) -> Self {
        Self {
            bank,
            codec,
            config,
            output_dir: output_dir.to_path_buf(),
            cache: HashMap::new(),
        }
    }

    /// Return the clip for `pitch` at `duration_ms`, generating it on first use
    ///
    /// The configured octave shift is applied first. `Ok(None)` means the bank
    /// has nothing for the shifted pitch.
    pub fn resolve(&mut self, pitch: Pitch, duration_ms: u32) -> Result<Option<ResolvedAsset>> {
        let Some(shifted) = pitch.shift_octaves(self.config.octave_shift) else {
            debug!(
                note = %pitch,
                shift = self.config.octave_shift,
                "Octave shift moves note outside the piano range"
            );
            return Ok(None);
        };
        let Some(source) = self.bank.get(shifted) else {
            debug!(key = shifted.get(), note = %shifted, "No bank file for pitch");
            return Ok(None);
        };

        let key = AssetKey::new(shifted, duration_ms);
        if let Some(asset) = self.cache.get(&key) {
            debug!(asset = %asset.name, "Reusing generated hitsound");
            return Ok(Some(asset.clone()));
        }

        let asset = self.generate(source, key)?;
        self.cache.insert(key, asset.clone());
        Ok(Some(asset))
    }

    fn generate(&self, source: &Path, key: AssetKey) -> Result<ResolvedAsset> {
        let name = format!(
            "{}-{}.{}",
            key.pitch.name(),
            key.duration_ms,
            self.codec.extension()
        );
        let path = self.output_dir.join(&name);

        let clip = self.codec.decode(source)?;
        let lead = clip.leading_silence_ms(
            self.config.silence_threshold_dbfs,
            self.config.silence_chunk_ms,
        );
        let length = f64::from(key.duration_ms) + f64::from(self.config.padding_ms);
        // The window end is measured from the start of the source, not from `lead`
        let mut hitsound = clip.slice_ms(lead, length);
        if hitsound.frames() == 0 {
            warn!(
                asset = %name,
                lead_ms = lead,
                "Leading silence covers the whole hitsound window"
            );
        }
        hitsound.normalize(self.config.headroom_db);
        hitsound.fade_out_ms(self.config.fade_ms(hitsound.duration_ms()));

        self.codec.encode(&hitsound, &path)?;
        debug!(
            asset = %name,
            source = %source.display(),
            lead_ms = lead,
            "Generated hitsound"
        );

        Ok(ResolvedAsset { name, path })
    }

    /// Number of clips encoded so far
    pub fn generated(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{Clip, WavCodec};
    use std::cell::Cell;
    use tempfile::tempdir;

    struct CountingCodec {
        encodes: Cell<usize>,
    }

    impl AudioCodec for CountingCodec {
        fn extension(&self) -> &str {
            "ogg"
        }

        fn decode(&self, path: &Path) -> Result<Clip> {
            WavCodec.decode(path)
        }

        fn encode(&self, clip: &Clip, path: &Path) -> Result<()> {
            self.encodes.set(self.encodes.get() + 1);
            WavCodec.encode(clip, path)
        }
    }

    /// 50 ms of silence, then 2 s of a loud 1 kHz-sampled square wave
    fn write_source(path: &Path) {
        let mut samples = vec![0.0f32; 50];
        samples.extend((0..2000).map(|i| if i % 2 == 0 { 0.4 } else { -0.4 }));
        WavCodec.encode(&Clip::new(1000, 1, samples), path).unwrap();
    }

    fn c4() -> Pitch {
        "C4".parse().unwrap()
    }

    #[test]
    fn test_generates_once_per_key() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("C4.wav");
        write_source(&source);

        let mut bank = HitsoundBank::new();
        bank.insert(c4(), source);
        let codec = CountingCodec { encodes: Cell::new(0) };
        let config = Config::default();
        let mut resolver = HitsoundResolver::new(&bank, &codec, &config, dir.path());

        let first = resolver.resolve(c4(), 500).unwrap().unwrap();
        let second = resolver.resolve(c4(), 500).unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.name, "C4-500.ogg");
        assert_eq!(codec.encodes.get(), 1);

        resolver.resolve(c4(), 250).unwrap().unwrap();
        assert_eq!(codec.encodes.get(), 2);
        assert_eq!(resolver.generated(), 2);
    }

    #[test]
    fn test_slice_trims_lead_and_pads() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("C4.wav");
        write_source(&source);

        let mut bank = HitsoundBank::new();
        bank.insert(c4(), source);
        let config = Config::default();
        let mut resolver = HitsoundResolver::new(&bank, &WavCodec, &config, dir.path());

        let asset = resolver.resolve(c4(), 500).unwrap().unwrap();
        let clip = WavCodec.decode(&asset.path).unwrap();
        // 50 ms lead trimmed from a window ending at 500 + 300 ms
        assert_eq!(clip.duration_ms(), 750.0);
        assert!(clip.samples[0].abs() > 0.9);
        assert_eq!(clip.samples[clip.samples.len() - 1], 0.0);
    }

    #[test]
    fn test_lead_longer_than_window_gives_empty_clip() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("C4.wav");
        let mut samples = vec![0.0f32; 1000];
        samples.extend((0..500).map(|i| if i % 2 == 0 { 0.4 } else { -0.4 }));
        WavCodec
            .encode(&Clip::new(1000, 1, samples), &source)
            .unwrap();

        let mut bank = HitsoundBank::new();
        bank.insert(c4(), source);
        let config = Config::default();
        let mut resolver = HitsoundResolver::new(&bank, &WavCodec, &config, dir.path());

        let asset = resolver.resolve(c4(), 100).unwrap().unwrap();
        assert_eq!(asset.name, "C4-100.wav");
        let clip = WavCodec.decode(&asset.path).unwrap();
        assert_eq!(clip.frames(), 0);
    }

    #[test]
    fn test_octave_shift_changes_lookup_and_name() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("C5.wav");
        write_source(&source);

        let mut bank = HitsoundBank::new();
        bank.insert("C5".parse().unwrap(), source);
        let config = Config {
            octave_shift: 1,
            ..Config::default()
        };
        let mut resolver = HitsoundResolver::new(&bank, &WavCodec, &config, dir.path());

        let asset = resolver.resolve(c4(), 100).unwrap().unwrap();
        assert_eq!(asset.name, "C5-100.wav");
        assert!(resolver.resolve("C5".parse().unwrap(), 100).unwrap().is_none());
    }

    #[test]
    fn test_missing_pitch() {
        let dir = tempdir().unwrap();
        let bank = HitsoundBank::new();
        let config = Config::default();
        let mut resolver = HitsoundResolver::new(&bank, &WavCodec, &config, dir.path());
        assert!(resolver.resolve(c4(), 100).unwrap().is_none());
        assert_eq!(resolver.generated(), 0);
    }

    #[test]
    fn test_unreadable_source_is_an_error() {
        let dir = tempdir().unwrap();
        let mut bank = HitsoundBank::new();
        bank.insert(c4(), dir.path().join("missing.wav"));
        let config = Config::default();
        let mut resolver = HitsoundResolver::new(&bank, &WavCodec, &config, dir.path());
        assert!(resolver.resolve(c4(), 100).is_err());
    }
}
