//! End-to-end conversion run

use crate::aggregate::{AssetKey, SampleTable};
use crate::audio::AudioCodec;
use crate::bank::BankLoad;
use crate::config::Config;
use crate::error::Result;
use crate::input::json::HitsoundExport;
use crate::input::midi::load_midi;
use crate::input::InputSource;
use crate::resolver::HitsoundResolver;
use crate::storyboard::{MissingAsset, Storyboard, Template};
use std::path::{Path, PathBuf};
use tracing::info;

/// Summary of a run that wrote a beatmap
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Path of the written beatmap
    pub beatmap: PathBuf,
    /// Sample lines written
    pub lines: usize,
    /// Distinct clips encoded
    pub generated: usize,
    /// One entry per note dropped for lack of a hitsound
    pub missing: Vec<MissingAsset>,
    /// Hitsound-layer export rewritten with generated sample paths, for JSON input
    pub export: Option<PathBuf>,
}

/// How a run ended
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The input produced no samples; nothing was written
    Empty,
    Written(RunReport),
}

/// Converts one input into a storyboarded beatmap
pub struct Converter {
    config: Config,
}

impl Converter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Read the input and group its notes by asset key
    pub fn collect(&self, source: &InputSource) -> Result<SampleTable> {
        self.read(source).map(|(table, _)| table)
    }

    fn read(&self, source: &InputSource) -> Result<(SampleTable, Option<HitsoundExport>)> {
        let (table, export) = match source {
            InputSource::Midi(path) => {
                let notes = load_midi(path, self.config.default_tempo)?;
                info!(input = %path.display(), notes = notes.len(), "Read MIDI file");
                (SampleTable::from_notes(&notes, self.config.roughness), None)
            }
            InputSource::Json(path) => {
                let export = HitsoundExport::load(path)?;
                info!(input = %path.display(), layers = export.layers.len(), "Read hitsound layers");
                let table = SampleTable::from_export(&export, self.config.roughness);
                (table, Some(export))
            }
        };
        info!(
            samples = table.onset_count(),
            assets = table.len(),
            "Collected samples"
        );
        Ok((table, export))
    }

    /// Convert `source` using the bank in `bank_dir` and the beatmap `template`
    ///
    /// The template is validated before anything is read or written, and an
    /// empty input returns [`RunOutcome::Empty`] without touching the output.
    pub fn run(
        &self,
        source: &InputSource,
        bank_dir: &Path,
        template: &Path,
        codec: &dyn AudioCodec,
    ) -> Result<RunOutcome> {
        let template = Template::load(template)?;

        let (table, export) = self.read(source)?;
        if table.is_empty() {
            info!(input = %source.path().display(), "No samples found, nothing to write");
            return Ok(RunOutcome::Empty);
        }

        let bank = BankLoad::open(bank_dir, self.config.persist_bank)?.into_bank(bank_dir)?;
        info!(dir = %bank_dir.display(), mapped = bank.len(), "Hitsound bank ready");

        let output_dir = &self.config.output_dir;
        std::fs::create_dir_all(output_dir)?;

        let mut resolver = HitsoundResolver::new(&bank, codec, &self.config, output_dir);
        let storyboard = Storyboard::assemble(&table, &mut resolver, &self.config)?;

        let beatmap = output_dir.join(
            template
                .metadata()
                .beatmap_file_name(&self.config.version_name),
        );
        std::fs::write(
            &beatmap,
            template.render(&self.config.version_name, &storyboard.rendered()),
        )?;

        let export = match export {
            Some(export) => Some(self.write_export(export, &table, source.path(), &mut resolver)?),
            None => None,
        };

        if !storyboard.missing.is_empty() {
            info!(
                dropped = storyboard.missing.len(),
                "Notes dropped for missing hitsounds"
            );
        }
        info!(
            beatmap = %beatmap.display(),
            lines = storyboard.lines.len(),
            generated = resolver.generated(),
            "Wrote beatmap"
        );

        Ok(RunOutcome::Written(RunReport {
            beatmap,
            lines: storyboard.lines.len(),
            generated: resolver.generated(),
            missing: storyboard.missing,
            export,
        }))
    }

    /// Fill in `Path` for every layer that was turned into a hitsound and write
    /// the export next to the beatmap, under the input's file name
    fn write_export(
        &self,
        mut export: HitsoundExport,
        table: &SampleTable,
        input: &Path,
        resolver: &mut HitsoundResolver<'_>,
    ) -> Result<PathBuf> {
        for layer in &mut export.layers {
            let Some(key) = AssetKey::for_layer(layer, self.config.roughness) else {
                continue;
            };
            if !table.contains(&key) {
                continue;
            }
            if let Some(asset) = resolver.resolve(key.pitch, key.duration_ms)? {
                layer.sample_args.path = Some(asset.path.to_string_lossy().into_owned());
            }
        }

        let output_dir = &self.config.output_dir;
        let file_name = input
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("hitsounds.json"));
        let mut path = output_dir.join(&file_name);
        if same_file(&path, input) {
            path.set_extension("storyboard.json");
        }
        export.save(&path)?;
        info!(export = %path.display(), "Wrote hitsound layers");
        Ok(path)
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
