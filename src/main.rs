use clap::Parser;
use std::path::PathBuf;
use storyboard_hitsounds::audio::{open_codec, OutputFormat};
use storyboard_hitsounds::input::InputSource;
use storyboard_hitsounds::{Config, Converter, RunOutcome};

fn parse_input(path: &str) -> Result<InputSource, String> {
    InputSource::from_path(std::path::Path::new(path)).map_err(|e| e.to_string())
}

#[derive(Parser, Debug)]
#[command(name = "midi-storyboard")]
#[command(version = "0.1.0")]
#[command(about = "Convert MIDI or hitsound layer JSON into beatmap storyboard samples", long_about = None)]
struct Args {
    /// Input MIDI (.mid, .midi) or mapping-tool hitsound JSON (.json)
    #[arg(short, long, value_parser = parse_input)]
    input: InputSource,

    /// Hitsound bank directory
    #[arg(short, long)]
    bank: PathBuf,

    /// Beatmap (.osu) used as the output template
    #[arg(short, long)]
    template: PathBuf,

    /// Octaves to shift every note before bank lookup
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    shift: i32,

    /// Milliseconds added to every sample time
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    offset: i64,

    /// Sample volume (0-100)
    #[arg(short, long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(0..=100))]
    volume: u8,

    /// Output directory for the beatmap and generated hitsounds
    #[arg(short = 'd', long, default_value = "output")]
    output_dir: PathBuf,

    /// Format of generated hitsounds
    #[arg(long, value_enum, default_value = "ogg")]
    format: OutputFormat,

    /// Difficulty name written to the output beatmap
    #[arg(long)]
    version_name: Option<String>,

    /// Path to the ffmpeg executable
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Do not write hitsoundbank.json after scanning a bank directory
    #[arg(long)]
    no_persist_bank: bool,
}

fn main() -> Result<(), storyboard_hitsounds::Error> {
    storyboard_hitsounds::logging::init();
    let args = Args::parse();

    let defaults = Config::default();
    let config = Config {
        output_dir: args.output_dir,
        octave_shift: args.shift,
        offset_ms: args.offset,
        volume: args.volume,
        version_name: args.version_name.unwrap_or(defaults.version_name.clone()),
        persist_bank: !args.no_persist_bank,
        ..defaults
    };

    let codec = open_codec(args.format, args.ffmpeg.as_deref())?;
    let converter = Converter::new(config);

    match converter.run(&args.input, &args.bank, &args.template, codec.as_ref())? {
        RunOutcome::Empty => println!("No samples found in {}", args.input.path().display()),
        RunOutcome::Written(report) => {
            println!(
                "Wrote {} ({} samples, {} hitsounds generated, {} notes missing a hitsound)",
                report.beatmap.display(),
                report.lines,
                report.generated,
                report.missing.len()
            );
            if let Some(export) = report.export {
                println!("Wrote {}", export.display());
            }
        }
    }

    Ok(())
}
