//! Slice a key-by-key recording into a hitsound bank

use clap::Parser;
use std::path::PathBuf;
use storyboard_hitsounds::audio::{open_codec, OutputFormat};
use storyboard_hitsounds::bank::builder::{BankBuilder, BankLayout};
use storyboard_hitsounds::note::Pitch;

#[derive(Parser, Debug)]
#[command(name = "build-bank")]
#[command(version = "0.1.0")]
#[command(about = "Build a hitsound bank from a recording of every key", long_about = None)]
struct Args {
    /// Recording with one key per slot, as rendered from `scale-midi`
    #[arg(short, long)]
    input: PathBuf,

    /// Bank directory to create
    #[arg(short = 'd', long)]
    output_dir: PathBuf,

    /// First key to extract (note name like A0, or key number)
    #[arg(short, long, default_value = "21")]
    start: Pitch,

    /// Last key to extract (note name or key number)
    #[arg(short, long, default_value = "88")]
    end: Pitch,

    /// Format of the bank clips
    #[arg(long, value_enum, default_value = "ogg")]
    format: OutputFormat,

    /// Path to the ffmpeg executable
    #[arg(long)]
    ffmpeg: Option<PathBuf>,
}

fn main() -> Result<(), storyboard_hitsounds::Error> {
    storyboard_hitsounds::logging::init();
    let args = Args::parse();

    let codec = open_codec(args.format, args.ffmpeg.as_deref())?;

    let layout = BankLayout {
        start: args.start,
        end: args.end,
        ..BankLayout::default()
    };
    let bank = BankBuilder::new(codec.as_ref(), layout).build_file(&args.input, &args.output_dir)?;

    println!(
        "Mapped {} keys into {}",
        bank.len(),
        args.output_dir.display()
    );
    Ok(())
}
