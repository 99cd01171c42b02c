//! Write a MIDI file that plays every key in turn

use clap::Parser;
use std::path::PathBuf;
use storyboard_hitsounds::bank::scale::write_reference_scale;

#[derive(Parser, Debug)]
#[command(name = "scale-midi")]
#[command(version = "0.1.0")]
#[command(about = "Generate the reference scale used to record a hitsound bank", long_about = None)]
struct Args {
    /// Output MIDI file
    #[arg(default_value = "notes.mid")]
    output: PathBuf,
}

fn main() -> Result<(), storyboard_hitsounds::Error> {
    storyboard_hitsounds::logging::init();
    let args = Args::parse();

    write_reference_scale(&args.output)?;
    tracing::info!(output = %args.output.display(), "Wrote reference scale");
    Ok(())
}
