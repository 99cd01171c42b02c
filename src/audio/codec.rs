//! Audio decode/encode service
//!
//! Clips are edited in memory as [`Clip`]s; a codec only moves them to and from
//! disk. WAV is handled natively, compressed formats go through `ffmpeg`.

use super::Clip;
use crate::error::{Error, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Reads and writes audio files
pub trait AudioCodec {
    /// Extension (without the dot) of files written by `encode`
    fn extension(&self) -> &str;

    fn decode(&self, path: &Path) -> Result<Clip>;

    fn encode(&self, clip: &Clip, path: &Path) -> Result<()>;
}

/// Target format for generated clips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Ogg Vorbis through ffmpeg
    #[default]
    Ogg,
    /// 16-bit PCM WAV, no external tools needed
    Wav,
}

/// Build the codec for `format`, locating ffmpeg when it is needed
pub fn open_codec(format: OutputFormat, ffmpeg: Option<&Path>) -> Result<Box<dyn AudioCodec>> {
    match format {
        OutputFormat::Wav => Ok(Box::new(WavCodec)),
        OutputFormat::Ogg => Ok(Box::new(FfmpegCodec::locate(ffmpeg)?)),
    }
}

/// Native 16-bit PCM WAV codec
#[derive(Debug, Clone, Copy, Default)]
pub struct WavCodec;

impl AudioCodec for WavCodec {
    fn extension(&self) -> &str {
        "wav"
    }

    fn decode(&self, path: &Path) -> Result<Clip> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => {
                reader.samples::<f32>().collect::<std::result::Result<_, _>>()?
            }
            hound::SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    return Err(Error::Audio(format!(
                        "Unsupported bit depth in '{}': {}",
                        path.display(),
                        spec.bits_per_sample
                    )));
                }
                let scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        Ok(Clip::new(spec.sample_rate, spec.channels, samples))
    }

    fn encode(&self, clip: &Clip, path: &Path) -> Result<()> {
        let spec = hound::WavSpec {
            channels: clip.channels,
            sample_rate: clip.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &clip.samples {
            writer.write_sample((sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)?;
        }
        writer.finalize()?;
        Ok(())
    }
}

/// Ogg Vorbis codec backed by an `ffmpeg` executable
#[derive(Debug, Clone)]
pub struct FfmpegCodec {
    binary: PathBuf,
}

impl FfmpegCodec {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// Find ffmpeg: explicit path, then `FFMPEG_PATH`, then `PATH`
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Self::new(path.to_path_buf()));
            }
            return Err(Error::CodecNotFound(path.display().to_string()));
        }

        if let Ok(path) = std::env::var("FFMPEG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(Self::new(path));
            }
        }

        which::which("ffmpeg")
            .map(Self::new)
            .map_err(|_| Error::CodecNotFound("ffmpeg".to_string()))
    }

    fn run(&self, input: &Path, codec_args: &[&str], output: &Path) -> Result<()> {
        debug!(input = %input.display(), output = %output.display(), "Running ffmpeg");
        let result = Command::new(&self.binary)
            .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
            .arg(input)
            .args(codec_args)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()?;

        if !result.status.success() {
            return Err(Error::Codec {
                status: result.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

fn temp_wav() -> Result<tempfile::TempPath> {
    let file = tempfile::Builder::new()
        .prefix("hitsound_")
        .suffix(".wav")
        .tempfile()?;
    Ok(file.into_temp_path())
}

impl AudioCodec for FfmpegCodec {
    fn extension(&self) -> &str {
        "ogg"
    }

    fn decode(&self, path: &Path) -> Result<Clip> {
        let wav = temp_wav()?;
        self.run(path, &["-f", "wav", "-acodec", "pcm_s16le"], &wav)?;
        WavCodec.decode(&wav)
    }

    fn encode(&self, clip: &Clip, path: &Path) -> Result<()> {
        let wav = temp_wav()?;
        WavCodec.encode(clip, &wav)?;
        self.run(&wav, &["-c:a", "libvorbis", "-q:a", "5"], path)
    }
}
