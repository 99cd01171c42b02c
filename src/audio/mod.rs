//! Decoded PCM clips and the editing operations applied to hitsounds

pub mod codec;

pub use codec::{open_codec, AudioCodec, FfmpegCodec, OutputFormat, WavCodec};

/// Interleaved floating-point PCM in `[-1.0, 1.0]`
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl Clip {
    pub fn new(sample_rate: u32, channels: u16, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            channels: channels.max(1),
            samples,
        }
    }

    /// Number of sample frames (one sample per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    pub fn duration_ms(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 * 1000.0 / f64::from(self.sample_rate)
    }

    fn frame_at_ms(&self, ms: f64) -> usize {
        let frame = (ms.max(0.0) * f64::from(self.sample_rate) / 1000.0).round() as usize;
        frame.min(self.frames())
    }

    fn frame_range(&self, start: usize, end: usize) -> &[f32] {
        let ch = usize::from(self.channels);
        &self.samples[start * ch..end * ch]
    }

    /// Copy of `[start_ms, end_ms)`, clamped to the clip
    pub fn slice_ms(&self, start_ms: f64, end_ms: f64) -> Clip {
        let start = self.frame_at_ms(start_ms);
        let end = self.frame_at_ms(end_ms).max(start);
        Clip::new(
            self.sample_rate,
            self.channels,
            self.frame_range(start, end).to_vec(),
        )
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    pub fn peak_dbfs(&self) -> f64 {
        to_dbfs(f64::from(self.peak()))
    }

    /// True when no sample reaches `threshold_dbfs`
    pub fn is_silent(&self, threshold_dbfs: f64) -> bool {
        self.peak_dbfs() < threshold_dbfs
    }

    /// Length of the quiet lead-in, scanned in `chunk_ms` steps
    ///
    /// A chunk is quiet when its RMS level is below `threshold_dbfs`. The result
    /// never exceeds the clip length.
    pub fn leading_silence_ms(&self, threshold_dbfs: f64, chunk_ms: u32) -> f64 {
        let duration = self.duration_ms();
        let chunk = f64::from(chunk_ms.max(1));
        let mut trim = 0.0;

        while trim < duration {
            let start = self.frame_at_ms(trim);
            let end = self.frame_at_ms(trim + chunk);
            if rms_dbfs(self.frame_range(start, end)) >= threshold_dbfs {
                break;
            }
            trim += chunk;
        }

        trim.min(duration)
    }

    /// Scale so the peak sits `headroom_db` below full scale; silent clips are untouched
    pub fn normalize(&mut self, headroom_db: f64) {
        let peak = self.peak();
        if peak <= 0.0 {
            return;
        }
        let target = 10f64.powf(-headroom_db / 20.0) as f32;
        let gain = target / peak;
        for sample in &mut self.samples {
            *sample *= gain;
        }
    }

    /// Linear fade to silence over the last `fade_ms` milliseconds
    pub fn fade_out_ms(&mut self, fade_ms: f64) {
        let frames = self.frames();
        let fade = self.frame_at_ms(fade_ms).min(frames);
        if fade == 0 {
            return;
        }

        let ch = usize::from(self.channels);
        let start = frames - fade;
        let steps = (fade.max(2) - 1) as f32;
        for i in 0..fade {
            let gain = if fade == 1 { 0.0 } else { 1.0 - i as f32 / steps };
            let frame = (start + i) * ch;
            for sample in &mut self.samples[frame..frame + ch] {
                *sample *= gain;
            }
        }
    }
}

fn to_dbfs(level: f64) -> f64 {
    if level <= 0.0 {
        f64::NEG_INFINITY
    } else {
        20.0 * level.log10()
    }
}

fn rms_dbfs(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return f64::NEG_INFINITY;
    }
    let sum: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    to_dbfs((sum / samples.len() as f64).sqrt())
}
